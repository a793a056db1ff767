//! OCL queries understood by the Vertec XML endpoint and the envelope
//! wrapping them.

/// Users whose team leader is the currently logged in user, with the fields
/// needed to pick the active ones.
pub const QUERY_TEAM_MEMBERS: &str = "<Query>
    <Selection>
        <ocl>projektbearbeiter->select(teamleiter.asstring=Timsession.allInstances->first.login.name)</ocl>
        <sqlorder>name</sqlorder>
    </Selection>
    <Resultdef>
        <member>name</member>
        <member>teamleiter</member>
        <member>eintrittper</member>
        <member>austrittper</member>
        <member>aktiv</member>
        <expression><alias>teamleiter_name</alias><ocl>teamleiter.name</ocl></expression>
        <expression><alias>stufe_name</alias><ocl>stufe</ocl></expression>
    </Resultdef>
</Query>";

/// Open and billed services of the previous calendar month for one object
/// (user, project or phase). The object reference is filled in by
/// [`timesheet_query`].
const QUERY_TIMESHEETS: &str = "<Query>
    <Selection>
        <objref>{param}</objref>
        <ocl>offeneleistungen->select((datum &gt;= date->firstOfMonth->incMonth(-1)) and (datum &lt; date->firstOfMonth))->orderby(datum)->union(verrechneteleistungen->select((datum &gt;= date->firstOfMonth->incMonth(-1)) and (datum &lt; date->firstOfMonth))->orderby(datum))</ocl>
        <sqlorder>datum</sqlorder>
    </Selection>
    <Resultdef>
        <member>datum</member>
        <member>minutenint</member>
        <member>wertint</member>
        <member>wertext</member>
        <member>text</member>
        <member>phase</member>
        <member>projekt</member>
        <member>bearbeiter</member>
        <expression><alias>bearbeiter_name</alias><ocl>bearbeiter.name</ocl></expression>
        <expression><alias>projekt_name</alias><ocl>projekt</ocl></expression>
        <expression><alias>phase_name</alias><ocl>phase.code</ocl></expression>
        <expression><alias>phase_is_billable</alias><ocl>phase.verrechenbar</ocl></expression>
    </Resultdef>
</Query>";

/// Timesheet query for a concrete object id.
pub fn timesheet_query(objid: &str) -> String {
    QUERY_TIMESHEETS.replace("{param}", &escape(objid))
}

/// Wrap a query and the session token in the envelope the `/xml` endpoint
/// expects.
pub fn envelope(token: &str, query: &str) -> String {
    format!(
        "<Envelope><Header><BasicAuth><Token>{}</Token></BasicAuth></Header><Body>{}</Body></Envelope>",
        escape(token),
        query
    )
}

/// Minimal XML text escaping for values interpolated into the envelope.
pub fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
