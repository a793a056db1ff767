#[cfg(test)]
mod tests {
    use crate::client::{ACCESS_DENIED, parse_query_response};
    use crate::error::VertecError;
    use crate::query;

    const RESPONSE_TWO_PHASES: &str = "<Envelope>
        <Body>
            <QueryResponse>
                <ProjektPhase>
                    <objid>2699811</objid>
                    <aktiv>1</aktiv>
                    <planWertExt><accessdenied/></planWertExt>
                    <projekt>
                        <objref>2671828</objref>
                    </projekt>
                </ProjektPhase>
                <ProjektPhase>
                    <objid>2699812</objid>
                    <aktiv><accessdenied/></aktiv>
                </ProjektPhase>
            </QueryResponse>
        </Body>
    </Envelope>";

    #[test]
    fn records_flatten_to_json_objects() {
        let records = parse_query_response(RESPONSE_TWO_PHASES).unwrap();

        // The second record is access-denied on 'aktiv' and gets dropped.
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record["datatype"], "ProjektPhase");
        assert_eq!(record["objid"], "2699811");
        assert_eq!(record["aktiv"], "1");
        assert_eq!(record["planWertExt"], ACCESS_DENIED);
        // Nested references collapse to the deepest text.
        assert_eq!(record["projekt"], "2671828");
    }

    #[test]
    fn empty_query_response_yields_no_records() {
        let body = "<Envelope><Body><QueryResponse></QueryResponse></Body></Envelope>";
        let records = parse_query_response(body).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn query_fault_is_an_unexpected_response() {
        let body = "<Envelope><Body>
            <Fault>
                <faultcode>Client</faultcode>
                <faultstring>Error(s) in XML input</faultstring>
                <details>
                    <detailitem>Error: 84:Parenthesis are not in balance on line 10 col 22</detailitem>
                    <detailitem>Error: expression Element without ocl on line 20 col 25</detailitem>
                </details>
            </Fault>
        </Body></Envelope>";

        let err = parse_query_response(body).unwrap_err();
        match err {
            VertecError::UnexpectedResponse(message) => {
                assert!(message.contains("Error(s) in XML input"));
                assert!(message.contains("Parenthesis are not in balance"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn session_fault_maps_to_session_expired() {
        let body = "<Envelope><Body>
            <Fault>
                <faultcode>Client</faultcode>
                <faultstring>No valid session found for this token</faultstring>
            </Fault>
        </Body></Envelope>";

        let err = parse_query_response(body).unwrap_err();
        assert!(matches!(err, VertecError::SessionExpired(_)), "got: {err}");
    }

    #[test]
    fn garbage_body_is_an_unexpected_response() {
        let err = parse_query_response("<html>definitely not the API</html>").unwrap_err();
        assert!(matches!(err, VertecError::UnexpectedResponse(_)));

        let err = parse_query_response("not xml at all").unwrap_err();
        assert!(matches!(err, VertecError::UnexpectedResponse(_)));
    }

    #[test]
    fn envelope_wraps_token_and_query() {
        let envelope = query::envelope("t0ken", "<Query></Query>");
        assert_eq!(
            envelope,
            "<Envelope><Header><BasicAuth><Token>t0ken</Token></BasicAuth></Header><Body><Query></Query></Body></Envelope>"
        );
    }

    #[test]
    fn interpolated_values_are_escaped() {
        let envelope = query::envelope("a<b&c", "<Query></Query>");
        assert!(envelope.contains("<Token>a&lt;b&amp;c</Token>"));

        let q = query::timesheet_query("123<456");
        assert!(q.contains("<objref>123&lt;456</objref>"));
        assert!(!q.contains("{param}"));
    }
}
