use std::time::Duration;

use serde_json::{Map, Value};
use ureq::Agent;

use crate::config::Config;
use crate::error::VertecError;
use crate::models::{QueryFault, Record, Session};
use crate::query;

/// The login endpoint answers quickly or not at all.
const AUTH_TIMEOUT: Duration = Duration::from_secs(5);
/// Queries can take a while on large installations.
const QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Value a field takes when the server marks it `<accessdenied/>`.
pub const ACCESS_DENIED: &str = "accessdenied";

/// Blocking client for the Vertec XML API
pub struct VertecClient {
    agent: Agent,
    base_url: String,
    username: String,
    password: String,
}

impl VertecClient {
    /// Create a new client from the resolved configuration
    pub fn new(config: Config) -> Self {
        let agent = Agent::new();

        VertecClient {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username,
            password: config.password,
        }
    }

    /// Exchange the configured credentials for a session token.
    ///
    /// The `/auth/xml` endpoint takes the credentials form-encoded and
    /// returns the token as the plain response body.
    pub fn login(&self) -> Result<Session, VertecError> {
        let url = format!("{}/auth/xml", self.base_url);
        log::debug!("requesting auth token from {url} for '{}'", self.username);

        let response = self
            .agent
            .post(&url)
            .timeout(AUTH_TIMEOUT)
            .send_form(&[
                ("vertec_username", self.username.as_str()),
                ("password", self.password.as_str()),
            ])
            .map_err(|e| match e {
                ureq::Error::Status(status, _) => VertecError::AuthenticationFailed {
                    username: self.username.clone(),
                    status,
                },
                ureq::Error::Transport(t) => VertecError::NetworkUnavailable(Box::new(t)),
            })?;

        let token = response
            .into_string()
            .map_err(|e| VertecError::UnexpectedResponse(format!("unreadable login body: {e}")))?;
        let token = token.trim();
        if token.is_empty() {
            return Err(VertecError::UnexpectedResponse(
                "login succeeded but returned an empty token".to_string(),
            ));
        }

        log::debug!("retrieved auth token");
        Ok(Session::new(token.to_string()))
    }

    /// Users whose team leader is the logged-in user.
    pub fn team_members(&self, session: &Session) -> Result<Vec<Record>, VertecError> {
        self.query(session, query::QUERY_TEAM_MEMBERS)
    }

    /// Last month's timesheet entries for one user object id.
    pub fn timesheets(&self, session: &Session, objid: &str) -> Result<Vec<Record>, VertecError> {
        self.query(session, &query::timesheet_query(objid))
    }

    /// Run one query against the `/xml` endpoint and return its records.
    fn query(&self, session: &Session, query_xml: &str) -> Result<Vec<Record>, VertecError> {
        let url = format!("{}/xml", self.base_url);
        let envelope = query::envelope(session.token(), query_xml);

        let response = self
            .agent
            .post(&url)
            .timeout(QUERY_TIMEOUT)
            .set("Content-Type", "text/plain")
            .send_string(&envelope)
            .map_err(|e| match e {
                // The query endpoint rejects an invalid token with 401.
                ureq::Error::Status(401, _) => VertecError::SessionExpired(
                    "the server rejected the session token (HTTP 401)".to_string(),
                ),
                ureq::Error::Status(status, _) => VertecError::UnexpectedResponse(format!(
                    "query endpoint returned HTTP {status}"
                )),
                ureq::Error::Transport(t) => VertecError::NetworkUnavailable(Box::new(t)),
            })?;

        let body = response
            .into_string()
            .map_err(|e| VertecError::UnexpectedResponse(format!("unreadable query body: {e}")))?;

        parse_query_response(&body)
    }
}

/// Parse a query response envelope into flat JSON records.
///
/// A `<Fault>` body maps to [`VertecError::SessionExpired`] when it reports
/// an invalid session, otherwise to [`VertecError::UnexpectedResponse`]
/// carrying the fault details.
pub fn parse_query_response(body: &str) -> Result<Vec<Record>, VertecError> {
    let doc = roxmltree::Document::parse(body)
        .map_err(|e| VertecError::UnexpectedResponse(format!("invalid XML in response: {e}")))?;

    let body_elem = doc
        .root_element()
        .children()
        .find(|n| n.has_tag_name("Body"))
        .ok_or_else(|| {
            VertecError::UnexpectedResponse("response envelope has no Body element".to_string())
        })?;

    if let Some(fault_elem) = body_elem.children().find(|n| n.has_tag_name("Fault")) {
        let fault = parse_fault(fault_elem);
        if fault.is_session_fault() {
            return Err(VertecError::SessionExpired(fault.to_string()));
        }
        return Err(VertecError::UnexpectedResponse(format!("fault {fault}")));
    }

    let query_response = body_elem
        .children()
        .find(|n| n.has_tag_name("QueryResponse"))
        .ok_or_else(|| {
            VertecError::UnexpectedResponse(
                "response body has neither QueryResponse nor Fault".to_string(),
            )
        })?;

    let mut records = Vec::new();
    for result in query_response.children().filter(|n| n.is_element()) {
        let record = convert_record(result);
        // The API also returns records the user may not read, marking their
        // fields with <accessdenied/>. The 'aktiv' field doubles as the
        // sentinel for such records; drop them instead of emitting them.
        if record.get("aktiv").and_then(Value::as_str) == Some(ACCESS_DENIED) {
            continue;
        }
        records.push(record);
    }
    Ok(records)
}

/// Flatten one result element into a JSON object. Leaf fields keep their
/// text, nested references (e.g. `<projekt><objref>…</objref></projekt>`)
/// take the deepest text, and access-denied fields become the
/// `"accessdenied"` marker string. The element name is kept as `datatype`.
fn convert_record(result: roxmltree::Node) -> Record {
    let mut map = Map::new();
    map.insert(
        "datatype".to_string(),
        Value::String(result.tag_name().name().to_string()),
    );

    for field in result.children().filter(|n| n.is_element()) {
        // descendants() yields the field element itself first, so a single
        // entry means the field has no child elements.
        let elements: Vec<_> = field.descendants().filter(|n| n.is_element()).collect();
        let value = if elements.len() == 1 {
            text_value(field)
        } else if elements.last().is_some_and(|n| n.has_tag_name(ACCESS_DENIED)) {
            Value::String(ACCESS_DENIED.to_string())
        } else {
            elements.last().map(|n| text_value(*n)).unwrap_or(Value::Null)
        };
        map.insert(field.tag_name().name().to_string(), value);
    }

    Value::Object(map)
}

fn text_value(node: roxmltree::Node) -> Value {
    match node.text() {
        Some(text) => Value::String(text.trim().to_string()),
        None => Value::Null,
    }
}

fn parse_fault(fault_elem: roxmltree::Node) -> QueryFault {
    let child_text = |name: &str| {
        fault_elem
            .children()
            .find(|n| n.has_tag_name(name))
            .and_then(|n| n.text())
            .unwrap_or("")
            .trim()
            .to_string()
    };

    let details = fault_elem
        .children()
        .find(|n| n.has_tag_name("details"))
        .map(|details| {
            details
                .children()
                .filter(|n| n.is_element())
                .filter_map(|n| n.text())
                .map(|t| t.trim().to_string())
                .collect()
        })
        .unwrap_or_default();

    QueryFault {
        code: child_text("faultcode"),
        message: child_text("faultstring"),
        details,
    }
}
