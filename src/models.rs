use serde_json::Value;

/// Opaque authentication artifact returned by the login endpoint, valid for
/// the lifetime of this process only.
#[derive(Clone)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn new(token: String) -> Self {
        Session { token }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

// Keep the token out of debug output and logs.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

/// A `<Fault>` element returned instead of query results.
#[derive(Debug, Clone)]
pub struct QueryFault {
    pub code: String,
    pub message: String,
    pub details: Vec<String>,
}

impl QueryFault {
    /// Whether the fault reports an invalid or expired session rather than
    /// a problem with the query itself.
    pub fn is_session_fault(&self) -> bool {
        let message = self.message.to_lowercase();
        message.contains("session") || message.contains("auth") || message.contains("token")
    }
}

impl std::fmt::Display for QueryFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        for detail in &self.details {
            write!(f, "; {detail}")?;
        }
        Ok(())
    }
}

/// A single record from a `<QueryResponse>`, flattened to a JSON object.
/// Treated as a pass-through value; the tool enforces no schema on it.
pub type Record = Value;
