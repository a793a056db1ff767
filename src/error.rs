use thiserror::Error;

/// Errors surfaced by the Vertec client and the configuration resolver.
///
/// Every variant is terminal for the run: nothing is retried, the binary
/// prints the message to stderr and exits non-zero.
#[derive(Debug, Error)]
pub enum VertecError {
    /// A required configuration value is absent and there is no terminal
    /// to prompt for it.
    #[error(
        "missing configuration value '{field}': set the {env_var} environment variable or run interactively"
    )]
    ConfigurationMissing {
        field: &'static str,
        env_var: &'static str,
    },

    /// The Vertec host could not be reached at the transport level
    /// (DNS failure, connection refused, timeout).
    #[error("cannot reach the Vertec server: {0}")]
    NetworkUnavailable(#[source] Box<ureq::Transport>),

    /// The server rejected the login credentials.
    #[error("Vertec rejected the credentials for '{username}' (HTTP {status})")]
    AuthenticationFailed { username: String, status: u16 },

    /// The server reported that the session token is no longer valid.
    #[error("the Vertec session is no longer valid: {0}")]
    SessionExpired(String),

    /// The response body did not have the expected shape.
    #[error("unexpected response from Vertec: {0}")]
    UnexpectedResponse(String),
}
