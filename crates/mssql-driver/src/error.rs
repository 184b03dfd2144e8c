//! Driver error types.

use thiserror::Error;

/// Errors that can occur while establishing a connection or executing a
/// query.
///
/// Transport and protocol errors are terminal for the current operation;
/// server-reported errors are data, not failures, until the terminal DONE
/// token says otherwise.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The underlying transport failed (connect, read, or write).
    #[error("transport error: {0}")]
    Transport(#[from] mssql_transport::TransportError),

    /// The wire format was malformed or violated a protocol invariant.
    #[error("protocol error: {0}")]
    Protocol(#[from] tds_protocol::ProtocolError),

    /// The server sent an ERROR token before login completed.
    #[error("login failed: server error {number}: {message}")]
    LoginFailed {
        /// Server-reported error number.
        number: i32,
        /// Server-reported message text.
        message: String,
    },

    /// The server's LOGINACK/first response could not be interpreted.
    #[error("invalid login response: {0}")]
    InvalidLoginResponse(String),

    /// A ROW token arrived before any COLMETADATA token in the same result
    /// set — see [`tds_protocol::ProtocolError::MissingPriorColMetaData`].
    #[error("row arrived with no prior column metadata")]
    MissingColumnMetadata,

    /// The server reported an ERROR token during query execution.
    ///
    /// This does not necessarily terminate the connection: the batch's
    /// terminal DONE token determines whether further statements ran.
    #[error("server error {number} (severity {class}): {message}")]
    ServerError {
        /// Server-reported error number.
        number: i32,
        /// Error class/severity (0-25).
        class: u8,
        /// Error state.
        state: u8,
        /// Error message text.
        message: String,
        /// Server name where the error occurred, if reported.
        server: Option<String>,
        /// Stored procedure name, if applicable.
        procedure: Option<String>,
        /// Line number within the batch or procedure.
        line: i32,
    },

    /// A configuration value was invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// An operation was attempted from the wrong connection state (e.g.
    /// `execute_query` before `connect`).
    #[error("invalid connection state: expected {expected}, was {actual}")]
    InvalidState {
        /// The state the operation required.
        expected: &'static str,
        /// The state the connection was actually in.
        actual: &'static str,
    },
}

impl DriverError {
    /// Whether this error may succeed if the operation is retried.
    ///
    /// Restricted to the generic server-error taxonomy (deadlock victim,
    /// statement timeout); there is no Azure-specific routing/federation
    /// error table here since Azure support is out of scope.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::ServerError { number, .. } => matches!(number, 1205 | -2),
            _ => false,
        }
    }

    /// Whether this error will never succeed on retry (a syntax error, a
    /// missing object, a constraint violation).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Config(_) | Self::InvalidState { .. } => true,
            Self::ServerError { number, .. } => {
                matches!(number, 102 | 207 | 208 | 547 | 2627 | 2601)
            }
            _ => false,
        }
    }
}

/// Result type for driver operations.
pub type Result<T> = std::result::Result<T, DriverError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn make_server_error(number: i32) -> DriverError {
        DriverError::ServerError {
            number,
            class: 16,
            state: 1,
            message: "test error".to_string(),
            server: None,
            procedure: None,
            line: 1,
        }
    }

    #[test]
    fn deadlock_and_timeout_are_transient() {
        assert!(make_server_error(1205).is_transient());
        assert!(make_server_error(-2).is_transient());
    }

    #[test]
    fn syntax_errors_are_terminal() {
        assert!(make_server_error(102).is_terminal());
        assert!(make_server_error(207).is_terminal());
        assert!(make_server_error(208).is_terminal());
        assert!(make_server_error(547).is_terminal());
        assert!(make_server_error(2627).is_terminal());
        assert!(make_server_error(2601).is_terminal());
    }

    #[test]
    fn unrelated_server_errors_are_neither() {
        let err = make_server_error(50000);
        assert!(!err.is_transient());
        assert!(!err.is_terminal());
    }

    #[test]
    fn config_errors_are_terminal() {
        assert!(DriverError::Config("bad host".into()).is_terminal());
    }

    #[test]
    fn invalid_state_is_terminal_not_transient() {
        let err = DriverError::InvalidState {
            expected: "Authenticated",
            actual: "Connected",
        };
        assert!(err.is_terminal());
        assert!(!err.is_transient());
    }
}
