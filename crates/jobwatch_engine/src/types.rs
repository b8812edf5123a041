use serde_json::Value;
use thiserror::Error;

/// Construction-time failures: bad configuration, not bad luck.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid url {url:?}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("failed to build http client: {0}")]
    Client(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("no active session")]
    Unauthenticated,
    #[error("create request rejected with status {status}")]
    Rejected { status: u16 },
    #[error("create request failed: {0}")]
    Network(String),
    #[error("unexpected create response: {0}")]
    InvalidResponse(String),
    #[error("could not encode create request: {0}")]
    Encode(String),
}

impl SubmitError {
    /// Text shown to the user; transport detail stays in the log.
    pub fn user_message(&self) -> &'static str {
        match self {
            SubmitError::Unauthenticated => "Not signed in",
            SubmitError::Rejected { .. }
            | SubmitError::Network(_)
            | SubmitError::InvalidResponse(_)
            | SubmitError::Encode(_) => "Failed to create job",
        }
    }
}

/// Live channel faults. Never shown to the user; they hand over to polling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("stream connect failed: {0}")]
    Connect(String),
    #[error("stream rejected with status {0}")]
    HttpStatus(u16),
    #[error("stream read failed: {0}")]
    Read(String),
    #[error("undecodable stream message: {0}")]
    Decode(String),
    #[error("stream ended before a terminal event")]
    Closed,
}

/// Record store faults. Logged and retried, never escalated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PollQueryError {
    #[error("record query failed: {0}")]
    Network(String),
    #[error("record query returned status {0}")]
    HttpStatus(u16),
    #[error("record query returned a malformed body: {0}")]
    Decode(String),
}

/// Persisted artifact for a finished job.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRecord {
    pub id: String,
    pub structure: Value,
}

#[cfg(test)]
mod tests {
    use super::SubmitError;

    #[test]
    fn only_missing_session_gets_its_own_user_message() {
        assert_eq!(SubmitError::Unauthenticated.user_message(), "Not signed in");
        for err in [
            SubmitError::Rejected { status: 500 },
            SubmitError::Network("reset".into()),
            SubmitError::InvalidResponse("eof".into()),
            SubmitError::Encode("bad".into()),
        ] {
            assert_eq!(err.user_message(), "Failed to create job", "{err}");
        }
    }

    #[test]
    fn encode_failure_is_not_reported_as_a_bad_response() {
        let err = SubmitError::Encode("key must be a string".into());
        assert_eq!(
            err.to_string(),
            "could not encode create request: key must be a string"
        );
    }
}
