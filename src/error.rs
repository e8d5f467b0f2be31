use std::io;

use thiserror::Error;

/// Coarse failure category, for callers deciding whether to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Resolution,
    Validation,
    Timeout,
    Io,
    MalformedReply,
}

#[derive(Debug, Error)]
pub enum SampQueryError {
    #[error("failed to resolve host: {0}")]
    Resolution(String),

    #[error("invalid IPv4 address: {0}")]
    InvalidAddress(String),

    #[error("invalid port: {0} (expected 1-65535)")]
    InvalidPort(u32),

    #[error("request timed out")]
    Timeout(#[from] tokio::time::error::Elapsed),

    #[error("failed to bind local socket: {0}")]
    FailedPortBind(#[source] io::Error),

    #[error("failed to connect to host: {0}")]
    UnreachableHost(#[source] io::Error),

    #[error("failed to send request: {0}")]
    SendError(#[source] io::Error),

    #[error("failed to receive reply: {0}")]
    ReceiveError(#[source] io::Error),

    #[error("malformed reply: {0}")]
    MalformedReply(String),
}

impl SampQueryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SampQueryError::Resolution(_) => ErrorKind::Resolution,
            SampQueryError::InvalidAddress(_) | SampQueryError::InvalidPort(_) => {
                ErrorKind::Validation
            }
            SampQueryError::Timeout(_) => ErrorKind::Timeout,
            SampQueryError::FailedPortBind(_)
            | SampQueryError::UnreachableHost(_)
            | SampQueryError::SendError(_)
            | SampQueryError::ReceiveError(_) => ErrorKind::Io,
            SampQueryError::MalformedReply(_) => ErrorKind::MalformedReply,
        }
    }

    /// Timeouts and socket errors may succeed on a second attempt;
    /// anything else will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Timeout | ErrorKind::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_not_retryable() {
        let err = SampQueryError::InvalidPort(70000);
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "invalid port: 70000 (expected 1-65535)");
    }

    #[test]
    fn io_errors_are_retryable() {
        let err = SampQueryError::ReceiveError(io::Error::from(io::ErrorKind::ConnectionRefused));
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.is_retryable());
    }

    #[test]
    fn malformed_reply_is_not_retryable() {
        let err = SampQueryError::MalformedReply("short".into());
        assert_eq!(err.kind(), ErrorKind::MalformedReply);
        assert!(!err.is_retryable());
    }
}
