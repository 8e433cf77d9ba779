//! Errors surfaced by the user-data and launch services.

use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// No wallet public key is available for the session.
    NotConnected,
    /// Transport failure or a non-success response from a remote service.
    NetworkFailure(String),
    /// Caller input or a response payload failed validation.
    InvalidInput(String),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::NotConnected => write!(f, "Wallet not connected"),
            ServiceError::NetworkFailure(err) => write!(f, "Network failure: {err}"),
            ServiceError::InvalidInput(err) => write!(f, "Invalid input: {err}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl ServiceError {
    pub fn network(err: impl Display) -> Self {
        ServiceError::NetworkFailure(err.to_string())
    }

    pub fn invalid(err: impl Display) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(ServiceError::NotConnected.to_string(), "Wallet not connected");
        assert_eq!(
            ServiceError::network("timed out").to_string(),
            "Network failure: timed out"
        );
        assert_eq!(
            ServiceError::invalid("empty mint").to_string(),
            "Invalid input: empty mint"
        );
    }

    #[test]
    fn test_converts_into_anyhow() {
        let err: anyhow::Error = ServiceError::NotConnected.into();
        assert_eq!(
            err.downcast_ref::<ServiceError>(),
            Some(&ServiceError::NotConnected)
        );
    }
}
