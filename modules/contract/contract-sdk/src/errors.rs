//! Public error types for the contract service.
//!
//! These errors are safe to expose to other modules and consumers. Each
//! variant maps onto exactly one wire [`ResultCode`].

use thiserror::Error;

use crate::models::ResultCode;

/// Errors that can be returned by the `ContractClientV1`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// The request failed validation before any side effect.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The identity provisioning service failed or rejected the request.
    ///
    /// `code` is the provisioning service's code, propagated verbatim.
    #[error("{message}")]
    Provisioning { code: ResultCode, message: String },

    /// The CSP identity was provisioned but the contract could not be stored.
    ///
    /// The identity is left in place; it has to be reconciled out of band.
    #[error("{message}")]
    Persistence { message: String },

    /// The contract does not exist.
    #[error("{message}")]
    NotFound { message: String },

    /// The operation is not implemented in this service version.
    ///
    /// Permanent: retrying will not help.
    #[error("{operation} is not implemented")]
    Unimplemented { operation: String },

    /// The service failed for a reason of its own.
    #[error("{message}")]
    Internal { message: String },

    /// The call did not reach the service or the response was malformed.
    ///
    /// `code` is the tonic status code for failed calls and `INTERNAL` for
    /// responses that could not be decoded.
    #[error("gRPC transport error: {message}")]
    Transport { code: ResultCode, message: String },
}

impl ContractError {
    /// Create an `InvalidArgument` error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a `Provisioning` error.
    pub fn provisioning(code: ResultCode, message: impl Into<String>) -> Self {
        Self::Provisioning {
            code,
            message: message.into(),
        }
    }

    /// Create a `Persistence` error.
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Create a `NotFound` error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create an `Unimplemented` error.
    pub fn unimplemented(operation: impl Into<String>) -> Self {
        Self::Unimplemented {
            operation: operation.into(),
        }
    }

    /// Create an `Internal` error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a `Transport` error.
    pub fn transport(code: ResultCode, message: impl Into<String>) -> Self {
        Self::Transport {
            code,
            message: message.into(),
        }
    }

    /// Create a `Transport` error for a response that could not be decoded.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::transport(ResultCode::Internal, message)
    }

    /// Wire code for this error.
    ///
    /// Persistence failures surface as `NOT_FOUND`, matching what existing
    /// clients of the contract service expect.
    #[must_use]
    pub fn code(&self) -> ResultCode {
        match self {
            Self::InvalidArgument { .. } => ResultCode::InvalidArgument,
            Self::Provisioning { code, .. } | Self::Transport { code, .. } => *code,
            Self::Persistence { .. } | Self::NotFound { .. } => ResultCode::NotFound,
            Self::Unimplemented { .. } => ResultCode::Unimplemented,
            Self::Internal { .. } => ResultCode::Internal,
        }
    }

    /// Rebuild an error from a non-OK response envelope.
    ///
    /// The envelope does not distinguish persistence failures from lookups of
    /// unknown ids, so both decode as `NotFound`.
    #[must_use]
    pub fn from_envelope(code: ResultCode, message: String, operation: &str) -> Self {
        match code {
            ResultCode::InvalidArgument => Self::InvalidArgument { message },
            ResultCode::NotFound => Self::NotFound { message },
            ResultCode::Unimplemented => Self::Unimplemented {
                operation: operation.to_owned(),
            },
            ResultCode::Internal => Self::Internal { message },
            other => Self::Provisioning {
                code: other,
                message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistence_surfaces_as_not_found() {
        let err = ContractError::persistence("db down");
        assert_eq!(err.code(), ResultCode::NotFound);
        assert_eq!(err.to_string(), "db down");
    }

    #[test]
    fn provisioning_code_is_propagated_verbatim() {
        let err = ContractError::provisioning(ResultCode::PermissionDenied, "bad auth");
        assert_eq!(err.code(), ResultCode::PermissionDenied);
        assert_eq!(err.to_string(), "bad auth");
    }

    #[test]
    fn envelope_decoding_keeps_stub_operation() {
        let err =
            ContractError::from_envelope(ResultCode::Unimplemented, String::new(), "GetQuota");
        assert_eq!(err, ContractError::unimplemented("GetQuota"));
    }

    #[test]
    fn internal_envelope_is_not_a_provisioning_failure() {
        let err =
            ContractError::from_envelope(ResultCode::Internal, "task failed".to_owned(), "Create");
        assert_eq!(err, ContractError::internal("task failed"));
        assert_eq!(err.code(), ResultCode::Internal);
    }
}
