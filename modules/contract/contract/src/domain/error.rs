use contract_sdk::{ContractError, ResultCode};
use thiserror::Error;

/// Domain-specific errors.
///
/// Closed set: every failure of the contract workflow lands in exactly one
/// variant and carries the collaborator's message unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid argument: {field}: {message}")]
    InvalidArgument { field: String, message: String },

    /// Provisioning failed; nothing was persisted.
    #[error("{message}")]
    Provisioning { code: ResultCode, message: String },

    /// The store failed. `csp_id` is set when a CSP identity was provisioned
    /// before the failure and is now orphaned.
    #[error("{message}")]
    Persistence {
        csp_id: Option<String>,
        message: String,
    },

    #[error("{message}")]
    NotFound { id: String, message: String },

    #[error("{operation} is not implemented")]
    Unimplemented { operation: &'static str },

    #[error("{message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn invalid_argument(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn provisioning(code: ResultCode, message: impl Into<String>) -> Self {
        Self::Provisioning {
            code,
            message: message.into(),
        }
    }

    pub fn persistence(csp_id: Option<String>, message: impl Into<String>) -> Self {
        Self::Persistence {
            csp_id,
            message: message.into(),
        }
    }

    pub fn not_found(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            id: id.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unimplemented(operation: &'static str) -> Self {
        Self::Unimplemented { operation }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// CSP identity left behind by this failure, if any.
    #[must_use]
    pub fn orphaned_csp_id(&self) -> Option<&str> {
        match self {
            Self::Persistence {
                csp_id: Some(id), ..
            } => Some(id),
            _ => None,
        }
    }
}

/// Convert domain errors to SDK errors for public API consumption.
impl From<DomainError> for ContractError {
    fn from(domain_error: DomainError) -> Self {
        match domain_error {
            DomainError::InvalidArgument { field, message } => {
                ContractError::invalid_argument(format!("{field}: {message}"))
            }
            DomainError::Provisioning { code, message } => {
                ContractError::provisioning(code, message)
            }
            DomainError::Persistence { message, .. } => ContractError::persistence(message),
            DomainError::NotFound { message, .. } => ContractError::not_found(message),
            DomainError::Unimplemented { operation } => ContractError::unimplemented(operation),
            DomainError::Internal { message } => ContractError::internal(message),
        }
    }
}
