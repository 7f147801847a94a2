//! Public models for the contract service.
//!
//! These are transport-agnostic data structures that define the contract
//! between the contract service and its consumers.

use std::fmt;

use secrecy::SecretString;
use time::OffsetDateTime;

/// Usage limits attached to a contract.
///
/// The service stores the quota as given and never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContractQuota {
    pub cpu: i64,
    pub memory: i64,
    pub block: i64,
    pub block_ssd: i64,
    pub fs: i64,
    pub fs_ssd: i64,
}

/// A persisted contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    pub id: String,
    pub contractor_name: String,
    pub csp_id: String,
    pub available_services: Vec<String>,
    pub quota: ContractQuota,
    pub last_updated_ts: OffsetDateTime,
}

/// Data for creating a new contract together with its CSP identity.
#[derive(Debug, Clone)]
pub struct NewContract {
    pub id: String,
    pub contractor_name: String,
    pub csp_name: String,
    pub csp_auth: SecretString,
    pub available_services: Vec<String>,
    pub quota: ContractQuota,
}

/// Result code vocabulary shared with the provisioning service.
///
/// Numbering matches gRPC status codes; unknown wire values decode as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResultCode {
    #[default]
    Ok,
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

impl ResultCode {
    #[must_use]
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK_UNSPECIFIED",
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::ResourceExhausted => "RESOURCE_EXHAUSTED",
            Self::FailedPrecondition => "FAILED_PRECONDITION",
            Self::Aborted => "ABORTED",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::Unimplemented => "UNIMPLEMENTED",
            Self::Internal => "INTERNAL",
            Self::Unavailable => "UNAVAILABLE",
            Self::DataLoss => "DATA_LOSS",
            Self::Unauthenticated => "UNAUTHENTICATED",
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
