//! Outbound ports of the contract domain.
//!
//! The domain service only talks to the outside world through these traits;
//! concrete adapters live in `infra`.

use async_trait::async_trait;
use contract_sdk::{Contract, ContractQuota, ResultCode};
use secrecy::SecretString;
use thiserror::Error;

/// Failure reported by the identity provisioning service.
///
/// Transport failures and semantic rejections share this shape; `code` is
/// whatever the provisioning side (or the transport) reported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProvisioningError {
    pub code: ResultCode,
    pub message: String,
}

impl ProvisioningError {
    pub fn new(code: ResultCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Client of the external CSP identity service.
#[async_trait]
pub trait IdentityProvisioner: Send + Sync {
    /// Create a CSP identity tagged with `contract_id` and return its id.
    ///
    /// Called once per request; implementations must not retry.
    async fn create_csp_identity(
        &self,
        contract_id: &str,
        csp_name: &str,
        csp_auth: &SecretString,
    ) -> Result<String, ProvisioningError>;
}

/// Errors reported by a contract store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("contract '{id}' not found")]
    NotFound { id: String },

    #[error("{0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(message: impl ToString) -> Self {
        Self::Backend(message.to_string())
    }
}

/// Everything the store needs to write a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContractRecord {
    pub id: String,
    pub contractor_name: String,
    pub csp_id: String,
    pub available_services: Vec<String>,
    pub quota: ContractQuota,
}

/// Persistence for contracts, keyed by contract id.
///
/// Implementations serialize concurrent writes to the same key themselves.
#[async_trait]
pub trait ContractRepository: Send + Sync {
    /// Insert or replace the contract with `record.id`, stamping `last_updated_ts`.
    async fn post(&self, record: NewContractRecord) -> Result<(), StoreError>;

    /// Point lookup by contract id.
    async fn get(&self, contract_id: &str) -> Result<Contract, StoreError>;
}
