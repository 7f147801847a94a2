//! Contract API trait
//!
//! Contract trait for consumers of the contract service.

use async_trait::async_trait;

use crate::errors::ContractError;
use crate::models::{Contract, ContractQuota, NewContract};

/// Contract service API.
///
/// Quota and service-entitlement operations are declared for wire
/// compatibility but currently always fail with
/// [`ContractError::Unimplemented`].
#[async_trait]
pub trait ContractClientV1: Send + Sync {
    /// Provision a CSP identity and store a contract referencing it.
    ///
    /// Returns the id of the provisioned CSP identity.
    async fn create_contract(&self, new_contract: NewContract) -> Result<String, ContractError>;

    /// Fetch a contract by id.
    async fn get_contract(&self, contract_id: &str) -> Result<Contract, ContractError>;

    /// Replace the quota of a contract.
    async fn update_quota(
        &self,
        contract_id: &str,
        quota: ContractQuota,
    ) -> Result<ContractQuota, ContractError>;

    /// Replace the service entitlements of a contract.
    async fn update_services(
        &self,
        contract_id: &str,
        services: Vec<String>,
    ) -> Result<Vec<String>, ContractError>;

    /// Fetch the quota of a contract.
    async fn get_quota(&self, contract_id: &str) -> Result<ContractQuota, ContractError>;

    /// Fetch the service entitlements of a contract.
    async fn get_services(&self, contract_id: &str) -> Result<Vec<String>, ContractError>;
}
