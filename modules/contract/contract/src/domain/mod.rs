//! Domain layer for the contract module
//!
//! Business logic lives in `service`; collaborators are reached only through
//! the traits in `ports`.

pub mod error;
pub mod ports;
pub mod service;

pub use error::DomainError;
pub use ports::{
    ContractRepository, IdentityProvisioner, NewContractRecord, ProvisioningError, StoreError,
};
pub use service::{Service, ServiceConfig};
