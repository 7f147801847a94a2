//! Contract Module
//!
//! gRPC service that provisions a CSP identity for a contractor and records
//! the contract that references it.
//!
//! ## Architecture
//!
//! - `domain/service.rs` - create-contract workflow and lookups
//! - `domain/ports.rs` - identity provisioner and contract store traits
//! - `infra/provisioning` - gRPC client of the identity service
//! - `infra/storage` - in-memory and `SeaORM` contract stores
//! - `api/grpc/server.rs` - gRPC server implementation
//! - `module.rs` - wiring from configuration
//! - `server.rs` - tonic server bootstrap
//!
//! External consumers should use the `contract-sdk` crate which provides
//! the gRPC client.

// === MODULE DEFINITION ===
mod module;
pub use module::ContractModule;

pub mod config;
pub mod server;

// === INTERNAL MODULES ===
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
