//! Contract SDK
//!
//! This crate provides everything needed to consume the contract service:
//! - API trait (`ContractClientV1`)
//! - Models (`Contract`, `NewContract`, `ContractQuota`, `ResultCode`)
//! - Error type (`ContractError`)
//! - gRPC client (`ContractGrpcClient`) and transport helpers
//! - Proto stubs for the server and for the identity provisioning service
//!
//! ## Usage
//!
//! ```ignore
//! use contract_sdk::{ContractClientV1, ContractGrpcClient};
//!
//! let client = ContractGrpcClient::connect("http://127.0.0.1:50051").await?;
//! let csp_id = client.create_contract(new_contract).await?;
//! let contract = client.get_contract("c-1").await?;
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

// === API TRAIT AND TYPES ===
mod api;
pub mod errors;
pub mod models;
pub use api::ContractClientV1;
pub use errors::ContractError;
pub use models::{Contract, ContractQuota, NewContract, ResultCode};

// === GRPC CLIENT ===
mod client;
pub mod transport;
pub use client::ContractGrpcClient;

// === WIRE CONVERSIONS ===
mod convert;

// === GRPC PROTO STUBS ===
/// Generated protobuf types.
///
/// Module nesting mirrors the proto packages so that cross-package references
/// emitted by prost resolve.
pub mod proto {
    pub mod tks {
        pub mod common {
            pub mod v1 {
                tonic::include_proto!("tks.common.v1");
            }
        }
        pub mod contract {
            pub mod v1 {
                tonic::include_proto!("tks.contract.v1");
            }
        }
        pub mod info {
            pub mod v1 {
                tonic::include_proto!("tks.info.v1");
            }
        }
    }

    pub use tks::common::v1 as common;
    pub use tks::contract::v1 as contract;
    pub use tks::info::v1 as info;
}

// Re-export proto types needed by the server
pub use proto::contract::contract_service_server::{ContractService, ContractServiceServer};

/// Service name constant for `ContractService` (used for registration and logs)
pub const SERVICE_NAME: &str = "tks.contract.v1.ContractService";
