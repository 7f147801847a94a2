//! gRPC API layer for the contract module.

pub mod server;

pub use server::ContractServiceImpl;
