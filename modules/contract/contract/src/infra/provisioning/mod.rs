//! Adapters for the external identity provisioning service.

pub mod grpc;

pub use grpc::GrpcIdentityProvisioner;
