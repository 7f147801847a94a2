//! Contract module definition
//!
//! Builds the domain service and its collaborators from configuration and
//! exposes the gRPC service for the server.

use std::sync::Arc;

use anyhow::{Context, Result};
use contract_sdk::ContractServiceServer;
use contract_sdk::transport::GrpcClientConfig;
use tokio_util::sync::CancellationToken;

use crate::api::grpc::ContractServiceImpl;
use crate::config::ContractConfig;
use crate::domain::{ContractRepository, IdentityProvisioner, Service};
use crate::infra::provisioning::GrpcIdentityProvisioner;
use crate::infra::storage::{InMemoryContractRepository, SeaOrmContractRepository};

/// Contract module.
///
/// Owns the domain service; cheap to clone.
#[derive(Clone)]
pub struct ContractModule {
    service: Arc<Service>,
}

impl ContractModule {
    /// Wire the module from its configuration.
    ///
    /// The provisioning channel is lazy, so the identity service may start
    /// later than this process. The database, when configured, is connected
    /// and migrated here.
    ///
    /// # Errors
    /// Returns an error if the provisioning endpoint is malformed, if the
    /// database backend is selected without a DSN, or if the database cannot
    /// be reached or migrated.
    pub async fn init(cfg: &ContractConfig) -> Result<Self> {
        tracing::info!("Initializing contract module");

        let grpc_cfg = GrpcClientConfig::new("info")
            .with_connect_timeout(cfg.provisioning.connect_timeout)
            .with_rpc_timeout(cfg.provisioning.rpc_timeout);
        let provisioner: Arc<dyn IdentityProvisioner> = Arc::new(
            GrpcIdentityProvisioner::connect_lazy(&cfg.provisioning.endpoint, &grpc_cfg)
                .context("invalid contract.provisioning.endpoint")?,
        );

        let repo: Arc<dyn ContractRepository> = match cfg.storage.database_dsn()? {
            None => {
                tracing::warn!("using in-memory contract store; contracts are lost on restart");
                Arc::new(InMemoryContractRepository::new())
            }
            Some(dsn) => Arc::new(SeaOrmContractRepository::connect(dsn).await?),
        };

        let service = Service::new(provisioner, repo, (&cfg.service).into());

        tracing::info!(
            provisioning = %cfg.provisioning.endpoint,
            storage = ?cfg.storage.kind,
            "contract module initialized"
        );
        Ok(Self::from_service(Arc::new(service)))
    }

    /// Wrap an already built service.
    #[must_use]
    pub fn from_service(service: Arc<Service>) -> Self {
        Self { service }
    }

    #[must_use]
    pub fn service(&self) -> Arc<Service> {
        Arc::clone(&self.service)
    }

    /// Build the tonic service; new contracts are refused once `shutdown` fires.
    #[must_use]
    pub fn grpc_service(
        &self,
        shutdown: CancellationToken,
    ) -> ContractServiceServer<ContractServiceImpl> {
        ContractServiceServer::new(ContractServiceImpl::new(self.service(), shutdown))
    }
}
