//! Configuration for the contract module.

use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tonic::transport::Endpoint;

use crate::domain::ServiceConfig;

/// Contract module configuration (`contract` section of the app config).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContractConfig {
    pub provisioning: ProvisioningConfig,
    pub storage: StorageConfig,
    pub service: ServiceTimeouts,
}

impl ContractConfig {
    /// Check what serde cannot: a usable endpoint and a DSN for the database store.
    ///
    /// # Errors
    /// Returns an error naming the offending key.
    pub fn validate(&self) -> anyhow::Result<()> {
        Endpoint::from_shared(self.provisioning.endpoint.clone())
            .context("invalid contract.provisioning.endpoint")?;
        self.storage.database_dsn()?;
        Ok(())
    }
}

/// Connection to the identity provisioning service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProvisioningConfig {
    /// gRPC endpoint of `tks.info.v1.InfoService`.
    pub endpoint: String,

    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Deadline for a single `CreateCspInfo` call on the wire.
    #[serde(with = "humantime_serde")]
    pub rpc_timeout: Duration,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            endpoint: default_provisioning_endpoint(),
            connect_timeout: Duration::from_secs(5),
            rpc_timeout: Duration::from_secs(10),
        }
    }
}

fn default_provisioning_endpoint() -> String {
    "http://127.0.0.1:50052".to_owned()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    #[default]
    Memory,
    Database,
}

/// Contract store selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub kind: StorageKind,

    /// Database URL, e.g. `sqlite://contracts.db?mode=rwc` or `postgres://...`.
    /// Required when `kind` is `database`.
    pub dsn: Option<String>,
}

impl StorageConfig {
    /// DSN of the database store, or `None` for the in-memory store.
    ///
    /// # Errors
    /// Returns an error if `kind` is `database` and no DSN is set.
    pub fn database_dsn(&self) -> anyhow::Result<Option<&str>> {
        match self.kind {
            StorageKind::Memory => Ok(None),
            StorageKind::Database => self
                .dsn
                .as_deref()
                .map(Some)
                .context("contract.storage.dsn is required when storage.kind is 'database'"),
        }
    }
}

/// Per-step deadlines of the create-contract workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceTimeouts {
    #[serde(with = "humantime_serde")]
    pub provisioning_timeout: Duration,

    #[serde(with = "humantime_serde")]
    pub persistence_timeout: Duration,
}

impl Default for ServiceTimeouts {
    fn default() -> Self {
        let defaults = ServiceConfig::default();
        Self {
            provisioning_timeout: defaults.provisioning_timeout,
            persistence_timeout: defaults.persistence_timeout,
        }
    }
}

impl From<&ServiceTimeouts> for ServiceConfig {
    fn from(t: &ServiceTimeouts) -> Self {
        Self {
            provisioning_timeout: t.provisioning_timeout,
            persistence_timeout: t.persistence_timeout,
        }
    }
}
