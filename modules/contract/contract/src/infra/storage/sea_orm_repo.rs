use anyhow::Context;
use async_trait::async_trait;
use contract_sdk::Contract;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait};
use sea_orm_migration::MigratorTrait;
use time::OffsetDateTime;

use crate::domain::ports::{ContractRepository, NewContractRecord, StoreError};
use crate::infra::storage::entity::{self, Entity as ContractEntity};
use crate::infra::storage::mapper::to_active_model;
use crate::infra::storage::migrations::Migrator;

/// SQL-backed implementation of `ContractRepository`.
pub struct SeaOrmContractRepository {
    db: DatabaseConnection,
}

impl SeaOrmContractRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Connect to `dsn` and bring the schema up to date.
    ///
    /// # Errors
    /// Returns an error if the database is unreachable or a migration fails.
    pub async fn connect(dsn: &str) -> anyhow::Result<Self> {
        let mut opts = ConnectOptions::new(dsn.to_owned());
        opts.sqlx_logging(false);
        // Every pooled connection to an in-memory SQLite database sees its own empty schema.
        if dsn.contains(":memory:") {
            opts.max_connections(1).min_connections(1);
        }

        let db = Database::connect(opts)
            .await
            .context("failed to connect to contract database")?;
        Migrator::up(&db, None)
            .await
            .context("failed to run contract migrations")?;

        tracing::info!(backend = ?db.get_database_backend(), "contract database ready");
        Ok(Self::new(db))
    }
}

#[async_trait]
impl ContractRepository for SeaOrmContractRepository {
    async fn post(&self, record: NewContractRecord) -> Result<(), StoreError> {
        let active_model = to_active_model(record, OffsetDateTime::now_utc())?;

        ContractEntity::insert(active_model)
            .on_conflict(
                OnConflict::column(entity::Column::Id)
                    .update_columns([
                        entity::Column::ContractorName,
                        entity::Column::CspId,
                        entity::Column::AvailableServices,
                        entity::Column::Quota,
                        entity::Column::LastUpdatedTs,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(StoreError::backend)?;

        Ok(())
    }

    async fn get(&self, contract_id: &str) -> Result<Contract, StoreError> {
        ContractEntity::find_by_id(contract_id.to_owned())
            .one(&self.db)
            .await
            .map_err(StoreError::backend)?
            .ok_or_else(|| StoreError::NotFound {
                id: contract_id.to_owned(),
            })?
            .try_into()
    }
}
