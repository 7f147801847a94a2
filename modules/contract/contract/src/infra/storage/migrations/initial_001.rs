use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let conn = manager.get_connection();

        let sql = match backend {
            sea_orm::DatabaseBackend::Postgres => {
                r"
CREATE TABLE IF NOT EXISTS contracts (
    id TEXT PRIMARY KEY NOT NULL,
    contractor_name TEXT NOT NULL,
    csp_id TEXT NOT NULL,
    available_services JSONB NOT NULL,
    quota JSONB NOT NULL,
    last_updated_ts TIMESTAMPTZ NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_contracts_csp_id ON contracts(csp_id);
                "
            }
            sea_orm::DatabaseBackend::MySql => {
                r"
CREATE TABLE IF NOT EXISTS contracts (
    id VARCHAR(255) PRIMARY KEY NOT NULL,
    contractor_name VARCHAR(255) NOT NULL,
    csp_id VARCHAR(255) NOT NULL,
    available_services JSON NOT NULL,
    quota JSON NOT NULL,
    last_updated_ts TIMESTAMP NOT NULL,
    KEY idx_contracts_csp_id (csp_id)
);
                "
            }
            sea_orm::DatabaseBackend::Sqlite => {
                r"
CREATE TABLE IF NOT EXISTS contracts (
    id TEXT PRIMARY KEY NOT NULL,
    contractor_name TEXT NOT NULL,
    csp_id TEXT NOT NULL,
    available_services TEXT NOT NULL,
    quota TEXT NOT NULL,
    last_updated_ts TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_contracts_csp_id ON contracts(csp_id);
                "
            }
        };

        conn.execute_unprepared(sql).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        conn.execute_unprepared("DROP TABLE IF EXISTS contracts;").await?;
        Ok(())
    }
}
