use contract_sdk::{Contract, ContractQuota};
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::ports::{NewContractRecord, StoreError};
use crate::infra::storage::entity::{ActiveModel, Model};

/// Column layout of `contracts.quota`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct QuotaColumn {
    cpu: i64,
    memory: i64,
    block: i64,
    block_ssd: i64,
    fs: i64,
    fs_ssd: i64,
}

impl From<ContractQuota> for QuotaColumn {
    fn from(q: ContractQuota) -> Self {
        Self {
            cpu: q.cpu,
            memory: q.memory,
            block: q.block,
            block_ssd: q.block_ssd,
            fs: q.fs,
            fs_ssd: q.fs_ssd,
        }
    }
}

impl From<QuotaColumn> for ContractQuota {
    fn from(q: QuotaColumn) -> Self {
        Self {
            cpu: q.cpu,
            memory: q.memory,
            block: q.block,
            block_ssd: q.block_ssd,
            fs: q.fs,
            fs_ssd: q.fs_ssd,
        }
    }
}

/// Build the row for an upsert, stamped with `now`.
pub fn to_active_model(
    record: NewContractRecord,
    now: OffsetDateTime,
) -> Result<ActiveModel, StoreError> {
    let available_services =
        serde_json::to_value(&record.available_services).map_err(StoreError::backend)?;
    let quota =
        serde_json::to_value(QuotaColumn::from(record.quota)).map_err(StoreError::backend)?;

    Ok(ActiveModel {
        id: Set(record.id),
        contractor_name: Set(record.contractor_name),
        csp_id: Set(record.csp_id),
        available_services: Set(available_services),
        quota: Set(quota),
        last_updated_ts: Set(now),
    })
}

/// Convert a database row to a contract model
impl TryFrom<Model> for Contract {
    type Error = StoreError;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let available_services: Vec<String> = serde_json::from_value(m.available_services)
            .map_err(|e| {
                StoreError::backend(format!("corrupt available_services for '{}': {e}", m.id))
            })?;
        let quota: QuotaColumn = serde_json::from_value(m.quota)
            .map_err(|e| StoreError::backend(format!("corrupt quota for '{}': {e}", m.id)))?;

        Ok(Self {
            id: m.id,
            contractor_name: m.contractor_name,
            csp_id: m.csp_id,
            available_services,
            quota: quota.into(),
            last_updated_ts: m.last_updated_ts,
        })
    }
}
