//! In-process contract store.

use async_trait::async_trait;
use contract_sdk::Contract;
use dashmap::DashMap;
use time::OffsetDateTime;

use crate::domain::ports::{ContractRepository, NewContractRecord, StoreError};

/// `DashMap`-backed store. Writes to one key are serialized by the shard lock.
///
/// Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryContractRepository {
    contracts: DashMap<String, Contract>,
}

impl InMemoryContractRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

#[async_trait]
impl ContractRepository for InMemoryContractRepository {
    async fn post(&self, record: NewContractRecord) -> Result<(), StoreError> {
        let contract = Contract {
            id: record.id,
            contractor_name: record.contractor_name,
            csp_id: record.csp_id,
            available_services: record.available_services,
            quota: record.quota,
            last_updated_ts: OffsetDateTime::now_utc(),
        };
        self.contracts.insert(contract.id.clone(), contract);
        Ok(())
    }

    async fn get(&self, contract_id: &str) -> Result<Contract, StoreError> {
        self.contracts
            .get(contract_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound {
                id: contract_id.to_owned(),
            })
    }
}
