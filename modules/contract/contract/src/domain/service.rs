//! Domain service for contracts
//!
//! Runs the create-contract workflow: provision a CSP identity, then persist
//! the contract that references it. The two steps are not atomic. If the
//! store fails after provisioning succeeded, the identity stays where it is
//! and the failure is reported with the store's message.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use contract_sdk::{Contract, NewContract, ResultCode};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::domain::error::DomainError;
use crate::domain::ports::{ContractRepository, IdentityProvisioner, NewContractRecord, StoreError};

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub provisioning_timeout: Duration,
    pub persistence_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            provisioning_timeout: Duration::from_secs(15),
            persistence_timeout: Duration::from_secs(5),
        }
    }
}

/// Outcome of a guarded collaborator call.
enum Guarded<T> {
    Done(T),
    Cancelled,
    TimedOut,
}

/// Await `fut` unless `cancel` fires or `limit` elapses first.
///
/// Cancellation wins ties, so an already-cancelled request never starts the call.
async fn guarded<F: Future>(
    cancel: &CancellationToken,
    limit: Duration,
    fut: F,
) -> Guarded<F::Output> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Guarded::Cancelled,
        res = tokio::time::timeout(limit, fut) => match res {
            Ok(out) => Guarded::Done(out),
            Err(_) => Guarded::TimedOut,
        },
    }
}

/// Configured step timeout, shortened to what is left before `deadline`.
fn step_limit(configured: Duration, deadline: Option<Instant>) -> Duration {
    deadline.map_or(configured, |deadline| {
        configured.min(deadline.saturating_duration_since(Instant::now()))
    })
}

/// Domain service orchestrating identity provisioning and contract storage.
///
/// Stateless apart from its collaborators; safe to share across requests.
#[derive(Clone)]
pub struct Service {
    provisioner: Arc<dyn IdentityProvisioner>,
    repo: Arc<dyn ContractRepository>,
    config: ServiceConfig,
}

impl Service {
    #[must_use]
    pub fn new(
        provisioner: Arc<dyn IdentityProvisioner>,
        repo: Arc<dyn ContractRepository>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            provisioner,
            repo,
            config,
        }
    }

    /// Provision a CSP identity for the contract, then store the contract.
    ///
    /// Returns the new CSP id. No uniqueness check is made against existing
    /// contracts; a second call with the same id provisions a second identity
    /// and overwrites the stored record.
    ///
    /// # Errors
    /// - [`DomainError::InvalidArgument`] for an empty contract id, before any side effect
    /// - [`DomainError::Provisioning`] if the identity could not be created; nothing is stored
    /// - [`DomainError::Persistence`] if the store failed; the identity is orphaned
    pub async fn create_contract(
        &self,
        cancel: &CancellationToken,
        new_contract: NewContract,
    ) -> Result<String, DomainError> {
        self.create_contract_until(cancel, None, new_contract).await
    }

    /// [`Service::create_contract`] with every step also bounded by `deadline`.
    ///
    /// A step cut short by the deadline fails the same way as one that hits
    /// its configured timeout.
    ///
    /// # Errors
    /// Same as [`Service::create_contract`].
    #[instrument(
        name = "contract.service.create_contract",
        skip_all,
        fields(contract.id = %new_contract.id, contractor = %new_contract.contractor_name)
    )]
    pub async fn create_contract_until(
        &self,
        cancel: &CancellationToken,
        deadline: Option<Instant>,
        new_contract: NewContract,
    ) -> Result<String, DomainError> {
        debug!("Request 'CreateContract'");

        if new_contract.id.is_empty() {
            return Err(DomainError::invalid_argument("contract_id", "must not be empty"));
        }

        let NewContract {
            id,
            contractor_name,
            csp_name,
            csp_auth,
            available_services,
            quota,
        } = new_contract;

        let limit = step_limit(self.config.provisioning_timeout, deadline);
        let csp_id = match guarded(
            cancel,
            limit,
            self.provisioner.create_csp_identity(&id, &csp_name, &csp_auth),
        )
        .await
        {
            Guarded::Done(Ok(csp_id)) => csp_id,
            Guarded::Done(Err(e)) => {
                debug!(code = %e.code, error = %e.message, "CSP provisioning failed");
                return Err(DomainError::provisioning(e.code, e.message));
            }
            Guarded::Cancelled => {
                return Err(DomainError::provisioning(
                    ResultCode::Cancelled,
                    "request cancelled during CSP provisioning",
                ));
            }
            Guarded::TimedOut => {
                return Err(DomainError::provisioning(
                    ResultCode::DeadlineExceeded,
                    format!("CSP provisioning did not complete within {limit:?}"),
                ));
            }
        };

        info!(csp.id = %csp_id, "newly created CSP identity");

        let record = NewContractRecord {
            id,
            contractor_name,
            csp_id: csp_id.clone(),
            available_services,
            quota,
        };

        let limit = step_limit(self.config.persistence_timeout, deadline);
        let message = match guarded(cancel, limit, self.repo.post(record)).await {
            Guarded::Done(Ok(())) => return Ok(csp_id),
            Guarded::Done(Err(e)) => e.to_string(),
            Guarded::Cancelled => "request cancelled while storing contract".to_owned(),
            Guarded::TimedOut => format!("storing contract did not complete within {limit:?}"),
        };

        warn!(
            csp.id = %csp_id,
            error = %message,
            "contract not stored; CSP identity left orphaned"
        );
        Err(DomainError::persistence(Some(csp_id), message))
    }

    /// Fetch a stored contract.
    ///
    /// # Errors
    /// - [`DomainError::NotFound`] if no contract has this id
    /// - [`DomainError::Persistence`] if the store failed
    #[instrument(name = "contract.service.get_contract", skip(self))]
    pub async fn get_contract(&self, contract_id: &str) -> Result<Contract, DomainError> {
        debug!("Request 'GetContract'");

        self.repo.get(contract_id).await.map_err(|e| match e {
            StoreError::NotFound { .. } => DomainError::not_found(contract_id, e.to_string()),
            StoreError::Backend(message) => DomainError::persistence(None, message),
        })
    }
}
