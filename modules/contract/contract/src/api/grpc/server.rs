//! gRPC Server implementation for contracts
//!
//! The server implementation handles gRPC requests and delegates
//! to the domain Service for business logic. Every call answers with
//! `Ok(Response)`; failures travel in the `code` and `error` fields of
//! the response envelope.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tonic::metadata::MetadataMap;
use tonic::{Request, Response, Status};
use tracing::{Instrument, error, warn};

use contract_sdk::proto::common::Error as ProtoError;
use contract_sdk::proto::contract::{
    CreateContractRequest, CreateContractResponse, GetContractRequest, GetContractResponse,
    GetQuotaRequest, GetQuotaResponse, GetServicesRequest, GetServicesResponse,
    UpdateQuotaRequest, UpdateQuotaResponse, UpdateServicesRequest, UpdateServicesResponse,
};
use contract_sdk::{ContractError, ContractService, NewContract, ResultCode};

use crate::domain::{DomainError, Service};

/// Wire `code` and `error` for a failed call.
fn failure(err: DomainError) -> (i32, Option<ProtoError>) {
    let err = ContractError::from(err);
    (err.code().to_wire(), Some(ProtoError::from(&err)))
}

/// Log and build the envelope of an operation this version does not provide.
fn not_implemented(operation: &'static str, contract_id: &str) -> (i32, Option<ProtoError>) {
    warn!(contract.id = %contract_id, "Not implemented: {operation}");
    failure(DomainError::unimplemented(operation))
}

/// Time budget the caller sent as `grpc-timeout`, if any.
///
/// The value is at most eight digits followed by one of `H M S m u n`.
fn caller_timeout(metadata: &MetadataMap) -> Option<Duration> {
    let raw = metadata.get("grpc-timeout")?.to_str().ok()?;
    let (digits, unit) = raw.split_at(raw.len().checked_sub(1)?);
    if digits.is_empty() || digits.len() > 8 {
        return None;
    }
    let value: u64 = digits.parse().ok()?;
    let timeout = match unit {
        "H" => Duration::from_secs(value * 3600),
        "M" => Duration::from_secs(value * 60),
        "S" => Duration::from_secs(value),
        "m" => Duration::from_millis(value),
        "u" => Duration::from_micros(value),
        "n" => Duration::from_nanos(value),
        _ => return None,
    };
    Some(timeout)
}

/// Deadline for the workflow, ahead of the caller's so the envelope can
/// still be sent before tonic gives up on the call.
fn workflow_deadline(budget: Duration) -> Instant {
    let reserve = (budget / 5).min(Duration::from_millis(500));
    Instant::now() + (budget - reserve)
}

/// gRPC service implementation that wraps the domain Service.
#[derive(Clone)]
pub struct ContractServiceImpl {
    service: Arc<Service>,
    shutdown: CancellationToken,
}

impl ContractServiceImpl {
    /// Create a new `ContractService` implementation with the given Service.
    ///
    /// Once `shutdown` fires new contracts are refused with `UNAVAILABLE`.
    /// Workflows already running are left to finish.
    #[must_use]
    pub fn new(service: Arc<Service>, shutdown: CancellationToken) -> Self {
        Self { service, shutdown }
    }

    /// Run the create workflow on its own task.
    ///
    /// If tonic drops this future (client gone, deadline hit) the workflow is
    /// cancelled but still runs to its error branch, so an orphaned identity
    /// is logged.
    async fn spawn_create(
        &self,
        deadline: Option<Instant>,
        new_contract: NewContract,
    ) -> Result<String, DomainError> {
        let cancel = CancellationToken::new();
        let _cancel_on_drop = cancel.clone().drop_guard();
        let service = Arc::clone(&self.service);

        let workflow = async move {
            service.create_contract_until(&cancel, deadline, new_contract).await
        };
        tokio::spawn(workflow.in_current_span())
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, "create-contract task failed");
                Err(DomainError::internal("create-contract task failed"))
            })
    }
}

#[tonic::async_trait]
impl ContractService for ContractServiceImpl {
    async fn create_contract(
        &self,
        request: Request<CreateContractRequest>,
    ) -> Result<Response<CreateContractResponse>, Status> {
        let deadline = caller_timeout(request.metadata()).map(workflow_deadline);
        let req = request.into_inner();
        let new_contract = NewContract {
            id: req.contract_id,
            contractor_name: req.contractor_name,
            csp_name: req.csp_name,
            csp_auth: SecretString::from(req.csp_auth),
            available_services: req.available_services,
            quota: req.quota.map(Into::into).unwrap_or_default(),
        };

        let outcome = if self.shutdown.is_cancelled() {
            Err(DomainError::provisioning(ResultCode::Unavailable, "server is shutting down"))
        } else {
            self.spawn_create(deadline, new_contract).await
        };

        let response = match outcome {
            Ok(csp_id) => CreateContractResponse {
                code: ResultCode::Ok.to_wire(),
                error: None,
                csp_id,
            },
            Err(e) => {
                let (code, error) = failure(e);
                CreateContractResponse {
                    code,
                    error,
                    csp_id: String::new(),
                }
            }
        };

        Ok(Response::new(response))
    }

    async fn update_quota(
        &self,
        request: Request<UpdateQuotaRequest>,
    ) -> Result<Response<UpdateQuotaResponse>, Status> {
        let (code, error) = not_implemented("UpdateQuota", &request.get_ref().contract_id);
        Ok(Response::new(UpdateQuotaResponse {
            code,
            error,
            ..Default::default()
        }))
    }

    async fn update_services(
        &self,
        request: Request<UpdateServicesRequest>,
    ) -> Result<Response<UpdateServicesResponse>, Status> {
        let (code, error) = not_implemented("UpdateServices", &request.get_ref().contract_id);
        Ok(Response::new(UpdateServicesResponse {
            code,
            error,
            ..Default::default()
        }))
    }

    async fn get_contract(
        &self,
        request: Request<GetContractRequest>,
    ) -> Result<Response<GetContractResponse>, Status> {
        let req = request.into_inner();

        let response = match self.service.get_contract(&req.contract_id).await {
            Ok(contract) => GetContractResponse {
                code: ResultCode::Ok.to_wire(),
                error: None,
                contract: Some(contract.into()),
            },
            Err(e) => {
                let (code, error) = failure(e);
                GetContractResponse {
                    code,
                    error,
                    contract: None,
                }
            }
        };

        Ok(Response::new(response))
    }

    async fn get_quota(
        &self,
        request: Request<GetQuotaRequest>,
    ) -> Result<Response<GetQuotaResponse>, Status> {
        let (code, error) = not_implemented("GetQuota", &request.get_ref().contract_id);
        Ok(Response::new(GetQuotaResponse {
            code,
            error,
            quota: None,
        }))
    }

    async fn get_services(
        &self,
        request: Request<GetServicesRequest>,
    ) -> Result<Response<GetServicesResponse>, Status> {
        let (code, error) = not_implemented("GetServices", &request.get_ref().contract_id);
        Ok(Response::new(GetServicesResponse {
            code,
            error,
            services: Vec::new(),
        }))
    }
}
