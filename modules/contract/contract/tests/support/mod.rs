#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

//! Shared fakes and fixtures for contract integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use contract::ContractModule;
use contract::domain::{
    ContractRepository, IdentityProvisioner, NewContractRecord, ProvisioningError, Service,
    ServiceConfig, StoreError,
};
use contract::infra::storage::InMemoryContractRepository;
use contract_sdk::proto::common::Error as ProtoError;
use contract_sdk::proto::contract::CreateContractRequest;
use contract_sdk::proto::info::info_service_server::{InfoService, InfoServiceServer};
use contract_sdk::proto::info::{CreateCspInfoRequest, IdResponse};
use contract_sdk::{Contract, ContractQuota, NewContract, ResultCode};
use secrecy::{ExposeSecret, SecretString};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;

/// One observed call to the provisioning service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionCall {
    pub contract_id: String,
    pub csp_name: String,
    pub csp_auth: String,
}

/// Provisioner returning a fixed outcome and recording every call.
pub struct FakeProvisioner {
    outcome: Result<String, ProvisioningError>,
    delay: Option<Duration>,
    calls: Mutex<Vec<ProvisionCall>>,
}

impl FakeProvisioner {
    pub fn returning(csp_id: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(csp_id.to_owned()),
            delay: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(code: ResultCode, message: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(ProvisioningError::new(code, message)),
            delay: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn slow(csp_id: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(csp_id.to_owned()),
            delay: Some(delay),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<ProvisionCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityProvisioner for FakeProvisioner {
    async fn create_csp_identity(
        &self,
        contract_id: &str,
        csp_name: &str,
        csp_auth: &SecretString,
    ) -> Result<String, ProvisioningError> {
        self.calls.lock().unwrap().push(ProvisionCall {
            contract_id: contract_id.to_owned(),
            csp_name: csp_name.to_owned(),
            csp_auth: csp_auth.expose_secret().to_owned(),
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone()
    }
}

/// In-memory store that records writes and can be told to fail or stall.
#[derive(Default)]
pub struct RecordingRepository {
    inner: InMemoryContractRepository,
    posts: Mutex<Vec<NewContractRecord>>,
    fail_with: Mutex<Option<StoreError>>,
    fail_reads: Mutex<Option<StoreError>>,
    delay: Mutex<Option<Duration>>,
}

impl RecordingRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(message: &str) -> Arc<Self> {
        let repo = Self::default();
        *repo.fail_with.lock().unwrap() = Some(StoreError::backend(message));
        Arc::new(repo)
    }

    /// Writes succeed; every read fails with a backend error.
    pub fn unreadable(message: &str) -> Arc<Self> {
        let repo = Self::default();
        *repo.fail_reads.lock().unwrap() = Some(StoreError::backend(message));
        Arc::new(repo)
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        let repo = Self::default();
        *repo.delay.lock().unwrap() = Some(delay);
        Arc::new(repo)
    }

    pub fn posts(&self) -> Vec<NewContractRecord> {
        self.posts.lock().unwrap().clone()
    }

    pub fn stored(&self) -> usize {
        self.inner.len()
    }
}

#[async_trait]
impl ContractRepository for RecordingRepository {
    async fn post(&self, record: NewContractRecord) -> Result<(), StoreError> {
        self.posts.lock().unwrap().push(record.clone());
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let failure = self.fail_with.lock().unwrap().clone();
        if let Some(err) = failure {
            return Err(err);
        }
        self.inner.post(record).await
    }

    async fn get(&self, contract_id: &str) -> Result<Contract, StoreError> {
        let failure = self.fail_reads.lock().unwrap().clone();
        if let Some(err) = failure {
            return Err(err);
        }
        self.inner.get(contract_id).await
    }
}

pub fn service(
    provisioner: Arc<dyn IdentityProvisioner>,
    repo: Arc<dyn ContractRepository>,
) -> Service {
    Service::new(provisioner, repo, ServiceConfig::default())
}

pub fn quota() -> ContractQuota {
    ContractQuota {
        cpu: 16,
        memory: 64,
        block: 500,
        block_ssd: 100,
        fs: 200,
        fs_ssd: 50,
    }
}

/// Request for contract `c-1` of contractor `acme` on CSP `aws`.
pub fn acme_contract() -> NewContract {
    new_contract("c-1")
}

pub fn new_contract(id: &str) -> NewContract {
    NewContract {
        id: id.to_owned(),
        contractor_name: "acme".to_owned(),
        csp_name: "aws".to_owned(),
        csp_auth: SecretString::from("aws-key:aws-secret".to_owned()),
        available_services: vec!["compute".to_owned(), "storage".to_owned()],
        quota: quota(),
    }
}

/// Wire form of [`acme_contract`].
pub fn acme_request() -> CreateContractRequest {
    CreateContractRequest {
        contractor_name: "acme".to_owned(),
        contract_id: "c-1".to_owned(),
        csp_name: "aws".to_owned(),
        csp_auth: "aws-key:aws-secret".to_owned(),
        quota: Some(quota().into()),
        available_services: vec!["compute".to_owned(), "storage".to_owned()],
    }
}

/// Running contract server bound to an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub cancel: CancellationToken,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
    pub fn uri(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn shutdown(self) -> anyhow::Result<()> {
        self.cancel.cancel();
        self.handle.await?
    }
}

pub async fn spawn_contract_server(service: Service) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();
    let module = ContractModule::from_service(Arc::new(service));

    let server_cancel = cancel.clone();
    let handle = tokio::spawn(async move {
        contract::server::serve(listener, &module, server_cancel).await
    });

    TestServer {
        addr,
        cancel,
        handle,
    }
}

/// Stand-in for the identity service: `csp_name == "aws"` succeeds with
/// `csp-42`; anything else is rejected with `PERMISSION_DENIED`.
#[derive(Clone, Default)]
pub struct FakeInfoService {
    requests: Arc<Mutex<Vec<CreateCspInfoRequest>>>,
}

impl FakeInfoService {
    pub fn requests(&self) -> Vec<CreateCspInfoRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[tonic::async_trait]
impl InfoService for FakeInfoService {
    async fn create_csp_info(
        &self,
        request: tonic::Request<CreateCspInfoRequest>,
    ) -> Result<tonic::Response<IdResponse>, tonic::Status> {
        let req = request.into_inner();
        self.requests.lock().unwrap().push(req.clone());

        let response = if req.csp_name == "aws" {
            IdResponse {
                code: ResultCode::Ok.to_wire(),
                error: None,
                id: "csp-42".to_owned(),
            }
        } else {
            IdResponse {
                code: ResultCode::PermissionDenied.to_wire(),
                error: Some(ProtoError {
                    msg: format!("unsupported CSP '{}'", req.csp_name),
                }),
                id: String::new(),
            }
        };
        Ok(tonic::Response::new(response))
    }
}

/// Serve `fake` on an ephemeral port until the returned token is cancelled.
pub async fn spawn_info_server(fake: FakeInfoService) -> (String, CancellationToken) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        tonic::transport::Server::builder()
            .add_service(InfoServiceServer::new(fake))
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
                shutdown.cancelled().await;
            })
            .await
    });

    (format!("http://{addr}"), cancel)
}
