//! gRPC client implementation of `ContractClientV1`.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use tonic::transport::Channel;

use crate::api::ContractClientV1;
use crate::errors::ContractError;
use crate::models::{Contract, ContractQuota, NewContract, ResultCode};
use crate::proto::common::Error as ProtoError;
use crate::proto::contract::contract_service_client::ContractServiceClient;
use crate::proto::contract::{
    CreateContractRequest, GetContractRequest, GetQuotaRequest, GetServicesRequest,
    UpdateQuotaRequest, UpdateServicesRequest,
};
use crate::transport::{GrpcClientConfig, connect_with_retry};

/// gRPC client for the contract service.
///
/// Cheap to clone; clones share the underlying channel.
#[derive(Clone)]
pub struct ContractGrpcClient {
    inner: ContractServiceClient<Channel>,
}

impl ContractGrpcClient {
    /// Connect using default configuration with retries.
    ///
    /// # Errors
    /// Returns an error if the URI is invalid or the service cannot be reached.
    pub async fn connect(uri: &str) -> anyhow::Result<Self> {
        Self::connect_with_config(uri, &GrpcClientConfig::new("contract")).await
    }

    /// Connect using the given transport configuration.
    ///
    /// # Errors
    /// Returns an error if the URI is invalid or the service cannot be reached.
    pub async fn connect_with_config(uri: &str, cfg: &GrpcClientConfig) -> anyhow::Result<Self> {
        let channel = connect_with_retry(uri, cfg).await?;
        Ok(Self::from_channel(channel))
    }

    /// Wrap an existing channel.
    #[must_use]
    pub fn from_channel(channel: Channel) -> Self {
        Self {
            inner: ContractServiceClient::new(channel),
        }
    }
}

fn transport_err(status: &tonic::Status) -> ContractError {
    ContractError::transport(status.code().into(), status.message())
}

/// Turn a response envelope into `Ok(())` or the matching error.
fn check_envelope(
    code: i32,
    error: Option<ProtoError>,
    operation: &str,
) -> Result<(), ContractError> {
    let code = ResultCode::from_wire(code);
    if code.is_ok() {
        return Ok(());
    }
    let message = error.map(|e| e.msg).unwrap_or_default();
    Err(ContractError::from_envelope(code, message, operation))
}

#[async_trait]
impl ContractClientV1 for ContractGrpcClient {
    async fn create_contract(&self, new_contract: NewContract) -> Result<String, ContractError> {
        let mut client = self.inner.clone();
        let request = CreateContractRequest {
            contractor_name: new_contract.contractor_name,
            contract_id: new_contract.id,
            csp_name: new_contract.csp_name,
            csp_auth: new_contract.csp_auth.expose_secret().to_owned(),
            quota: Some(new_contract.quota.into()),
            available_services: new_contract.available_services,
        };

        let response = client
            .create_contract(request)
            .await
            .map_err(|status| transport_err(&status))?
            .into_inner();

        check_envelope(response.code, response.error, "CreateContract")?;
        Ok(response.csp_id)
    }

    async fn get_contract(&self, contract_id: &str) -> Result<Contract, ContractError> {
        let mut client = self.inner.clone();
        let response = client
            .get_contract(GetContractRequest {
                contract_id: contract_id.to_owned(),
            })
            .await
            .map_err(|status| transport_err(&status))?
            .into_inner();

        check_envelope(response.code, response.error, "GetContract")?;
        response
            .contract
            .ok_or_else(|| ContractError::malformed("response carries no contract"))?
            .try_into()
    }

    async fn update_quota(
        &self,
        contract_id: &str,
        quota: ContractQuota,
    ) -> Result<ContractQuota, ContractError> {
        let mut client = self.inner.clone();
        let response = client
            .update_quota(UpdateQuotaRequest {
                contract_id: contract_id.to_owned(),
                quota: Some(quota.into()),
            })
            .await
            .map_err(|status| transport_err(&status))?
            .into_inner();

        check_envelope(response.code, response.error, "UpdateQuota")?;
        Ok(response.current_quota.map(Into::into).unwrap_or_default())
    }

    async fn update_services(
        &self,
        contract_id: &str,
        services: Vec<String>,
    ) -> Result<Vec<String>, ContractError> {
        let mut client = self.inner.clone();
        let response = client
            .update_services(UpdateServicesRequest {
                contract_id: contract_id.to_owned(),
                available_services: services,
            })
            .await
            .map_err(|status| transport_err(&status))?
            .into_inner();

        check_envelope(response.code, response.error, "UpdateServices")?;
        Ok(response.current_services)
    }

    async fn get_quota(&self, contract_id: &str) -> Result<ContractQuota, ContractError> {
        let mut client = self.inner.clone();
        let response = client
            .get_quota(GetQuotaRequest {
                contract_id: contract_id.to_owned(),
            })
            .await
            .map_err(|status| transport_err(&status))?
            .into_inner();

        check_envelope(response.code, response.error, "GetQuota")?;
        Ok(response.quota.map(Into::into).unwrap_or_default())
    }

    async fn get_services(&self, contract_id: &str) -> Result<Vec<String>, ContractError> {
        let mut client = self.inner.clone();
        let response = client
            .get_services(GetServicesRequest {
                contract_id: contract_id.to_owned(),
            })
            .await
            .map_err(|status| transport_err(&status))?
            .into_inner();

        check_envelope(response.code, response.error, "GetServices")?;
        Ok(response.services)
    }
}
