//! `IdentityProvisioner` over `tks.info.v1.InfoService`.

use async_trait::async_trait;
use contract_sdk::ResultCode;
use contract_sdk::proto::info::CreateCspInfoRequest;
use contract_sdk::proto::info::info_service_client::InfoServiceClient;
use contract_sdk::transport::{GrpcClientConfig, connect_lazy};
use secrecy::{ExposeSecret, SecretString};
use tonic::transport::Channel;

use crate::domain::ports::{IdentityProvisioner, ProvisioningError};

/// gRPC client of the identity provisioning service.
///
/// Each call is a single attempt. A transport failure is reported with the
/// status code it carried, since both sides use gRPC code numbering.
#[derive(Clone)]
pub struct GrpcIdentityProvisioner {
    inner: InfoServiceClient<Channel>,
}

impl GrpcIdentityProvisioner {
    /// Build a provisioner that dials `endpoint` on first use.
    ///
    /// # Errors
    /// Returns an error if `endpoint` is not a valid URI.
    pub fn connect_lazy(endpoint: &str, cfg: &GrpcClientConfig) -> anyhow::Result<Self> {
        let channel = connect_lazy(endpoint, cfg)?;
        Ok(Self::from_channel(channel))
    }

    #[must_use]
    pub fn from_channel(channel: Channel) -> Self {
        Self {
            inner: InfoServiceClient::new(channel),
        }
    }
}

#[async_trait]
impl IdentityProvisioner for GrpcIdentityProvisioner {
    async fn create_csp_identity(
        &self,
        contract_id: &str,
        csp_name: &str,
        csp_auth: &SecretString,
    ) -> Result<String, ProvisioningError> {
        let mut client = self.inner.clone();
        let request = CreateCspInfoRequest {
            contract_id: contract_id.to_owned(),
            csp_name: csp_name.to_owned(),
            auth: csp_auth.expose_secret().to_owned(),
        };

        let response = client
            .create_csp_info(request)
            .await
            .map_err(|status| {
                ProvisioningError::new(status.code().into(), status.message().to_owned())
            })?
            .into_inner();

        let code = ResultCode::from_wire(response.code);
        if !code.is_ok() {
            let message = response
                .error
                .map(|e| e.msg)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("identity provisioning failed with {code}"));
            return Err(ProvisioningError::new(code, message));
        }

        Ok(response.id)
    }
}
