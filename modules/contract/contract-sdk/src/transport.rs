//! gRPC channel construction shared by the contract client and by the
//! identity provisioning client used inside the service.
//!
//! Only connection establishment is retried. Individual RPCs are attempted
//! exactly once; callers decide what a failed call means.

use std::time::Duration;

use anyhow::Context;
use tonic::transport::{Channel, Endpoint};
use tracing::Instrument;

fn duration_to_u64_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Transport settings for an outgoing gRPC channel.
#[derive(Debug, Clone)]
pub struct GrpcClientConfig {
    /// Timeout for establishing the connection.
    pub connect_timeout: Duration,

    /// Deadline applied to every RPC on the channel.
    pub rpc_timeout: Duration,

    /// Extra connection attempts after the first one fails.
    pub max_connect_retries: u32,

    /// Backoff step; attempt `n` waits `n * base_backoff`, capped at `max_backoff`.
    pub base_backoff: Duration,

    pub max_backoff: Duration,

    /// Peer name used in logs and spans.
    pub service_name: &'static str,
}

impl Default for GrpcClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            rpc_timeout: Duration::from_secs(30),
            max_connect_retries: 3,
            base_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
            service_name: "grpc_client",
        }
    }
}

impl GrpcClientConfig {
    /// Create a configuration for the named peer with default timeouts.
    #[must_use]
    pub fn new(service_name: &'static str) -> Self {
        Self {
            service_name,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_connect_retries(mut self, retries: u32) -> Self {
        self.max_connect_retries = retries;
        self
    }
}

/// Build a tonic `Endpoint` with timeouts and HTTP/2 keepalive.
///
/// # Errors
/// Returns an error if `uri` is not a valid URI.
pub fn build_endpoint(uri: &str, cfg: &GrpcClientConfig) -> anyhow::Result<Endpoint> {
    let endpoint = Endpoint::from_shared(uri.to_owned())
        .with_context(|| format!("invalid {} endpoint '{uri}'", cfg.service_name))?
        .connect_timeout(cfg.connect_timeout)
        .timeout(cfg.rpc_timeout)
        .tcp_keepalive(Some(Duration::from_secs(30)))
        .http2_keep_alive_interval(Duration::from_secs(30))
        .keep_alive_timeout(Duration::from_secs(10))
        .keep_alive_while_idle(true);

    Ok(endpoint)
}

/// Build a channel that connects on first use.
///
/// The process can start before its peer; the first RPC pays the connect cost
/// and fails with `UNAVAILABLE` if the peer is still down.
///
/// # Errors
/// Returns an error if `uri` is not a valid URI.
pub fn connect_lazy(uri: &str, cfg: &GrpcClientConfig) -> anyhow::Result<Channel> {
    let endpoint = build_endpoint(uri, cfg)?;
    tracing::debug!(service = cfg.service_name, %uri, "gRPC channel created (lazy)");
    Ok(endpoint.connect_lazy())
}

/// Connect eagerly, retrying with linear backoff.
///
/// # Errors
/// Returns an error if the URI is invalid or every attempt fails.
pub async fn connect_with_retry(uri: &str, cfg: &GrpcClientConfig) -> anyhow::Result<Channel> {
    let endpoint = build_endpoint(uri, cfg)?;
    let span = tracing::debug_span!("grpc_connect", service = cfg.service_name, %uri);

    async move {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match endpoint.connect().await {
                Ok(channel) => {
                    tracing::info!(
                        service = cfg.service_name,
                        attempt,
                        "gRPC client connected"
                    );
                    return Ok(channel);
                }
                Err(e) if attempt <= cfg.max_connect_retries => {
                    let backoff = (cfg.base_backoff * attempt).min(cfg.max_backoff);
                    tracing::warn!(
                        service = cfg.service_name,
                        attempt,
                        max_retries = cfg.max_connect_retries,
                        error = %e,
                        backoff_ms = duration_to_u64_ms(backoff),
                        "gRPC connection failed, retrying..."
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    tracing::error!(
                        service = cfg.service_name,
                        attempt,
                        error = %e,
                        "gRPC connection failed after all retries"
                    );
                    return Err(e).with_context(|| {
                        format!(
                            "failed to connect to {} after {attempt} attempts",
                            cfg.service_name
                        )
                    });
                }
            }
        }
    }
    .instrument(span)
    .await
}
