//! gRPC server bootstrap for the contract service.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;

use crate::module::ContractModule;

/// Bind `addr` and serve until `cancel` fires.
///
/// # Errors
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve_tcp(
    addr: SocketAddr,
    module: &ContractModule,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind gRPC listener on {addr}"))?;
    serve(listener, module, cancel).await
}

/// Serve `tks.contract.v1.ContractService` on an already bound listener.
///
/// Stops accepting connections once `cancel` fires and waits for in-flight
/// requests to finish.
///
/// # Errors
/// Returns an error if the server fails.
pub async fn serve(
    listener: TcpListener,
    module: &ContractModule,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let bound_addr = listener.local_addr()?;
    tracing::info!(
        %bound_addr,
        transport = "tcp",
        service = contract_sdk::SERVICE_NAME,
        "gRPC server listening"
    );

    let svc = module.grpc_service(cancel.clone());
    let incoming = TcpListenerStream::new(listener);
    Server::builder()
        .add_service(svc)
        .serve_with_incoming_shutdown(incoming, async move {
            cancel.cancelled().await;
        })
        .await?;

    tracing::info!("gRPC server stopped");
    Ok(())
}
