//! Process signals for the contract server.

use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Cancel `token` on Ctrl+C or SIGTERM.
///
/// Returns without waiting if `token` is cancelled elsewhere first. If a
/// handler cannot be installed the token is cancelled right away.
pub async fn cancel_on_signal(token: CancellationToken) {
    tokio::select! {
        biased;
        () = token.cancelled() => return,
        received = termination() => match received {
            Ok(name) => tracing::info!(signal = name, "shutdown signal received"),
            Err(e) => tracing::error!(error = %e, "signal handling failed; shutting down"),
        },
    }
    token.cancel();
}

/// Name of the first termination signal delivered to the process.
#[cfg(unix)]
async fn termination() -> std::io::Result<&'static str> {
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
    tokio::select! {
        res = signal::ctrl_c() => res.map(|()| "SIGINT"),
        _ = sigterm.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn termination() -> std::io::Result<&'static str> {
    signal::ctrl_c().await.map(|()| "ctrl-c")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn stops_waiting_once_cancelled_elsewhere() {
        let token = CancellationToken::new();
        let waiter = tokio::spawn(cancel_on_signal(token.clone()));

        token.cancel();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("returns after cancellation")
            .unwrap();
    }
}
