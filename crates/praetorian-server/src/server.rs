//! Listener and lifecycle: serve until a shutdown signal, then drain in-flight
//! requests for a bounded grace period.

use std::{
    future::{Future, IntoFuture},
    io,
    net::SocketAddr,
    time::Duration,
};

use axum::Router;
use thiserror::Error;
use tokio::{net::TcpListener, signal, sync::oneshot, time};
use tracing::{error, info, warn};

/// How long in-flight requests get to finish after a shutdown signal.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[from] io::Error),
    #[error("forced shutdown: requests still in flight after {0:?}")]
    ForcedShutdown(Duration),
}

pub async fn bind(addr: SocketAddr) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

/// Serve `router` on `listener` until `shutdown` resolves.
///
/// Once it does, new connections are refused and open ones are drained. If
/// they have not finished within `grace_period` the server is abandoned and
/// [`ServerError::ForcedShutdown`] is returned.
pub async fn serve<F>(
    listener: TcpListener,
    router: Router,
    shutdown: F,
    grace_period: Duration,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "listening");
    }

    let (stopping_tx, stopping_rx) = oneshot::channel::<()>();
    let signal = async move {
        shutdown.await;
        let _ = stopping_tx.send(());
    };

    let server = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(signal)
    .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return result.map_err(ServerError::from),
        _ = stopping_rx => {}
    }

    info!("performing graceful shutdown");
    match time::timeout(grace_period, server).await {
        Ok(Ok(())) => {
            info!("server shutdown successful");
            Ok(())
        }
        Ok(Err(err)) => Err(ServerError::Serve(err)),
        Err(_) => {
            warn!(?grace_period, "forced shutdown");
            Err(ServerError::ForcedShutdown(grace_period))
        }
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
