use std::future::Future;
use std::sync::Arc;

use axum::Router;
use shortwave_core::LinkStore;
use tokio::net::TcpListener;
use tracing::info;

/// Runs the server until `shutdown` resolves, then flushes the store.
///
/// The store is closed even when serving fails: the file backend only
/// persists on `close`, so skipping it on a serve error would lose
/// every write of the session. The serve error still wins over a close
/// error in what gets reported.
pub async fn run(
    listener: TcpListener,
    router: Router,
    store: Arc<dyn LinkStore>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await;

    let closed = store.close().await;

    served?;
    closed?;
    info!("server shutdown");
    Ok(())
}
