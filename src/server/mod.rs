//! Server bootstrap: binds a `TcpListener` and spawns one worker task per
//! accepted connection, all sharing a single [`Registry`].

pub mod router;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;

use crate::registry::Registry;
use crate::transport;

/// Binds and runs the accept loop until the listener errors out. Each
/// connection is handled on its own task; the registry is the only state
/// shared between them.
pub async fn run(addr: SocketAddr, max_equipment: u8) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    log::info!("listening on {} (max {max_equipment} equipment)", listener.local_addr()?);
    serve(listener, max_equipment).await
}

/// Drives the accept loop on an already-bound listener. Split out from
/// [`run`] so tests can bind an ephemeral port and discover it before the
/// loop starts.
pub async fn serve(listener: TcpListener, max_equipment: u8) -> Result<()> {
    let registry = Arc::new(Registry::new(max_equipment));

    loop {
        let (stream, peer) = listener.accept().await.context("accept failed")?;
        log::info!("accepted connection from {peer}");
        let registry = Arc::clone(&registry);
        tokio::spawn(async move {
            transport::handle_connection(stream, registry).await;
        });
    }
}
