//! Per-connection transport: a read task that owns the connection's local
//! `equipid` state and a write task that serializes outgoing frames.
//!
//! Splitting the socket into owned read/write halves and funnelling all
//! writes through one `mpsc` channel gives atomic, ordered writes per
//! connection for free — no explicit write-lock needed, since the channel
//! itself is the serialization point broadcasts and directed forwards from
//! other workers write through.

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::protocol::{encode, EquipmentId, FrameDecoder, Message};
use crate::registry::{ConnHandle, Registry};
use crate::server::router;

const READ_BUF_SIZE: usize = 4096;

/// Drives one client connection end to end: spawns the write task, runs the
/// receive loop until EOF/error/a router-requested termination, then tears
/// down any equipment registration left behind.
pub async fn handle_connection(stream: TcpStream, registry: Arc<Registry>) {
    let peer = stream.peer_addr().ok();
    let (mut read_half, write_half) = stream.into_split();
    let (tx, rx) = mpsc::unbounded_channel::<Vec<u8>>();
    let write_task = tokio::spawn(write_loop(write_half, rx));
    let conn = ConnHandle::new(tx.clone());

    let mut decoder = FrameDecoder::new();
    let mut buf = [0u8; READ_BUF_SIZE];
    let mut equipid: Option<EquipmentId> = None;

    loop {
        let n = match read_half.read(&mut buf).await {
            Ok(0) => {
                log::info!("connection {:?} closed by peer", peer);
                break;
            }
            Ok(n) => n,
            Err(e) => {
                log::warn!("connection {:?} read error: {e}", peer);
                break;
            }
        };

        let messages = match decoder.feed(&buf[..n]) {
            Ok(messages) => messages,
            Err(e) => {
                log::info!("connection {:?} sent an invalid frame: {e}", peer);
                break;
            }
        };

        let mut terminate = false;
        for message in messages {
            if matches!(
                router::dispatch(message, &mut equipid, &conn, &registry).await,
                router::Outcome::Terminate
            ) {
                terminate = true;
                break;
            }
        }
        if terminate {
            break;
        }
    }

    if let Some(id) = equipid {
        if registry.release(id) {
            registry.broadcast(&encode(&Message::ReqRem { origin: id }));
            log::info!("equipment {id} removed (connection {:?} dropped)", peer);
        }
    }

    // Every Sender clone must go before the write task's channel will close:
    // `conn` (and any clone the registry was holding, already dropped by
    // `release` above) is the other live one.
    drop(tx);
    drop(conn);
    let _ = write_task.await;
}

async fn write_loop(mut writer: OwnedWriteHalf, mut rx: UnboundedReceiver<Vec<u8>>) {
    while let Some(bytes) = rx.recv().await {
        if let Err(e) = writer.write_all(&bytes).await {
            log::warn!("write error, closing connection: {e}");
            break;
        }
    }
}
