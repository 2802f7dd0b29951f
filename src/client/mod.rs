//! Client session: connect, register, then cooperatively multiplex the
//! socket and stdin commands until the user closes the connection or quits.
//!
//! The source material drove this multiplexing with a ~10ms blocking
//! readiness wait across two synchronous file descriptors. `tokio::select!`
//! over the socket-read future and the stdin-line future is the direct
//! async equivalent — it wakes on whichever source is ready first with no
//! added latency, so neither starves.

pub mod commands;

use std::collections::{BTreeSet, VecDeque};

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::config::ClientArgs;
use crate::protocol::{encode, EquipmentId, FrameDecoder, Message};
use commands::Command;

const READ_BUF_SIZE: usize = 4096;

/// A `TcpStream` paired with its own incremental frame decoder and a queue
/// of already-decoded messages awaiting consumption.
struct FrameStream {
    stream: TcpStream,
    decoder: FrameDecoder,
    pending: VecDeque<Message>,
}

impl FrameStream {
    fn new(stream: TcpStream) -> Self {
        Self { stream, decoder: FrameDecoder::new(), pending: VecDeque::new() }
    }

    async fn send(&mut self, msg: &Message) -> Result<()> {
        self.stream.write_all(&encode(msg)).await.context("write failed")
    }

    async fn next_message(&mut self) -> Result<Message> {
        loop {
            if let Some(msg) = self.pending.pop_front() {
                return Ok(msg);
            }
            let mut buf = [0u8; READ_BUF_SIZE];
            let n = self.stream.read(&mut buf).await.context("read failed")?;
            if n == 0 {
                bail!("server closed the connection");
            }
            let msgs = self
                .decoder
                .feed(&buf[..n])
                .map_err(|e| anyhow::anyhow!("invalid frame from server: {e}"))?;
            self.pending.extend(msgs);
        }
    }
}

enum ShouldExit {
    Yes,
    No,
}

pub async fn run(args: ClientArgs) -> Result<()> {
    let stream = TcpStream::connect((args.server_addr, args.port))
        .await
        .with_context(|| format!("failed to connect to {}:{}", args.server_addr, args.port))?;
    let mut fs = FrameStream::new(stream);

    let self_id = register(&mut fs).await?;
    println!("New ID: {self_id}");

    let mut directory: BTreeSet<EquipmentId> = match fs.next_message().await? {
        Message::ResList { ids } => ids.into_iter().collect(),
        other => bail!("expected RES_LIST after registration, got {}", other.name()),
    };

    let mut stdin_lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            msg = fs.next_message() => {
                let msg = msg?;
                if matches!(handle_incoming(msg, self_id, &mut directory, &mut fs).await?, ShouldExit::Yes) {
                    break;
                }
            }
            line = stdin_lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match Command::parse(&line) {
                    Ok(cmd) => {
                        if matches!(handle_command(cmd, self_id, &directory, &mut fs).await?, ShouldExit::Yes) {
                            break;
                        }
                    }
                    Err(e) => println!("{e}"),
                }
            }
        }
    }

    Ok(())
}

async fn register(fs: &mut FrameStream) -> Result<EquipmentId> {
    fs.send(&Message::ReqAdd).await?;
    match fs.next_message().await? {
        Message::ResAdd { assigned } => Ok(assigned),
        Message::Error { code, .. } => bail!("registration refused: {}", code.description()),
        other => bail!("unexpected message during registration: {}", other.name()),
    }
}

async fn handle_incoming(
    msg: Message,
    self_id: EquipmentId,
    directory: &mut BTreeSet<EquipmentId>,
    fs: &mut FrameStream,
) -> Result<ShouldExit> {
    match msg {
        Message::ResAdd { assigned } => {
            directory.insert(assigned);
            println!("Equipment {assigned} added");
        }
        Message::ReqRem { origin } => {
            directory.remove(&origin);
            println!("Equipment {origin} removed");
        }
        Message::ResList { ids } => {
            *directory = ids.into_iter().collect();
        }
        Message::ReqInf { origin, dest } if dest == self_id => {
            let measurement = format!("{:.2}", rand::random::<f64>() * 10.0);
            fs.send(&Message::ResInf { origin: self_id, dest: origin, measurement }).await?;
            println!("requested information");
        }
        Message::ReqInf { .. } => {
            log::warn!("received REQ_INF not addressed to this connection");
        }
        Message::ResInf { origin, measurement, .. } => {
            println!("Value from {origin}: {measurement}");
        }
        Message::Error { code, .. } => println!("{}", code.description()),
        Message::Ok { code, .. } => println!("{}", code.description()),
        Message::ReqAdd => log::warn!("unexpected REQ_ADD from server"),
    }
    Ok(ShouldExit::No)
}

async fn handle_command(
    cmd: Command,
    self_id: EquipmentId,
    directory: &BTreeSet<EquipmentId>,
    fs: &mut FrameStream,
) -> Result<ShouldExit> {
    match cmd {
        Command::ListEquipment => {
            let listing: Vec<_> = directory.iter().map(ToString::to_string).collect();
            println!("{}", listing.join(" "));
            Ok(ShouldExit::No)
        }
        Command::RequestInformation(dest) => {
            fs.send(&Message::ReqInf { origin: self_id, dest }).await?;
            Ok(ShouldExit::No)
        }
        Command::CloseConnection => {
            fs.send(&Message::ReqRem { origin: self_id }).await?;
            loop {
                match fs.next_message().await? {
                    Message::Ok { code, .. } => {
                        println!("{}", code.description());
                        break;
                    }
                    Message::Error { code, .. } => {
                        println!("{}", code.description());
                        break;
                    }
                    other => {
                        let mut directory = directory.clone();
                        handle_incoming(other, self_id, &mut directory, fs).await?;
                    }
                }
            }
            Ok(ShouldExit::Yes)
        }
        Command::Quit => Ok(ShouldExit::Yes),
    }
}
