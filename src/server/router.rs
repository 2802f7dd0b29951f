//! The broker: turns one decoded [`Message`] plus this connection's local
//! `equipid` state into registry mutations and outgoing frames.
//!
//! Admission, removal, and directory reads all go through [`Registry`],
//! which is the single point of atomicity; this module only decides *what*
//! to do with each message kind.

use crate::protocol::{encode, EquipmentId, ErrorCode, Message, OkCode, TwoDigit};
use crate::registry::{ConnHandle, Registry};

/// What the connection worker should do after a message has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Terminate,
}

/// Dispatches one message on behalf of the connection identified (so far)
/// by `equipid`. May update `equipid` in place (on admission or removal).
pub async fn dispatch(
    msg: Message,
    equipid: &mut Option<EquipmentId>,
    conn: &ConnHandle,
    registry: &Registry,
) -> Outcome {
    match msg {
        Message::ReqAdd => handle_req_add(equipid, conn, registry),
        Message::ReqRem { origin } => handle_req_rem(origin, equipid, conn, registry),
        Message::ReqInf { origin, dest } => {
            forward(Message::ReqInf { origin, dest }, origin, dest, conn, registry);
            Outcome::Continue
        }
        Message::ResInf { origin, dest, measurement } => {
            forward(
                Message::ResInf { origin, dest, measurement },
                origin,
                dest,
                conn,
                registry,
            );
            Outcome::Continue
        }
        Message::ResAdd { .. } | Message::ResList { .. } | Message::Error { .. } | Message::Ok { .. } => {
            log::warn!("protocol fault: unexpected {} from client, closing connection", msg.name());
            Outcome::Terminate
        }
    }
}

fn handle_req_add(equipid: &mut Option<EquipmentId>, conn: &ConnHandle, registry: &Registry) -> Outcome {
    match registry.admit(conn.clone()) {
        Ok(new_id) => {
            *equipid = Some(new_id);
            registry.broadcast(&encode(&Message::ResAdd { assigned: new_id }));
            let others: Vec<_> = registry
                .snapshot()
                .into_iter()
                .filter(|&id| id != new_id)
                .collect();
            conn.send(encode(&Message::ResList { ids: others }));
            println!("Equipment {new_id} added");
            log::info!("equipment {new_id} added");
            Outcome::Continue
        }
        Err(_) => {
            // Registry is full. The count is informational (see DESIGN.md);
            // it equals `max` at the moment admission is refused.
            let count = TwoDigit::new(registry.max()).expect("max fits in two digits");
            conn.send(encode(&Message::Error { dest: Some(count), code: ErrorCode::LimitExceeded }));
            Outcome::Terminate
        }
    }
}

fn handle_req_rem(
    origin: EquipmentId,
    equipid: &mut Option<EquipmentId>,
    conn: &ConnHandle,
    registry: &Registry,
) -> Outcome {
    // Conservative policy (unspecified upstream): a worker may only remove
    // the id it was itself admitted under.
    if *equipid != Some(origin) {
        conn.send(encode(&Message::Error { dest: None, code: ErrorCode::EquipmentNotFound }));
        return Outcome::Continue;
    }

    if !registry.release(origin) {
        conn.send(encode(&Message::Error { dest: None, code: ErrorCode::EquipmentNotFound }));
        return Outcome::Continue;
    }

    conn.send(encode(&Message::Ok { dest: origin, code: OkCode::SuccessfulRemoval }));
    registry.broadcast_except(origin, &encode(&Message::ReqRem { origin }));
    *equipid = None;
    log::info!("equipment {origin} removed");
    Outcome::Terminate
}

/// Validates and forwards a directed message, replying with the
/// appropriate `ERROR` on the requesting connection if validation fails.
fn forward(msg: Message, origin: EquipmentId, dest: EquipmentId, conn: &ConnHandle, registry: &Registry) {
    if origin == dest || !registry.contains(origin) {
        println!("Equipment {origin} not found");
        conn.send(encode(&Message::Error {
            dest: Some(TwoDigit::new(origin.get()).expect("two-digit value")),
            code: ErrorCode::SourceNotFound,
        }));
        return;
    }
    if !registry.contains(dest) {
        println!("Equipment {dest} not found");
        conn.send(encode(&Message::Error {
            dest: Some(TwoDigit::new(dest.get()).expect("two-digit value")),
            code: ErrorCode::TargetNotFound,
        }));
        return;
    }
    registry.send_to(dest, encode(&msg));
}
