use crate::error::FrameError;
use crate::protocol::codes::{ErrorCode, OkCode};
use crate::protocol::ids::{EquipmentId, TwoDigit};

/// Two-digit wire tags for each message kind, kept together the way the
/// original frame-type table is laid out.
pub mod tags {
    pub const REQ_ADD: &str = "01";
    pub const REQ_REM: &str = "02";
    pub const RES_ADD: &str = "03";
    pub const RES_LIST: &str = "04";
    pub const REQ_INF: &str = "05";
    pub const RES_INF: &str = "06";
    pub const ERROR: &str = "07";
    pub const OK: &str = "08";
}

/// The generic shape every frame decodes into before being interpreted as a
/// typed [`Message`]. Keeping this separate from `Message` mirrors the
/// wire grammar directly: `<msgid><originid|-><destid|-><payload|->`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub msgid: String,
    pub origin: Option<EquipmentId>,
    pub dest: Option<EquipmentId>,
    pub payload: Option<String>,
}

/// A decoded, typed application message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    ReqAdd,
    ReqRem { origin: EquipmentId },
    ResAdd { assigned: EquipmentId },
    ResList { ids: Vec<EquipmentId> },
    ReqInf { origin: EquipmentId, dest: EquipmentId },
    ResInf { origin: EquipmentId, dest: EquipmentId, measurement: String },
    Error { dest: Option<TwoDigit>, code: ErrorCode },
    Ok { dest: EquipmentId, code: OkCode },
}

impl Message {
    pub fn name(&self) -> &'static str {
        match self {
            Message::ReqAdd => "REQ_ADD",
            Message::ReqRem { .. } => "REQ_REM",
            Message::ResAdd { .. } => "RES_ADD",
            Message::ResList { .. } => "RES_LIST",
            Message::ReqInf { .. } => "REQ_INF",
            Message::ResInf { .. } => "RES_INF",
            Message::Error { .. } => "ERROR",
            Message::Ok { .. } => "OK",
        }
    }

    pub fn to_raw(&self) -> RawFrame {
        match self {
            Message::ReqAdd => RawFrame {
                msgid: tags::REQ_ADD.into(),
                origin: None,
                dest: None,
                payload: None,
            },
            Message::ReqRem { origin } => RawFrame {
                msgid: tags::REQ_REM.into(),
                origin: Some(*origin),
                dest: None,
                payload: None,
            },
            Message::ResAdd { assigned } => RawFrame {
                msgid: tags::RES_ADD.into(),
                origin: None,
                dest: None,
                payload: Some(assigned.to_string()),
            },
            Message::ResList { ids } => RawFrame {
                msgid: tags::RES_LIST.into(),
                origin: None,
                dest: None,
                payload: Some(
                    ids.iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(" "),
                ),
            },
            Message::ReqInf { origin, dest } => RawFrame {
                msgid: tags::REQ_INF.into(),
                origin: Some(*origin),
                dest: Some(*dest),
                payload: None,
            },
            Message::ResInf { origin, dest, measurement } => RawFrame {
                msgid: tags::RES_INF.into(),
                origin: Some(*origin),
                dest: Some(*dest),
                payload: Some(measurement.clone()),
            },
            Message::Error { dest, code } => RawFrame {
                msgid: tags::ERROR.into(),
                origin: None,
                dest: dest.map(|d| EquipmentId::new(d.get()).expect("two-digit value")),
                payload: Some(code.code().to_string()),
            },
            Message::Ok { dest, code } => RawFrame {
                msgid: tags::OK.into(),
                origin: None,
                dest: Some(*dest),
                payload: Some(code.code().to_string()),
            },
        }
    }

    pub fn from_raw(raw: RawFrame) -> Result<Self, FrameError> {
        let msgname = |id: &str| -> &'static str {
            match id {
                tags::REQ_ADD => "REQ_ADD",
                tags::REQ_REM => "REQ_REM",
                tags::RES_ADD => "RES_ADD",
                tags::RES_LIST => "RES_LIST",
                tags::REQ_INF => "REQ_INF",
                tags::RES_INF => "RES_INF",
                tags::ERROR => "ERROR",
                tags::OK => "OK",
                _ => "UNKNOWN",
            }
        };

        match raw.msgid.as_str() {
            tags::REQ_ADD => {
                reject_field(raw.origin.is_some(), "REQ_ADD", "originid")?;
                reject_field(raw.dest.is_some(), "REQ_ADD", "destid")?;
                reject_field(raw.payload.is_some(), "REQ_ADD", "payload")?;
                Ok(Message::ReqAdd)
            }
            tags::REQ_REM => {
                let origin = require_field(raw.origin, "REQ_REM", "originid")?;
                reject_field(raw.dest.is_some(), "REQ_REM", "destid")?;
                reject_field(raw.payload.is_some(), "REQ_REM", "payload")?;
                Ok(Message::ReqRem { origin })
            }
            tags::RES_ADD => {
                reject_field(raw.origin.is_some(), "RES_ADD", "originid")?;
                reject_field(raw.dest.is_some(), "RES_ADD", "destid")?;
                let payload = require_payload(raw.payload, "RES_ADD")?;
                let assigned = EquipmentId::parse(&payload)?;
                Ok(Message::ResAdd { assigned })
            }
            tags::RES_LIST => {
                reject_field(raw.origin.is_some(), "RES_LIST", "originid")?;
                reject_field(raw.dest.is_some(), "RES_LIST", "destid")?;
                let payload = require_payload(raw.payload, "RES_LIST")?;
                let ids = if payload.is_empty() {
                    Vec::new()
                } else {
                    payload
                        .split(' ')
                        .map(EquipmentId::parse)
                        .collect::<Result<Vec<_>, _>>()?
                };
                Ok(Message::ResList { ids })
            }
            tags::REQ_INF => {
                let origin = require_field(raw.origin, "REQ_INF", "originid")?;
                let dest = require_field(raw.dest, "REQ_INF", "destid")?;
                reject_field(raw.payload.is_some(), "REQ_INF", "payload")?;
                Ok(Message::ReqInf { origin, dest })
            }
            tags::RES_INF => {
                let origin = require_field(raw.origin, "RES_INF", "originid")?;
                let dest = require_field(raw.dest, "RES_INF", "destid")?;
                let measurement = require_payload(raw.payload, "RES_INF")?;
                Ok(Message::ResInf { origin, dest, measurement })
            }
            tags::ERROR => {
                reject_field(raw.origin.is_some(), "ERROR", "originid")?;
                let payload = require_payload(raw.payload, "ERROR")?;
                let code = ErrorCode::parse(&payload)?;
                let dest = raw.dest.map(|d| TwoDigit::new(d.get()).expect("two-digit value"));
                Ok(Message::Error { dest, code })
            }
            tags::OK => {
                reject_field(raw.origin.is_some(), "OK", "originid")?;
                let dest = require_field(raw.dest, "OK", "destid")?;
                let payload = require_payload(raw.payload, "OK")?;
                let code = OkCode::parse(&payload)?;
                Ok(Message::Ok { dest, code })
            }
            other => Err(FrameError::UnknownMessageId(format!(
                "{other} ({})",
                msgname(other)
            ))),
        }
    }
}

fn require_field(
    field: Option<EquipmentId>,
    msgname: &'static str,
    name: &'static str,
) -> Result<EquipmentId, FrameError> {
    field.ok_or(FrameError::MissingField { msgname, field: name })
}

fn require_payload(payload: Option<String>, msgname: &'static str) -> Result<String, FrameError> {
    payload.ok_or(FrameError::MissingField { msgname, field: "payload" })
}

fn reject_field(present: bool, msgname: &'static str, name: &'static str) -> Result<(), FrameError> {
    if present {
        Err(FrameError::UnexpectedField { msgname, field: name })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(msg: Message) {
        let raw = msg.to_raw();
        let decoded = Message::from_raw(raw).expect("decode of our own encoding must succeed");
        assert_eq!(decoded, msg);
    }

    #[test]
    fn req_add_roundtrips() {
        roundtrip(Message::ReqAdd);
    }

    #[test]
    fn req_rem_roundtrips() {
        roundtrip(Message::ReqRem { origin: EquipmentId::new(1).unwrap() });
    }

    #[test]
    fn res_add_roundtrips() {
        roundtrip(Message::ResAdd { assigned: EquipmentId::new(7).unwrap() });
    }

    #[test]
    fn res_list_roundtrips_empty_and_nonempty() {
        roundtrip(Message::ResList { ids: vec![] });
        roundtrip(Message::ResList {
            ids: vec![EquipmentId::new(1).unwrap(), EquipmentId::new(2).unwrap()],
        });
    }

    #[test]
    fn req_inf_roundtrips() {
        roundtrip(Message::ReqInf {
            origin: EquipmentId::new(1).unwrap(),
            dest: EquipmentId::new(2).unwrap(),
        });
    }

    #[test]
    fn res_inf_roundtrips() {
        roundtrip(Message::ResInf {
            origin: EquipmentId::new(2).unwrap(),
            dest: EquipmentId::new(1).unwrap(),
            measurement: "7.35".into(),
        });
    }

    #[test]
    fn error_roundtrips_with_and_without_dest() {
        roundtrip(Message::Error { dest: None, code: ErrorCode::EquipmentNotFound });
        roundtrip(Message::Error {
            dest: Some(TwoDigit::new(3).unwrap()),
            code: ErrorCode::TargetNotFound,
        });
    }

    #[test]
    fn ok_roundtrips() {
        roundtrip(Message::Ok {
            dest: EquipmentId::new(1).unwrap(),
            code: OkCode::SuccessfulRemoval,
        });
    }

    #[test]
    fn req_add_rejects_unexpected_fields() {
        let raw = RawFrame {
            msgid: tags::REQ_ADD.into(),
            origin: Some(EquipmentId::new(1).unwrap()),
            dest: None,
            payload: None,
        };
        assert!(Message::from_raw(raw).is_err());
    }

    #[test]
    fn req_rem_requires_origin() {
        let raw = RawFrame {
            msgid: tags::REQ_REM.into(),
            origin: None,
            dest: None,
            payload: None,
        };
        assert!(Message::from_raw(raw).is_err());
    }

    #[test]
    fn unknown_msgid_rejected() {
        let raw = RawFrame {
            msgid: "99".into(),
            origin: None,
            dest: None,
            payload: None,
        };
        assert!(Message::from_raw(raw).is_err());
    }
}
