//! Wire framing: newline-delimited ASCII frames, field layout per the
//! `<msgid><originid|-><destid|-><payload|->` grammar, built incrementally
//! from arbitrary TCP reads the same way a length-prefixed binary codec
//! would — just with a delimiter byte instead of a length header.

use crate::error::FrameError;
use crate::protocol::ids::EquipmentId;
use crate::protocol::message::{Message, RawFrame};

/// Hard cap on a single frame, including the trailing delimiter.
pub const MAX_FRAME_SIZE: usize = 1024;

const DELIMITER: u8 = b'\n';
const SENTINEL: u8 = b'-';

/// Encodes a message to its newline-terminated wire form.
pub fn encode(msg: &Message) -> Vec<u8> {
    encode_raw(&msg.to_raw())
}

fn encode_raw(raw: &RawFrame) -> Vec<u8> {
    let mut out = Vec::with_capacity(16);
    out.extend_from_slice(raw.msgid.as_bytes());
    match raw.origin {
        Some(id) => out.extend_from_slice(id.to_string().as_bytes()),
        None => out.push(SENTINEL),
    }
    match raw.dest {
        Some(id) => out.extend_from_slice(id.to_string().as_bytes()),
        None => out.push(SENTINEL),
    }
    match &raw.payload {
        Some(p) => out.extend_from_slice(p.as_bytes()),
        None => out.push(SENTINEL),
    }
    out.push(DELIMITER);
    out
}

/// Decodes a single frame's bytes (delimiter already stripped) into a
/// [`RawFrame`], then validates it into a typed [`Message`].
fn decode_one(frame: &[u8]) -> Result<Message, FrameError> {
    if frame.is_empty() {
        return Err(FrameError::Empty);
    }
    let text = std::str::from_utf8(frame)
        .map_err(|_| FrameError::MalformedId("non-utf8 frame".to_string()))?;

    if text.len() < 2 {
        return Err(FrameError::MalformedId(text.to_string()));
    }
    let (msgid, rest) = text.split_at(2);

    let (origin, rest) = take_id_field(rest)?;
    let (dest, rest) = take_id_field(rest)?;
    let payload = if rest == "-" { None } else { Some(rest.to_string()) };

    Message::from_raw(RawFrame {
        msgid: msgid.to_string(),
        origin,
        dest,
        payload,
    })
}

/// Consumes a leading `originid`/`destid` field: either the sentinel `-`
/// (one byte, absent) or exactly two ASCII digits (present).
fn take_id_field(rest: &str) -> Result<(Option<EquipmentId>, &str), FrameError> {
    let mut chars = rest.chars();
    match chars.next() {
        None => Err(FrameError::MalformedId(String::new())),
        Some('-') => Ok((None, chars.as_str())),
        Some(_) => {
            if rest.len() < 2 {
                return Err(FrameError::MalformedId(rest.to_string()));
            }
            let (field, remainder) = rest.split_at(2);
            Ok((Some(EquipmentId::parse(field)?), remainder))
        }
    }
}

/// Accumulates bytes across reads and extracts zero or more complete
/// frames, buffering any trailing partial frame for the next call.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<Message>, FrameError> {
        self.buf.extend_from_slice(bytes);
        let mut out = Vec::new();

        loop {
            if self.buf.len() > MAX_FRAME_SIZE {
                return Err(FrameError::TooLarge { max: MAX_FRAME_SIZE });
            }

            let Some(pos) = self.buf.iter().position(|&b| b == DELIMITER) else {
                if self.buf.len() >= MAX_FRAME_SIZE {
                    return Err(FrameError::TooLarge { max: MAX_FRAME_SIZE });
                }
                break;
            };

            if pos >= MAX_FRAME_SIZE {
                return Err(FrameError::TooLarge { max: MAX_FRAME_SIZE });
            }

            let frame_bytes: Vec<u8> = self.buf.drain(..=pos).collect();
            let frame = &frame_bytes[..frame_bytes.len() - 1];
            out.push(decode_one(frame)?);
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::codes::{ErrorCode, OkCode};

    fn id(n: u8) -> EquipmentId {
        EquipmentId::new(n).unwrap()
    }

    #[test]
    fn req_add_encodes_all_absent() {
        let bytes = encode(&Message::ReqAdd);
        assert_eq!(bytes.last(), Some(&b'\n'));
        assert!(bytes.starts_with(b"01"));
    }

    #[test]
    fn decode_single_frame() {
        let mut dec = FrameDecoder::new();
        let encoded = encode(&Message::ReqRem { origin: id(1) });
        let msgs = dec.feed(&encoded).unwrap();
        assert_eq!(msgs, vec![Message::ReqRem { origin: id(1) }]);
    }

    #[test]
    fn multiple_frames_in_single_feed() {
        let mut dec = FrameDecoder::new();
        let mut bytes = encode(&Message::ReqAdd);
        bytes.extend(encode(&Message::ResAdd { assigned: id(2) }));
        let msgs = dec.feed(&bytes).unwrap();
        assert_eq!(msgs, vec![
            Message::ReqAdd,
            Message::ResAdd { assigned: id(2) },
        ]);
    }

    #[test]
    fn partial_frame_reassembly() {
        let mut dec = FrameDecoder::new();
        let encoded = encode(&Message::ReqInf { origin: id(1), dest: id(2) });
        let (first, second) = encoded.split_at(3);
        assert!(dec.feed(first).unwrap().is_empty());
        let msgs = dec.feed(second).unwrap();
        assert_eq!(msgs, vec![Message::ReqInf { origin: id(1), dest: id(2) }]);
    }

    #[test]
    fn byte_at_a_time_reassembly() {
        let mut dec = FrameDecoder::new();
        let encoded = encode(&Message::Ok { dest: id(3), code: OkCode::SuccessfulRemoval });
        let mut collected = Vec::new();
        for b in &encoded {
            collected.extend(dec.feed(&[*b]).unwrap());
        }
        assert_eq!(collected, vec![Message::Ok { dest: id(3), code: OkCode::SuccessfulRemoval }]);
    }

    #[test]
    fn oversized_frame_rejected() {
        let mut dec = FrameDecoder::new();
        let mut bytes = vec![b'0', b'1'];
        bytes.extend(std::iter::repeat(b'a').take(MAX_FRAME_SIZE + 10));
        let err = dec.feed(&bytes).unwrap_err();
        assert!(matches!(err, FrameError::TooLarge { .. }));
    }

    #[test]
    fn unknown_message_id_rejected() {
        let mut dec = FrameDecoder::new();
        let err = dec.feed(b"99----\n").unwrap_err();
        assert!(matches!(err, FrameError::UnknownMessageId(_)));
    }

    #[test]
    fn empty_frame_rejected() {
        let mut dec = FrameDecoder::new();
        let err = dec.feed(b"\n").unwrap_err();
        assert!(matches!(err, FrameError::MalformedId(_) | FrameError::Empty));
    }

    #[test]
    fn res_list_roundtrip_through_wire() {
        let mut dec = FrameDecoder::new();
        let msg = Message::ResList { ids: vec![id(1), id(2)] };
        let encoded = encode(&msg);
        assert_eq!(dec.feed(&encoded).unwrap(), vec![msg]);
    }

    #[test]
    fn error_with_dest_roundtrip_through_wire() {
        let mut dec = FrameDecoder::new();
        let msg = Message::Error { dest: None, code: ErrorCode::LimitExceeded };
        let encoded = encode(&msg);
        assert_eq!(dec.feed(&encoded).unwrap(), vec![msg]);
    }
}
