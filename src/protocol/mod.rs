//! The wire protocol: ids, error/ok codes, the typed message set, and the
//! frame codec that turns a byte stream into a sequence of messages.

mod codes;
mod frame;
mod ids;
mod message;

pub use codes::{ErrorCode, OkCode};
pub use frame::{encode, FrameDecoder, MAX_FRAME_SIZE};
pub use ids::{EquipmentId, TwoDigit};
pub use message::{tags, Message, RawFrame};
