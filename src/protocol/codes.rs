use std::fmt;

use crate::error::FrameError;
use crate::protocol::ids::TwoDigit;

/// Codes carried in the payload of an `ERROR` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    EquipmentNotFound,
    SourceNotFound,
    TargetNotFound,
    LimitExceeded,
}

impl ErrorCode {
    pub fn code(self) -> TwoDigit {
        let raw = match self {
            ErrorCode::EquipmentNotFound => 1,
            ErrorCode::SourceNotFound => 2,
            ErrorCode::TargetNotFound => 3,
            ErrorCode::LimitExceeded => 4,
        };
        TwoDigit::new(raw).expect("error codes are in range")
    }

    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::EquipmentNotFound => "Equipment not found",
            ErrorCode::SourceNotFound => "Source equipment not found",
            ErrorCode::TargetNotFound => "Target equipment not found",
            ErrorCode::LimitExceeded => "Equipment limit exceeded",
        }
    }

    pub fn parse(s: &str) -> Result<Self, FrameError> {
        match TwoDigit::parse(s)?.get() {
            1 => Ok(ErrorCode::EquipmentNotFound),
            2 => Ok(ErrorCode::SourceNotFound),
            3 => Ok(ErrorCode::TargetNotFound),
            4 => Ok(ErrorCode::LimitExceeded),
            _ => Err(FrameError::MalformedId(s.to_string())),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Codes carried in the payload of an `OK` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OkCode {
    SuccessfulRemoval,
}

impl OkCode {
    pub fn code(self) -> TwoDigit {
        let raw = match self {
            OkCode::SuccessfulRemoval => 1,
        };
        TwoDigit::new(raw).expect("ok codes are in range")
    }

    pub fn description(self) -> &'static str {
        match self {
            OkCode::SuccessfulRemoval => "Successful removal",
        }
    }

    pub fn parse(s: &str) -> Result<Self, FrameError> {
        match TwoDigit::parse(s)?.get() {
            1 => Ok(OkCode::SuccessfulRemoval),
            _ => Err(FrameError::MalformedId(s.to_string())),
        }
    }
}

impl fmt::Display for OkCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
