use std::sync::atomic::{AtomicI32, Ordering};

use super::error::{CenterError, Result};

/// Protocol version stamped on every strict binary message header.
pub const VERSION_1: u32 = 0x8001_0000;

/// Mask selecting the version bits of a message header word.
pub const VERSION_MASK: u32 = 0xffff_0000;

pub type SeqId = i32;

static SEQ_ID_COUNTER: AtomicI32 = AtomicI32::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Call,
    Reply,
    Exception,
    Oneway,
}

impl MessageType {
    pub fn as_u8(self) -> u8 {
        match self {
            MessageType::Call => 1,
            MessageType::Reply => 2,
            MessageType::Exception => 3,
            MessageType::Oneway => 4,
        }
    }

    pub fn from_u8(code: u8) -> Result<Self> {
        match code {
            1 => Ok(MessageType::Call),
            2 => Ok(MessageType::Reply),
            3 => Ok(MessageType::Exception),
            4 => Ok(MessageType::Oneway),
            other => Err(CenterError::Protocol(format!("unknown message type {}", other))),
        }
    }
}

/// Envelope preceding every message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    pub name: String,
    pub message_type: MessageType,
    pub seq_id: SeqId,
}

impl MessageHeader {
    pub fn call(name: impl Into<String>) -> Self {
        MessageHeader {
            name: name.into(),
            message_type: MessageType::Call,
            seq_id: next_seq_id(),
        }
    }

    pub fn reply_to(&self, message_type: MessageType) -> Self {
        MessageHeader {
            name: self.name.clone(),
            message_type,
            seq_id: self.seq_id,
        }
    }
}

/// Process-wide sequence ids. Positive and wrapping back to 1 before overflow.
pub fn next_seq_id() -> SeqId {
    SEQ_ID_COUNTER
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |id| {
            Some(if id == SeqId::MAX { 1 } else { id + 1 })
        })
        .unwrap_or(1)
}
