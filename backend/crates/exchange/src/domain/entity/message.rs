//! Direct Message Entity

use chrono::{DateTime, Utc};

use crate::domain::value_object::{MessageId, MessageText, UserId};
use crate::error::{ExchangeError, ExchangeResult};

#[derive(Debug, Clone)]
pub struct Message {
    pub message_id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub text: MessageText,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

impl Message {
    pub fn new(
        sender_id: UserId,
        receiver_id: UserId,
        text: MessageText,
        now: DateTime<Utc>,
    ) -> ExchangeResult<Self> {
        if sender_id == receiver_id {
            return Err(ExchangeError::SelfMessage);
        }

        Ok(Self {
            message_id: MessageId::new(),
            sender_id,
            receiver_id,
            text,
            created_at: now,
            read: false,
        })
    }

    /// Only the receiver may acknowledge a message
    pub fn ensure_receiver(&self, reader: &UserId) -> ExchangeResult<()> {
        if &self.receiver_id != reader {
            return Err(ExchangeError::NotReceiver);
        }
        Ok(())
    }
}

/// Message joined with participant names
#[derive(Debug, Clone)]
pub struct MessageView {
    pub message: Message,
    pub sender_name: String,
    pub receiver_name: String,
}
