//! Direct Message Use Cases

use std::sync::Arc;

use chrono::Utc;

use crate::domain::entity::{Message, MessageView};
use crate::domain::repository::{MemberDirectory, MessageRepository};
use crate::domain::value_object::{MessageId, MessageText, UserId};
use crate::error::{ExchangeError, ExchangeResult};

/// Send message input
pub struct SendMessageInput {
    pub receiver_id: UserId,
    pub text: String,
}

pub struct SendMessageUseCase<R>
where
    R: MessageRepository + MemberDirectory,
{
    repo: Arc<R>,
}

impl<R> SendMessageUseCase<R>
where
    R: MessageRepository + MemberDirectory,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, sender: &UserId, input: SendMessageInput) -> ExchangeResult<Message> {
        let text = MessageText::new(&input.text)?;
        let message = Message::new(*sender, input.receiver_id, text, Utc::now())?;

        if self.repo.find_member(&input.receiver_id).await?.is_none() {
            return Err(ExchangeError::UserNotFound);
        }

        self.repo.insert_message(&message).await?;

        tracing::info!(
            message_id = %message.message_id,
            sender_id = %message.sender_id,
            receiver_id = %message.receiver_id,
            "Message sent"
        );

        Ok(message)
    }
}

/// Inbox and conversation views
pub struct InboxUseCase<R>
where
    R: MessageRepository + MemberDirectory,
{
    repo: Arc<R>,
}

impl<R> InboxUseCase<R>
where
    R: MessageRepository + MemberDirectory,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Received messages and how many are unread
    pub async fn inbox(&self, user_id: &UserId) -> ExchangeResult<(Vec<MessageView>, i64)> {
        let messages = self.repo.inbox(user_id).await?;
        let unread = self.repo.unread_count(user_id).await?;
        Ok((messages, unread))
    }

    /// Thread with one other user
    pub async fn conversation(
        &self,
        user_id: &UserId,
        other_id: &UserId,
    ) -> ExchangeResult<Vec<MessageView>> {
        if self.repo.find_member(other_id).await?.is_none() {
            return Err(ExchangeError::UserNotFound);
        }
        self.repo.conversation(user_id, other_id).await
    }
}

pub struct MarkReadUseCase<R>
where
    R: MessageRepository,
{
    repo: Arc<R>,
}

impl<R> MarkReadUseCase<R>
where
    R: MessageRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, reader: &UserId, message_id: &MessageId) -> ExchangeResult<()> {
        let message = self
            .repo
            .find_message(message_id)
            .await?
            .ok_or(ExchangeError::MessageNotFound)?;

        message.ensure_receiver(reader)?;

        if !message.read {
            self.repo.mark_message_read(message_id).await?;
        }

        Ok(())
    }
}
