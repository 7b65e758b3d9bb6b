use chrono::Utc;
use tracing::debug;

use super::listings::LISTING_NOT_FOUND;
use super::{MarketplaceService, ServiceError};
use crate::marketplace::domain::{ListingId, Message, MessageId, User};
use crate::marketplace::input::MessageInput;
use crate::marketplace::photos::PhotoStorage;
use crate::marketplace::repository::{MarketplaceStore, MessageFilter};
use crate::marketplace::views::MessageView;

const MESSAGE_NOT_FOUND: &str = "Message not found";

impl<S, P> MarketplaceService<S, P>
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    /// Send a message about a listing. The recipient id is not checked against the store.
    pub fn send_message(&self, actor: &User, input: MessageInput) -> Result<Message, ServiceError> {
        let draft = input.validate()?;
        let listing = draft
            .listing_id
            .map(|id| self.store.fetch_listing(&id))
            .transpose()?
            .flatten()
            .ok_or(ServiceError::NotFound(LISTING_NOT_FOUND))?;

        let message = Message {
            id: MessageId::generate(),
            listing_id: listing.id,
            from_id: actor.id,
            to_id: draft.to_id,
            from_name: actor.display_name(),
            content: draft.content,
            read: false,
            timestamp: Utc::now(),
        };

        let message = self.store.insert_message(message)?;
        debug!(message_id = %message.id, listing_id = %listing.id, "message sent");
        Ok(message)
    }

    /// Conversation on a listing, oldest first.
    pub fn listing_messages(&self, listing_id: &str) -> Result<Vec<MessageView>, ServiceError> {
        let Some(listing_id) = ListingId::parse(listing_id) else {
            return Ok(Vec::new());
        };

        let mut messages = self.store.messages(&MessageFilter {
            listing: Some(listing_id),
            ..MessageFilter::default()
        })?;
        messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        self.message_views(messages, false)
    }

    /// Everything the actor sent or received, newest first.
    pub fn my_messages(&self, actor: &User) -> Result<Vec<MessageView>, ServiceError> {
        let mut messages = self.store.messages(&MessageFilter {
            participant: Some(actor.id),
            ..MessageFilter::default()
        })?;
        messages.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        self.message_views(messages, true)
    }

    /// Mark a message read. Only its recipient may do so.
    pub fn mark_message_read(&self, actor: &User, id: &str) -> Result<Message, ServiceError> {
        let message = MessageId::parse(id)
            .map(|id| self.store.fetch_message(&id))
            .transpose()?
            .flatten()
            .ok_or(ServiceError::NotFound(MESSAGE_NOT_FOUND))?;

        if message.to_id != actor.id {
            return Err(ServiceError::Forbidden("Not authorized".to_string()));
        }

        self.store
            .modify_message(&message.id, |message| message.read = true)?
            .ok_or(ServiceError::NotFound(MESSAGE_NOT_FOUND))
    }

    fn message_views(
        &self,
        messages: Vec<Message>,
        with_listing: bool,
    ) -> Result<Vec<MessageView>, ServiceError> {
        messages
            .into_iter()
            .map(|message| {
                let listing = if with_listing {
                    self.listing_title(&message.listing_id)?
                } else {
                    None
                };
                let from = self.party(&message.from_id)?;
                let to = self.party(&message.to_id)?;
                Ok(MessageView {
                    message,
                    listing,
                    from,
                    to,
                })
            })
            .collect()
    }
}
