use crate::errors::AppError;
use crate::models::{preview_of, Conversation, MessagingAccount};
use crate::store::{Store, StoreError};
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Resolved {
    pub account: MessagingAccount,
    pub conversation: Conversation,
    pub created: bool,
}

/// Maps inbound traffic onto tenant accounts and conversations.
pub struct ConversationResolver<'a> {
    store: &'a dyn Store,
    preview_length: usize,
}

impl<'a> ConversationResolver<'a> {
    pub fn new(store: &'a dyn Store, preview_length: usize) -> Self {
        Self {
            store,
            preview_length,
        }
    }

    pub async fn account(&self, phone_number_id: &str) -> Result<MessagingAccount, AppError> {
        self.store
            .fetch_account_by_phone_number_id(phone_number_id)
            .await?
            .ok_or(AppError::NotFound("messaging account"))
    }

    /// Finds or opens the conversation of (account, contact phone) and moves its preview
    /// to the triggering message.
    #[tracing::instrument(name = "Resolve conversation", skip(self, contact_name, text))]
    pub async fn resolve(
        &self,
        phone_number_id: &str,
        contact_phone: &str,
        contact_name: Option<&str>,
        text: &str,
        at: DateTime<Utc>,
    ) -> Result<Resolved, AppError> {
        let account = self.account(phone_number_id).await?;
        let preview = preview_of(text, self.preview_length);

        if let Some(mut conversation) = self.store.find_conversation(account.id, contact_phone).await? {
            self.store
                .touch_conversation(conversation.id, &preview, at)
                .await?;
            self.fill_contact_name(&mut conversation, contact_name).await?;
            return Ok(Resolved {
                account,
                conversation,
                created: false,
            });
        }

        let fresh = Conversation::open(account.id, contact_phone, contact_name, &preview, at);
        match self.store.insert_conversation(fresh).await {
            Ok(conversation) => {
                tracing::info!(conversation_id = %conversation.id, "Opened conversation");
                Ok(Resolved {
                    account,
                    conversation,
                    created: true,
                })
            }
            Err(StoreError::Duplicate(_)) => {
                // a concurrent delivery created it first
                let mut conversation = self
                    .store
                    .find_conversation(account.id, contact_phone)
                    .await?
                    .ok_or(AppError::NotFound("conversation"))?;
                self.store
                    .touch_conversation(conversation.id, &preview, at)
                    .await?;
                self.fill_contact_name(&mut conversation, contact_name).await?;
                Ok(Resolved {
                    account,
                    conversation,
                    created: false,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Late profile names fill a conversation opened without one. A stored name is kept.
    async fn fill_contact_name(
        &self,
        conversation: &mut Conversation,
        contact_name: Option<&str>,
    ) -> Result<(), AppError> {
        if conversation.contact_name.is_some() {
            return Ok(());
        }
        let Some(name) = contact_name.map(str::trim).filter(|name| !name.is_empty()) else {
            return Ok(());
        };
        if self.store.fill_contact_name(conversation.id, name).await? {
            conversation.contact_name = Some(name.to_string());
        }
        Ok(())
    }

    /// Records activity on a conversation. Older timestamps leave the preview alone.
    pub async fn record_activity(
        &self,
        conversation_id: Uuid,
        text: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let preview = preview_of(text, self.preview_length);
        Ok(self
            .store
            .touch_conversation(conversation_id, &preview, at)
            .await?)
    }
}
