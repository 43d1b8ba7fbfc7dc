//! Messaging groups.

use std::collections::BTreeSet;

use serde_json::json;
use tracing::{debug, instrument};

use crate::client::{Client, decode};
use crate::error::PsnError;
use crate::models::{Conversation, GroupCreated, SentMessage};

/// Upper bound the messages endpoint accepts for `limit`.
pub const MAX_CONVERSATION_LIMIT: u32 = 200;

const TEXT_MESSAGE_TYPE: u8 = 1;

/// A message thread shared by the caller and a fixed set of accounts.
///
/// The thread id is the group id.
#[derive(Debug, Clone)]
pub struct Group {
    client: Client,
    group_id: String,
    account_ids: Vec<String>,
}

impl Group {
    /// Create a group with the caller and `account_ids`.
    ///
    /// Ids are sorted and deduplicated before they are sent.
    ///
    /// # Errors
    /// [`PsnError::InvalidArgument`] for an empty set or an empty id, before
    /// any request. Transport failures are returned as [`PsnError::Http`].
    #[instrument(skip_all, fields(members = account_ids.len()))]
    pub async fn create<S: AsRef<str>>(
        client: &Client,
        account_ids: &[S],
    ) -> Result<Self, PsnError> {
        if account_ids.is_empty() {
            return Err(PsnError::invalid_argument(
                "account_ids",
                "a group needs at least one member",
            ));
        }
        if account_ids.iter().any(|id| id.as_ref().is_empty()) {
            return Err(PsnError::invalid_argument(
                "account_ids",
                "account ids must contain a value",
            ));
        }

        let account_ids: Vec<String> = account_ids
            .iter()
            .map(|id| id.as_ref().to_owned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let invitees: Vec<_> = account_ids
            .iter()
            .map(|id| json!({ "accountId": id }))
            .collect();

        let url = client.endpoints().groups()?;
        let value = client
            .transport()
            .post(url, &json!({ "invitees": invitees }))
            .await?;
        let created: GroupCreated = decode(value, "group creation")?;
        debug!(group_id = %created.group_id, "group created");

        Ok(Self {
            client: client.clone(),
            group_id: created.group_id,
            account_ids,
        })
    }

    /// Bind to an existing group without a request.
    ///
    /// The member list is unknown and left empty.
    ///
    /// # Errors
    /// [`PsnError::InvalidArgument`] if `group_id` is empty.
    pub fn from_id(client: &Client, group_id: impl Into<String>) -> Result<Self, PsnError> {
        let group_id = group_id.into();
        if group_id.is_empty() {
            return Err(PsnError::invalid_argument(
                "group_id",
                "group id must contain a value",
            ));
        }
        Ok(Self {
            client: client.clone(),
            group_id,
            account_ids: Vec::new(),
        })
    }

    #[must_use]
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Members the group was created with, excluding the caller.
    #[must_use]
    pub fn account_ids(&self) -> &[String] {
        &self.account_ids
    }

    /// Post a text message to the thread.
    ///
    /// # Errors
    /// [`PsnError::InvalidArgument`] for empty text, before any request.
    /// Transport failures are returned as [`PsnError::Http`].
    #[instrument(skip_all, fields(group_id = %self.group_id))]
    pub async fn send_message(&self, text: &str) -> Result<SentMessage, PsnError> {
        if text.is_empty() {
            return Err(PsnError::invalid_argument(
                "message",
                "message must contain a value",
            ));
        }
        let url = self.client.endpoints().group_messages(&self.group_id)?;
        let value = self
            .client
            .transport()
            .post(
                url,
                &json!({ "messageType": TEXT_MESSAGE_TYPE, "body": text }),
            )
            .await?;
        if value.is_null() {
            return Ok(SentMessage::default());
        }
        decode(value, "sent message")
    }

    /// Most recent messages, newest first; `limit` is clamped to
    /// [`MAX_CONVERSATION_LIMIT`].
    ///
    /// # Errors
    /// Transport failures are returned as [`PsnError::Http`].
    #[instrument(skip_all, fields(group_id = %self.group_id, limit = limit.min(MAX_CONVERSATION_LIMIT)))]
    pub async fn conversation(&self, limit: u32) -> Result<Conversation, PsnError> {
        let limit = limit.min(MAX_CONVERSATION_LIMIT);
        let url = self.client.endpoints().group_messages(&self.group_id)?;
        let value = self
            .client
            .transport()
            .get(url, &[("limit", limit.to_string())])
            .await?;
        decode(value, "conversation")
    }

    /// Remove the caller from the group.
    ///
    /// # Errors
    /// Transport failures are returned as [`PsnError::Http`].
    #[instrument(skip_all, fields(group_id = %self.group_id))]
    pub async fn leave(&self) -> Result<(), PsnError> {
        let url = self.client.endpoints().group_membership(&self.group_id)?;
        self.client.transport().delete(url).await?;
        Ok(())
    }
}
