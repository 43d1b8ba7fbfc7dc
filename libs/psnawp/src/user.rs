//! A PSN account other than the caller, resolved by handle or account id.

use std::fmt;

use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

use crate::client::{Client, decode};
use crate::error::PsnError;
use crate::group::Group;
use crate::models::{Conversation, ProfileLookup, ProfileSummary, SentMessage};

/// Upper bound the trophy titles endpoint accepts for `limit`.
pub const MAX_TROPHY_TITLES_LIMIT: u32 = 800;
/// `limit` used by [`User::all_trophy_titles`].
pub const DEFAULT_TROPHY_TITLES_LIMIT: u32 = 100;
/// `count` used by [`User::latest_message`].
pub const DEFAULT_CONVERSATION_COUNT: u32 = 1;

const LOOKUP_FIELDS: &str = "accountId,onlineId,currentOnlineId";

/// Fields requested from the legacy profile endpoint. Undocumented upstream;
/// sent exactly as is.
pub const LEGACY_PROFILE_FIELDS: &str = "npId,onlineId,accountId,avatarUrls,plus,aboutMe,languagesUsed,trophySummary(@default,level,progress,earnedTrophies),isOfficiallyVerified,personalDetail(@default,profilePictureUrls),personalDetailSharing,personalDetailSharingRequestMessageFlag,primaryOnlineStatus,presences(@default,@titleInfo,platform,lastOnlineDate,hasBroadcastData),requestMessageFlag,blocking,friendRelation,following,consoleAvailability";

/// How a [`User`] is identified at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    /// The human-readable handle.
    OnlineId(String),
    /// The stable account id.
    AccountId(String),
}

impl UserLookup {
    /// Build a lookup from two optional keys, exactly one of which must be
    /// present.
    ///
    /// # Errors
    /// [`PsnError::InvalidArgument`] when both or neither are given.
    pub fn from_parts(online_id: Option<&str>, account_id: Option<&str>) -> Result<Self, PsnError> {
        match (online_id, account_id) {
            (Some(online_id), None) => Ok(Self::OnlineId(online_id.to_owned())),
            (None, Some(account_id)) => Ok(Self::AccountId(account_id.to_owned())),
            (None, None) => Err(PsnError::invalid_argument(
                "online_id",
                "either online_id or account_id must be given",
            )),
            (Some(_), Some(_)) => Err(PsnError::invalid_argument(
                "online_id",
                "only one of online_id and account_id may be given",
            )),
        }
    }
}

/// A resolved account: both identifiers are always populated.
///
/// Messaging creates a [`Group`] with this account on first use and reuses it
/// afterwards.
pub struct User {
    client: Client,
    online_id: String,
    account_id: String,
    group: OnceCell<Group>,
}

impl User {
    /// Resolve `lookup` into a full identity with one request.
    ///
    /// # Errors
    /// [`PsnError::InvalidArgument`] for an empty key, before any request.
    /// An unknown account surfaces as the transport's 404
    /// (see [`PsnError::is_not_found`]).
    #[instrument(skip_all)]
    pub async fn resolve(client: &Client, lookup: UserLookup) -> Result<Self, PsnError> {
        match lookup {
            UserLookup::OnlineId(online_id) => Self::from_online_id(client, online_id).await,
            UserLookup::AccountId(account_id) => Self::from_account_id(client, account_id).await,
        }
    }

    /// Resolve a handle to its account id.
    ///
    /// The stored online id is the canonical one the server reports.
    ///
    /// # Errors
    /// See [`User::resolve`].
    #[instrument(skip_all, fields(online_id = tracing::field::Empty))]
    pub async fn from_online_id(
        client: &Client,
        online_id: impl Into<String>,
    ) -> Result<Self, PsnError> {
        let online_id = online_id.into();
        tracing::Span::current().record("online_id", online_id.as_str());
        if online_id.is_empty() {
            return Err(PsnError::invalid_argument(
                "online_id",
                "online_id must contain a value",
            ));
        }
        let url = client.endpoints().legacy_profile(&online_id)?;
        let value = client
            .transport()
            .get(url, &[("fields", LOOKUP_FIELDS.to_owned())])
            .await?;
        let lookup: ProfileLookup = decode(value, "online id lookup")?;
        debug!(account_id = %lookup.profile.account_id, "online id resolved");
        Ok(Self::bound_to(
            client,
            lookup.profile.online_id,
            lookup.profile.account_id,
        ))
    }

    /// Resolve an account id to its current handle.
    ///
    /// # Errors
    /// See [`User::resolve`].
    #[instrument(skip_all, fields(account_id = tracing::field::Empty))]
    pub async fn from_account_id(
        client: &Client,
        account_id: impl Into<String>,
    ) -> Result<Self, PsnError> {
        let account_id = account_id.into();
        tracing::Span::current().record("account_id", account_id.as_str());
        if account_id.is_empty() {
            return Err(PsnError::invalid_argument(
                "account_id",
                "account_id must contain a value",
            ));
        }
        let url = client.endpoints().profile(&account_id)?;
        let value = client.transport().get(url, &[]).await?;
        let profile: ProfileSummary = decode(value, "profile")?;
        debug!(online_id = %profile.online_id, "account id resolved");
        Ok(Self::bound_to(client, profile.online_id, account_id))
    }

    fn bound_to(client: &Client, online_id: String, account_id: String) -> Self {
        Self {
            client: client.clone(),
            online_id,
            account_id,
            group: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn online_id(&self) -> &str {
        &self.online_id
    }

    #[must_use]
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// The messaging group, once one has been created.
    #[must_use]
    pub fn group(&self) -> Option<&Group> {
        self.group.get()
    }

    /// Profile: about me, avatars, languages and so on.
    ///
    /// # Errors
    /// Transport failures are returned as [`PsnError::Http`].
    #[instrument(skip_all, fields(account_id = %self.account_id))]
    pub async fn profile(&self) -> Result<Value, PsnError> {
        let url = self.client.endpoints().profile(&self.account_id)?;
        Ok(self.client.transport().get(url, &[]).await?)
    }

    /// Primary presence: availability, last seen and platform.
    ///
    /// # Errors
    /// Transport failures are returned as [`PsnError::Http`].
    #[instrument(skip_all, fields(account_id = %self.account_id))]
    pub async fn presence(&self) -> Result<Value, PsnError> {
        let url = self.client.endpoints().basic_presences(&self.account_id)?;
        Ok(self
            .client
            .transport()
            .get(url, &[("type", "primary".to_owned())])
            .await?)
    }

    /// Profile from the legacy endpoint; carries PS3/PS4 presence.
    ///
    /// # Errors
    /// Transport failures are returned as [`PsnError::Http`].
    #[instrument(skip_all, fields(online_id = %self.online_id))]
    pub async fn legacy_profile(&self) -> Result<Value, PsnError> {
        let url = self.client.endpoints().legacy_profile(&self.online_id)?;
        Ok(self
            .client
            .transport()
            .get(url, &[("fields", LEGACY_PROFILE_FIELDS.to_owned())])
            .await?)
    }

    /// Friendship status and stats between the caller and this user.
    ///
    /// # Errors
    /// Transport failures are returned as [`PsnError::Http`].
    #[instrument(skip_all, fields(account_id = %self.account_id))]
    pub async fn friendship_summary(&self) -> Result<Value, PsnError> {
        let url = self
            .client
            .endpoints()
            .friendship_summary(&self.account_id)?;
        Ok(self.client.transport().get(url, &[]).await?)
    }

    /// `true` if the caller has blocked this user. Not cached.
    ///
    /// # Errors
    /// Transport failures are returned as [`PsnError::Http`].
    #[instrument(skip_all, fields(account_id = %self.account_id))]
    pub async fn is_blocked(&self) -> Result<bool, PsnError> {
        let blocked = self.client.blocked_list().await?;
        Ok(blocked.iter().any(|id| *id == self.account_id))
    }

    /// The caller's friends currently available to play.
    ///
    /// # Errors
    /// Transport failures are returned as [`PsnError::Http`].
    pub async fn available_to_play(&self) -> Result<Value, PsnError> {
        self.client.available_to_play().await
    }

    /// Trophy titles of every game the user played; `limit` is clamped to
    /// [`MAX_TROPHY_TITLES_LIMIT`].
    ///
    /// # Errors
    /// Transport failures are returned as [`PsnError::Http`].
    #[instrument(skip_all, fields(account_id = %self.account_id, limit = limit.min(MAX_TROPHY_TITLES_LIMIT)))]
    pub async fn trophy_titles(&self, limit: u32) -> Result<Value, PsnError> {
        let limit = limit.min(MAX_TROPHY_TITLES_LIMIT);
        let url = self.client.endpoints().trophy_titles(&self.account_id)?;
        Ok(self
            .client
            .transport()
            .get(url, &[("limit", limit.to_string())])
            .await?)
    }

    /// [`User::trophy_titles`] with [`DEFAULT_TROPHY_TITLES_LIMIT`].
    ///
    /// # Errors
    /// See [`User::trophy_titles`].
    pub async fn all_trophy_titles(&self) -> Result<Value, PsnError> {
        self.trophy_titles(DEFAULT_TROPHY_TITLES_LIMIT).await
    }

    /// Send a private message, creating the group on first use.
    ///
    /// # Errors
    /// [`PsnError::InvalidArgument`] for empty text. Transport failures of
    /// either the group creation or the send are returned as
    /// [`PsnError::Http`].
    #[instrument(skip_all, fields(account_id = %self.account_id))]
    pub async fn send_message(&self, text: &str) -> Result<SentMessage, PsnError> {
        self.bound_group().await?.send_message(text).await
    }

    /// The last `count` messages exchanged with this user, newest first.
    /// `count` is clamped to
    /// [`MAX_CONVERSATION_LIMIT`](crate::group::MAX_CONVERSATION_LIMIT).
    ///
    /// # Errors
    /// Transport failures of either the group creation or the fetch are
    /// returned as [`PsnError::Http`].
    #[instrument(skip_all, fields(account_id = %self.account_id, count = count))]
    pub async fn conversation(&self, count: u32) -> Result<Conversation, PsnError> {
        self.bound_group().await?.conversation(count).await
    }

    /// [`User::conversation`] with [`DEFAULT_CONVERSATION_COUNT`].
    ///
    /// # Errors
    /// See [`User::conversation`].
    pub async fn latest_message(&self) -> Result<Conversation, PsnError> {
        self.conversation(DEFAULT_CONVERSATION_COUNT).await
    }

    /// Leave the messaging group. Does nothing when no group was created.
    ///
    /// The binding is kept; later messages go to the same group.
    ///
    /// # Errors
    /// Transport failures are returned as [`PsnError::Http`].
    #[instrument(skip_all, fields(account_id = %self.account_id))]
    pub async fn leave_group(&self) -> Result<(), PsnError> {
        match self.group.get() {
            Some(group) => group.leave().await,
            None => {
                debug!("no group bound; nothing to leave");
                Ok(())
            }
        }
    }

    /// The group with this user, created at most once.
    async fn bound_group(&self) -> Result<&Group, PsnError> {
        self.group
            .get_or_try_init(|| Group::create(&self.client, std::slice::from_ref(&self.account_id)))
            .await
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Online ID: {} Account ID: {}",
            self.online_id, self.account_id
        )
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("online_id", &self.online_id)
            .field("account_id", &self.account_id)
            .field("group_id", &self.group.get().map(Group::group_id))
            .finish_non_exhaustive()
    }
}
