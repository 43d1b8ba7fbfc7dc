//! The authenticated caller ("me").

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::instrument;

use crate::endpoints::Endpoints;
use crate::error::PsnError;
use crate::models::{AccountIdentity, BlockList, ProfileLookup};
use crate::transport::Transport;

/// Upper bound the friends endpoint accepts for `limit`.
pub const MAX_FRIENDS_LIMIT: u32 = 1000;

const IDENTITY_FIELDS: &str = "accountId,onlineId";

/// Handle on the account that owns the access token.
///
/// Cheap to clone: the transport and endpoints are shared.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    endpoints: Arc<Endpoints>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl Client {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, endpoints: Arc<Endpoints>) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Account id and online id of the caller.
    ///
    /// # Errors
    /// Transport failures are returned as [`PsnError::Http`].
    #[instrument(skip_all)]
    pub async fn identity(&self) -> Result<AccountIdentity, PsnError> {
        let url = self.endpoints.legacy_profile("me")?;
        let value = self
            .transport
            .get(url, &[("fields", IDENTITY_FIELDS.to_owned())])
            .await?;
        let lookup: ProfileLookup = decode(value, "caller identity")?;
        Ok(lookup.profile)
    }

    /// Account ids the caller has blocked. Fetched fresh on every call.
    ///
    /// # Errors
    /// Transport failures are returned as [`PsnError::Http`].
    #[instrument(skip_all)]
    pub async fn blocked_list(&self) -> Result<Vec<String>, PsnError> {
        let value = self.transport.get(self.endpoints.blocks()?, &[]).await?;
        let blocks: BlockList = decode(value, "block list")?;
        Ok(blocks.block_list)
    }

    /// The caller's friends, up to `limit` (clamped to [`MAX_FRIENDS_LIMIT`]).
    ///
    /// # Errors
    /// Transport failures are returned as [`PsnError::Http`].
    #[instrument(skip_all, fields(limit = tracing::field::Empty))]
    pub async fn friends(&self, limit: u32) -> Result<Value, PsnError> {
        let limit = limit.min(MAX_FRIENDS_LIMIT);
        tracing::Span::current().record("limit", limit);
        let value = self
            .transport
            .get(self.endpoints.friends()?, &[("limit", limit.to_string())])
            .await?;
        Ok(value)
    }

    /// Friends of the caller currently available to play.
    ///
    /// # Errors
    /// Transport failures are returned as [`PsnError::Http`].
    #[instrument(skip_all)]
    pub async fn available_to_play(&self) -> Result<Value, PsnError> {
        let value = self
            .transport
            .get(self.endpoints.available_to_play()?, &[])
            .await?;
        Ok(value)
    }
}

/// Deserialize a transport response into one of the inspected records.
pub fn decode<T: DeserializeOwned>(
    value: Value,
    context: &'static str,
) -> Result<T, PsnError> {
    serde_json::from_value(value).map_err(PsnError::decode(context))
}
