//! Base URIs of the PSN web API and the path templates built on them.
//!
//! [`Endpoints`] is plain immutable configuration: it is handed to a
//! [`Client`](crate::Client) at construction and never mutated afterwards.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::PsnError;

/// Host serving the mobile (current) API.
pub const MOBILE_HOST: &str = "https://m.np.playstation.com";
/// Host serving the legacy community profile API.
pub const LEGACY_HOST: &str = "https://us-prof.np.community.playstation.com";

const PROFILE_PATH: &str = "/api/userProfile/v1/internal/users";
const LEGACY_PROFILE_PATH: &str = "/userProfile/v1/users";
const TROPHY_PATH: &str = "/api/trophy";
const GROUP_PATH: &str = "/api/gamingLoungeGroups/v1";

/// Base URIs for every API family the client talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// User profile API (`.../userProfile/v1/internal/users`).
    pub profile_base: String,
    /// Legacy profile API (`.../userProfile/v1/users`), keyed by online id.
    pub legacy_profile_base: String,
    /// Trophy API root (`.../api/trophy`).
    pub trophy_base: String,
    /// Messaging groups API (`.../gamingLoungeGroups/v1`).
    pub group_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            profile_base: format!("{MOBILE_HOST}{PROFILE_PATH}"),
            legacy_profile_base: format!("{LEGACY_HOST}{LEGACY_PROFILE_PATH}"),
            trophy_base: format!("{MOBILE_HOST}{TROPHY_PATH}"),
            group_base: format!("{MOBILE_HOST}{GROUP_PATH}"),
        }
    }
}

impl Endpoints {
    /// Every API family served from a single origin with the production
    /// paths, e.g. a local mock server.
    #[must_use]
    pub fn rooted_at(origin: &str) -> Self {
        let origin = origin.trim_end_matches('/');
        Self {
            profile_base: format!("{origin}{PROFILE_PATH}"),
            legacy_profile_base: format!("{origin}{LEGACY_PROFILE_PATH}"),
            trophy_base: format!("{origin}{TROPHY_PATH}"),
            group_base: format!("{origin}{GROUP_PATH}"),
        }
    }

    /// Check that every base parses as an absolute URL that accepts paths.
    ///
    /// # Errors
    /// Returns [`PsnError::InvalidEndpoint`] for the first bad base.
    pub fn validate(&self) -> Result<(), PsnError> {
        for base in [
            &self.profile_base,
            &self.legacy_profile_base,
            &self.trophy_base,
            &self.group_base,
        ] {
            join(base, &[])?;
        }
        Ok(())
    }

    pub(crate) fn profile(&self, account_id: &str) -> Result<Url, PsnError> {
        join(&self.profile_base, &[account_id, "profiles"])
    }

    pub(crate) fn basic_presences(&self, account_id: &str) -> Result<Url, PsnError> {
        join(&self.profile_base, &[account_id, "basicPresences"])
    }

    pub(crate) fn friendship_summary(&self, account_id: &str) -> Result<Url, PsnError> {
        join(&self.profile_base, &["me", "friends", account_id, "summary"])
    }

    pub(crate) fn blocks(&self) -> Result<Url, PsnError> {
        join(&self.profile_base, &["me", "blocks"])
    }

    pub(crate) fn friends(&self) -> Result<Url, PsnError> {
        join(&self.profile_base, &["me", "friends"])
    }

    pub(crate) fn available_to_play(&self) -> Result<Url, PsnError> {
        join(
            &self.profile_base,
            &["me", "friends", "subscribing", "availableToPlay"],
        )
    }

    pub(crate) fn legacy_profile(&self, online_id: &str) -> Result<Url, PsnError> {
        join(&self.legacy_profile_base, &[online_id, "profile2"])
    }

    pub(crate) fn trophy_titles(&self, account_id: &str) -> Result<Url, PsnError> {
        join(
            &self.trophy_base,
            &["v1", "users", account_id, "trophyTitles"],
        )
    }

    pub(crate) fn groups(&self) -> Result<Url, PsnError> {
        join(&self.group_base, &["members", "me", "groups"])
    }

    pub(crate) fn group_messages(&self, group_id: &str) -> Result<Url, PsnError> {
        join(
            &self.group_base,
            &[
                "members", "me", "groups", group_id, "threads", group_id, "messages",
            ],
        )
    }

    pub(crate) fn group_membership(&self, group_id: &str) -> Result<Url, PsnError> {
        join(&self.group_base, &["groups", group_id, "members", "me"])
    }
}

/// Append path segments to `base`, percent-encoding each segment.
fn join(base: &str, segments: &[&str]) -> Result<Url, PsnError> {
    let mut url = Url::parse(base).map_err(|e| PsnError::InvalidEndpoint {
        url: base.to_owned(),
        reason: e.to_string(),
    })?;
    url.path_segments_mut()
        .map_err(|()| PsnError::InvalidEndpoint {
            url: base.to_owned(),
            reason: "URL cannot be a base".to_owned(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
