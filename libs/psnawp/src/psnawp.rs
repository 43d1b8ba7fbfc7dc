//! Entry point wiring configuration, transport and API handles.

use std::sync::Arc;

use psnawp_http::HttpClientBuilder;

use crate::client::Client;
use crate::config::PsnConfig;
use crate::endpoints::Endpoints;
use crate::error::PsnError;
use crate::group::Group;
use crate::transport::{HttpTransport, Transport};
use crate::user::{User, UserLookup};

/// Entry point: owns the transport and hands out [`Client`], [`User`] and
/// [`Group`] values that share it.
#[derive(Debug, Clone)]
pub struct Psnawp {
    client: Client,
}

impl Psnawp {
    /// Build the HTTP stack from `config`.
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    /// [`PsnError::Config`] if no access token is configured or the HTTP
    /// client cannot be built; [`PsnError::InvalidEndpoint`] for a bad base
    /// URL.
    pub fn new(config: PsnConfig) -> Result<Self, PsnError> {
        config.endpoints.validate()?;
        let token = config
            .token()
            .cloned()
            .ok_or_else(|| PsnError::Config("access_token is not set".to_owned()))?;

        let http = HttpClientBuilder::with_config(config.http.to_client_config())
            .bearer_token(token)
            .build()
            .map_err(|e| PsnError::Config(format!("failed to build HTTP client: {e}")))?;

        tracing::debug!(
            timeout = %humantime::format_duration(config.http.request_timeout),
            "PSN client ready"
        );
        Ok(Self::with_transport(
            Arc::new(HttpTransport::new(http)),
            config.endpoints,
        ))
    }

    /// Use a caller-supplied transport.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>, endpoints: Endpoints) -> Self {
        Self {
            client: Client::new(transport, Arc::new(endpoints)),
        }
    }

    /// The caller.
    #[must_use]
    pub fn me(&self) -> &Client {
        &self.client
    }

    /// Resolve another account.
    ///
    /// # Errors
    /// See [`User::resolve`].
    pub async fn user(&self, lookup: UserLookup) -> Result<User, PsnError> {
        User::resolve(&self.client, lookup).await
    }

    /// # Errors
    /// See [`User::resolve`].
    pub async fn user_by_online_id(
        &self,
        online_id: impl Into<String>,
    ) -> Result<User, PsnError> {
        User::from_online_id(&self.client, online_id).await
    }

    /// # Errors
    /// See [`User::resolve`].
    pub async fn user_by_account_id(
        &self,
        account_id: impl Into<String>,
    ) -> Result<User, PsnError> {
        User::from_account_id(&self.client, account_id).await
    }

    /// Bind to an existing group.
    ///
    /// # Errors
    /// [`PsnError::InvalidArgument`] if `group_id` is empty.
    pub fn group_by_id(&self, group_id: &str) -> Result<Group, PsnError> {
        Group::from_id(&self.client, group_id)
    }

    /// Create a group with the caller and `users`.
    ///
    /// # Errors
    /// See [`Group::create`].
    pub async fn group_with(&self, users: &[&User]) -> Result<Group, PsnError> {
        let account_ids: Vec<&str> = users.iter().copied().map(User::account_id).collect();
        Group::create(&self.client, &account_ids).await
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::testing::{Method, MockTransport};
    use psnawp_http::AccessToken;
    use serde_json::json;

    fn facade(mock: &MockTransport) -> Psnawp {
        Psnawp::with_transport(Arc::new(mock.clone()), Endpoints::default())
    }

    #[tokio::test]
    async fn new_requires_access_token() {
        let err = Psnawp::new(PsnConfig::default()).unwrap_err();
        assert!(matches!(err, PsnError::Config(_)));

        let blank = PsnConfig {
            access_token: Some(AccessToken::new("")),
            ..PsnConfig::default()
        };
        assert!(matches!(Psnawp::new(blank), Err(PsnError::Config(_))));
    }

    #[tokio::test]
    async fn new_with_token_builds() {
        let config = PsnConfig {
            access_token: Some(AccessToken::new("token")),
            ..PsnConfig::default()
        };
        let psnawp = Psnawp::new(config).unwrap();
        assert_eq!(psnawp.me().endpoints(), &Endpoints::default());
    }

    #[tokio::test]
    async fn group_with_users_invites_their_ids() {
        let mock = MockTransport::new();
        mock.reply_json(
            Method::Get,
            "/api/userProfile/v1/internal/users/2/profiles",
            json!({"onlineId": "two"}),
        );
        mock.reply_json(
            Method::Get,
            "/api/userProfile/v1/internal/users/1/profiles",
            json!({"onlineId": "one"}),
        );
        mock.reply_json(
            Method::Post,
            "/api/gamingLoungeGroups/v1/members/me/groups",
            json!({"groupId": "g-9"}),
        );
        let psnawp = facade(&mock);

        let two = psnawp.user_by_account_id(String::from("2")).await.unwrap();
        let one = psnawp
            .user(UserLookup::AccountId("1".to_owned()))
            .await
            .unwrap();
        let group = psnawp.group_with(&[&two, &one]).await.unwrap();

        assert_eq!(group.group_id(), "g-9");
        assert_eq!(group.account_ids(), ["1".to_owned(), "2".to_owned()]);
    }

    #[test]
    fn group_by_id_makes_no_request() {
        let mock = MockTransport::new();
        let group = facade(&mock).group_by_id("g-1").unwrap();
        assert_eq!(group.group_id(), "g-1");
        assert!(group.account_ids().is_empty());
        assert!(mock.calls().is_empty());
    }
}
