//! Request transport used by every API call.

use async_trait::async_trait;
use psnawp_http::{HttpClient, HttpError};
use serde_json::Value;
use tracing::debug;
use url::Url;

/// Issues authenticated requests and returns the parsed JSON body.
///
/// Non-2xx responses come back as [`HttpError::HttpStatus`]; an empty
/// success body parses as [`Value::Null`].
///
/// # Errors
/// Every method returns the transport's [`HttpError`] unchanged.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` with `params` appended to its query string.
    async fn get(&self, url: Url, params: &[(&str, String)]) -> Result<Value, HttpError>;

    /// POST `body` as JSON to `url`.
    async fn post(&self, url: Url, body: &Value) -> Result<Value, HttpError>;

    /// DELETE `url`.
    async fn delete(&self, url: Url) -> Result<Value, HttpError>;
}

/// [`Transport`] over the layered [`HttpClient`].
///
/// `HttpClient` is `Clone + Send + Sync`, so no external locking is needed.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: HttpClient,
}

impl HttpTransport {
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, mut url: Url, params: &[(&str, String)]) -> Result<Value, HttpError> {
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        }
        debug!(%url, "GET");
        self.client.get(url.as_str()).send().await?.json_or_null().await
    }

    async fn post(&self, url: Url, body: &Value) -> Result<Value, HttpError> {
        debug!(%url, "POST");
        self.client
            .post(url.as_str())
            .json(body)?
            .send()
            .await?
            .json_or_null()
            .await
    }

    async fn delete(&self, url: Url) -> Result<Value, HttpError> {
        debug!(%url, "DELETE");
        self.client
            .delete(url.as_str())
            .send()
            .await?
            .json_or_null()
            .await
    }
}
