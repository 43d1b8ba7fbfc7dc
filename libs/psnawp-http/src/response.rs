use crate::error::HttpError;
use bytes::Bytes;
use http::{HeaderMap, Response, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;

/// Bytes of a non-2xx body kept in `HttpError::HttpStatus::body_preview`.
pub const ERROR_BODY_PREVIEW_LIMIT: usize = 8 * 1024;

/// Decompressed response body, boxed.
pub type ResponseBody =
    http_body_util::combinators::BoxBody<Bytes, Box<dyn std::error::Error + Send + Sync>>;

/// A received response. Every body read stops at `max_body_size`.
#[derive(Debug)]
pub struct HttpResponse {
    pub(crate) inner: Response<ResponseBody>,
    pub(crate) max_body_size: usize,
}

impl HttpResponse {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// Reject non-2xx without reading the body; the preview stays empty.
    ///
    /// # Errors
    /// `HttpError::HttpStatus` for any non-2xx status.
    pub fn error_for_status(self) -> Result<Self, HttpError> {
        if self.inner.status().is_success() {
            return Ok(self);
        }

        Err(HttpError::HttpStatus {
            status: self.inner.status(),
            body_preview: String::new(),
            content_type: content_type(self.inner.headers()),
        })
    }

    /// Raw body, whatever the status.
    ///
    /// # Errors
    /// `HttpError::BodyTooLarge` past the limit, `HttpError::Transport` if the
    /// connection drops mid-body.
    pub async fn bytes(self) -> Result<Bytes, HttpError> {
        read_body_limited(self.inner, self.max_body_size).await
    }

    /// Decode a 2xx JSON body.
    ///
    /// # Errors
    /// `HttpError::HttpStatus` (with a body preview) for non-2xx,
    /// `HttpError::BodyTooLarge`, or `HttpError::Json`.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, HttpError> {
        let body = checked_body(self.inner, self.max_body_size).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Like [`json()`](Self::json), but a blank 2xx body (`204 No Content`,
    /// an empty `200`) is `Value::Null`.
    ///
    /// # Errors
    /// Same as [`json()`](Self::json).
    pub async fn json_or_null(self) -> Result<serde_json::Value, HttpError> {
        let body = checked_body(self.inner, self.max_body_size).await?;
        if body.trim_ascii().is_empty() {
            Ok(serde_json::Value::Null)
        } else {
            Ok(serde_json::from_slice(&body)?)
        }
    }
}

fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

async fn checked_body(
    response: Response<ResponseBody>,
    max_body_size: usize,
) -> Result<Bytes, HttpError> {
    let status = response.status();

    if !status.is_success() {
        let content_type = content_type(response.headers());

        // an oversized body still reports the status
        let limit = max_body_size.min(ERROR_BODY_PREVIEW_LIMIT);
        let body_preview = match read_body_limited(response, limit).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(HttpError::BodyTooLarge { .. }) => "<body too large for preview>".to_owned(),
            Err(e) => return Err(e),
        };
        tracing::debug!(%status, "non-success response");

        return Err(HttpError::HttpStatus {
            status,
            body_preview,
            content_type,
        });
    }

    read_body_limited(response, max_body_size).await
}

async fn read_body_limited(
    response: Response<ResponseBody>,
    limit: usize,
) -> Result<Bytes, HttpError> {
    let mut body = response.into_body();
    let mut buf = Vec::new();
    while let Some(frame) = body.frame().await {
        let Ok(chunk) = frame.map_err(HttpError::Transport)?.into_data() else {
            continue;
        };
        let actual = buf.len() + chunk.len();
        if actual > limit {
            return Err(HttpError::BodyTooLarge { limit, actual });
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(Bytes::from(buf))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use http_body_util::Full;

    fn response(status: u16, body: &'static str, max_body_size: usize) -> HttpResponse {
        let body: ResponseBody = Full::new(Bytes::from_static(body.as_bytes()))
            .map_err(|never| match never {})
            .boxed();
        let inner = Response::builder()
            .status(status)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        HttpResponse {
            inner,
            max_body_size,
        }
    }

    #[tokio::test]
    async fn test_json_success() {
        let value: serde_json::Value = response(200, r#"{"onlineId":"VaultTec_Trading"}"#, 1024)
            .json()
            .await
            .unwrap();
        assert_eq!(value["onlineId"], "VaultTec_Trading");
    }

    #[tokio::test]
    async fn test_json_or_null_on_empty_body() {
        let value = response(204, "", 1024).json_or_null().await.unwrap();
        assert!(value.is_null());
    }

    #[tokio::test]
    async fn test_non_success_carries_preview() {
        let err = response(404, r#"{"error":{"message":"Not Found"}}"#, 1024)
            .json::<serde_json::Value>()
            .await
            .unwrap_err();
        match err {
            HttpError::HttpStatus {
                status,
                body_preview,
                content_type,
            } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert!(body_preview.contains("Not Found"));
                assert_eq!(content_type.as_deref(), Some("application/json"));
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_body_limit_enforced() {
        let err = response(200, "0123456789", 4).bytes().await.unwrap_err();
        assert!(matches!(
            err,
            HttpError::BodyTooLarge {
                limit: 4,
                actual: 10
            }
        ));
    }

    #[tokio::test]
    async fn test_error_for_status_skips_body() {
        let err = response(500, "boom", 1024).error_for_status().unwrap_err();
        match err {
            HttpError::HttpStatus { body_preview, .. } => assert!(body_preview.is_empty()),
            other => panic!("expected HttpStatus, got {other:?}"),
        }
        assert!(response(200, "", 1024).error_for_status().is_ok());
    }
}
