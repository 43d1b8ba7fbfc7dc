use crate::client::{BufferedService, map_buffer_error, try_acquire_buffer_slot};
use crate::config::TransportSecurity;
use crate::error::{HttpError, InvalidUriKind};
use crate::response::HttpResponse;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Method, Request, Uri};
use http_body_util::Full;
use serde::Serialize;
use tower::Service;

/// A single pending request.
///
/// Created by [`HttpClient::get`](crate::HttpClient::get),
/// [`HttpClient::post`](crate::HttpClient::post) and
/// [`HttpClient::delete`](crate::HttpClient::delete). The URL arrives with its
/// query string already composed.
#[must_use = "RequestBuilder does nothing until .send() is called"]
pub struct RequestBuilder {
    service: BufferedService,
    max_body_size: usize,
    security: TransportSecurity,
    method: Method,
    url: String,
    json: Option<Bytes>,
}

impl RequestBuilder {
    pub(crate) fn new(
        service: BufferedService,
        max_body_size: usize,
        security: TransportSecurity,
        method: Method,
        url: String,
    ) -> Self {
        Self {
            service,
            max_body_size,
            security,
            method,
            url,
            json: None,
        }
    }

    /// Attach `body` serialized as JSON.
    ///
    /// # Errors
    /// `HttpError::Json` if `body` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, HttpError> {
        self.json = Some(Bytes::from(serde_json::to_vec(body)?));
        Ok(self)
    }

    /// Send the request.
    ///
    /// Any HTTP status is returned as `Ok`; [`HttpResponse::json`] and
    /// [`HttpResponse::error_for_status`] reject non-2xx.
    ///
    /// # Errors
    /// The URL is malformed or its scheme is not allowed, the request buffer
    /// is full (`Overloaded`), the request times out, or the connection fails.
    pub async fn send(mut self) -> Result<HttpResponse, HttpError> {
        let uri = parse_target(&self.url, self.security)?;

        let mut request = Request::builder().method(self.method).uri(uri);
        if self.json.is_some() {
            request = request.header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        let request = request.body(Full::new(self.json.unwrap_or_default()))?;

        try_acquire_buffer_slot(&mut self.service).await?;
        let inner = self.service.call(request).await.map_err(map_buffer_error)?;

        Ok(HttpResponse {
            inner,
            max_body_size: self.max_body_size,
        })
    }
}

/// Parse an absolute URL and check its scheme against `security`.
fn parse_target(url: &str, security: TransportSecurity) -> Result<Uri, HttpError> {
    let invalid = |kind, reason: String| HttpError::InvalidUri {
        url: url.to_owned(),
        kind,
        reason,
    };

    let uri: Uri = url
        .parse()
        .map_err(|e: http::uri::InvalidUri| invalid(InvalidUriKind::ParseError, e.to_string()))?;

    if uri.host().is_none() {
        return Err(invalid(InvalidUriKind::MissingAuthority, "no host".to_owned()));
    }
    let Some(scheme) = uri.scheme_str() else {
        return Err(invalid(InvalidUriKind::MissingScheme, "no scheme".to_owned()));
    };

    let allowed = match scheme {
        "https" => true,
        "http" => security == TransportSecurity::AllowInsecureHttp,
        _ => false,
    };
    if allowed {
        Ok(uri)
    } else {
        Err(HttpError::InvalidScheme {
            scheme: scheme.to_owned(),
            reason: match security {
                TransportSecurity::TlsOnly => "only https is allowed".to_owned(),
                TransportSecurity::AllowInsecureHttp => "only http and https are allowed".to_owned(),
            },
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    const PROFILE_URL: &str = "https://m.np.playstation.com/api/userProfile/v1/internal/users/me/profiles";

    #[test]
    fn https_always_accepted() {
        for security in [TransportSecurity::TlsOnly, TransportSecurity::AllowInsecureHttp] {
            let uri = parse_target(PROFILE_URL, security).unwrap();
            assert_eq!(uri.host(), Some("m.np.playstation.com"));
        }
    }

    #[test]
    fn plain_http_needs_opt_in() {
        let url = "http://127.0.0.1:8080/api/userProfile/v1/internal/users/me/profiles";
        assert!(matches!(
            parse_target(url, TransportSecurity::TlsOnly),
            Err(HttpError::InvalidScheme { ref scheme, .. }) if scheme == "http"
        ));
        assert!(parse_target(url, TransportSecurity::AllowInsecureHttp).is_ok());
    }

    #[test]
    fn other_schemes_rejected() {
        assert!(matches!(
            parse_target("ftp://m.np.playstation.com/x", TransportSecurity::AllowInsecureHttp),
            Err(HttpError::InvalidScheme { .. })
        ));
    }

    #[test]
    fn host_without_scheme_rejected() {
        let err = parse_target("m.np.playstation.com:443", TransportSecurity::TlsOnly).unwrap_err();
        assert!(matches!(
            err,
            HttpError::InvalidUri {
                kind: InvalidUriKind::MissingScheme,
                ..
            }
        ));
    }

    #[test]
    fn malformed_url_rejected() {
        let err = parse_target("https://exa mple.com", TransportSecurity::TlsOnly).unwrap_err();
        assert!(matches!(
            err,
            HttpError::InvalidUri {
                kind: InvalidUriKind::ParseError,
                ..
            }
        ));
    }
}
