use crate::config::{HttpClientConfig, TransportSecurity};
use crate::error::HttpError;
use crate::layers::DefaultHeaderLayer;
use crate::response::ResponseBody;
use crate::secret::AccessToken;
use bytes::Bytes;
use http::Response;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use std::sync::Arc;
use std::time::Duration;
use tower::buffer::Buffer;
use tower::timeout::TimeoutLayer;
use tower::{ServiceBuilder, ServiceExt};
use tower_http::decompression::DecompressionLayer;

/// Assembles an [`HttpClient`](crate::HttpClient) from [`HttpClientConfig`]
/// and an optional access token.
pub struct HttpClientBuilder {
    config: HttpClientConfig,
    bearer_token: Option<AccessToken>,
}

impl HttpClientBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(HttpClientConfig::default())
    }

    #[must_use]
    pub fn with_config(config: HttpClientConfig) -> Self {
        Self {
            config,
            bearer_token: None,
        }
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    /// Accept `http://` URLs. Debug builds only, unless the
    /// `allow-insecure-http` feature is on.
    #[must_use]
    #[cfg(any(debug_assertions, feature = "allow-insecure-http"))]
    pub fn allow_insecure_http(mut self) -> Self {
        self.config.transport = TransportSecurity::AllowInsecureHttp;
        self
    }

    /// Send `Authorization: Bearer <token>` on every request.
    #[must_use]
    pub fn bearer_token(mut self, token: AccessToken) -> Self {
        self.bearer_token = Some(token);
        self
    }

    /// Zero is raised to 1.
    #[must_use]
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.buffer_capacity = capacity.max(1);
        self
    }

    /// Build the client. Must run inside a tokio runtime, since the request
    /// buffer spawns its worker here.
    ///
    /// # Errors
    /// `HttpError::Tls` if no crypto provider can be set up;
    /// `HttpError::InvalidHeaderValue` for a bad user agent or token.
    pub fn build(self) -> Result<crate::HttpClient, HttpError> {
        let HttpClientConfig {
            request_timeout: timeout,
            max_body_size,
            user_agent,
            transport,
            buffer_capacity,
            pool_idle_timeout,
            pool_max_idle_per_host,
        } = self.config;

        if transport == TransportSecurity::AllowInsecureHttp {
            tracing::warn!(
                target: "psnawp_http::security",
                "insecure HTTP enabled; traffic to http:// URLs is not encrypted"
            );
        }

        let mut pool = Client::builder(TokioExecutor::new());
        // pool_idle_timeout has no effect without a timer
        pool.pool_timer(TokioTimer::new())
            .pool_max_idle_per_host(pool_max_idle_per_host);
        if let Some(idle) = pool_idle_timeout {
            pool.pool_idle_timeout(idle);
        }
        let hyper_client = pool.build::<_, Full<Bytes>>(build_https_connector(transport)?);

        let auth = self
            .bearer_token
            .as_ref()
            .map(DefaultHeaderLayer::bearer)
            .transpose()?;

        // Any status is Ok at this level; HttpResponse::json() rejects non-2xx.
        let service = ServiceBuilder::new()
            .map_err(move |e: tower::BoxError| map_tower_error(e, timeout))
            .layer(TimeoutLayer::new(timeout))
            .option_layer(auth)
            .layer(DefaultHeaderLayer::user_agent(&user_agent)?)
            .map_response(box_body)
            .layer(DecompressionLayer::new())
            .service(hyper_client)
            .boxed_clone();

        Ok(crate::HttpClient {
            service: Buffer::new(service, buffer_capacity.max(1)),
            max_body_size,
            transport_security: transport,
        })
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `Elapsed` becomes `Timeout`; an `HttpError` from an inner layer is kept.
fn map_tower_error(err: tower::BoxError, timeout: Duration) -> HttpError {
    if err.is::<tower::timeout::error::Elapsed>() {
        return HttpError::Timeout(timeout);
    }

    match err.downcast::<HttpError>() {
        Ok(http_err) => *http_err,
        Err(other) => HttpError::Transport(other),
    }
}

fn box_body<B>(response: Response<B>) -> Response<ResponseBody>
where
    B: hyper::body::Body<Data = Bytes> + Send + Sync + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    response.map(|body| body.map_err(Into::into).boxed())
}

/// webpki roots, ALPN h2 + http/1.1.
fn build_https_connector(
    transport: TransportSecurity,
) -> Result<HttpsConnector<HttpConnector>, HttpError> {
    let provider = crypto_provider();
    let builder = hyper_rustls::HttpsConnectorBuilder::new()
        .with_provider_and_webpki_roots(provider)
        .map_err(|e| HttpError::Tls(Box::new(e)))?;
    let connector = if transport == TransportSecurity::AllowInsecureHttp {
        builder.https_or_http().enable_all_versions().build()
    } else {
        builder.https_only().enable_all_versions().build()
    };
    Ok(connector)
}

/// The process-wide rustls provider if one is installed, else aws-lc-rs
/// without installing it.
fn crypto_provider() -> Arc<rustls::crypto::CryptoProvider> {
    rustls::crypto::CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()))
}
