use crate::error::HttpError;
use crate::secret::AccessToken;
use http::header::{AUTHORIZATION, USER_AGENT};
use http::{HeaderName, HeaderValue, Request, Response};
use std::fmt;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Tower layer that sets one header on every request that does not already
/// carry it.
///
/// Used for `User-Agent` and for `Authorization: Bearer <token>`. Sensitive
/// values are marked so that hyper and `Debug` never print them.
#[derive(Clone)]
pub struct DefaultHeaderLayer {
    name: HeaderName,
    value: HeaderValue,
}

impl DefaultHeaderLayer {
    /// `User-Agent: <user_agent>`.
    ///
    /// # Errors
    /// Returns `HttpError::InvalidHeaderValue` if the string is not a valid
    /// header value.
    pub fn user_agent(user_agent: impl AsRef<str>) -> Result<Self, HttpError> {
        Ok(Self {
            name: USER_AGENT,
            value: HeaderValue::from_str(user_agent.as_ref())?,
        })
    }

    /// `Authorization: Bearer <token>`, marked sensitive.
    ///
    /// # Errors
    /// Returns `HttpError::InvalidHeaderValue` if the token contains bytes not
    /// allowed in a header value.
    pub fn bearer(token: &AccessToken) -> Result<Self, HttpError> {
        let raw = zeroize::Zeroizing::new(format!("Bearer {}", token.expose()));
        let mut value = HeaderValue::from_str(&raw)?;
        value.set_sensitive(true);
        Ok(Self {
            name: AUTHORIZATION,
            value,
        })
    }

    /// Name of the header this layer sets.
    #[must_use]
    pub fn header_name(&self) -> &HeaderName {
        &self.name
    }
}

impl fmt::Debug for DefaultHeaderLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("DefaultHeaderLayer");
        s.field("name", &self.name);
        if self.value.is_sensitive() {
            s.field("value", &"[REDACTED]");
        } else {
            s.field("value", &self.value);
        }
        s.finish()
    }
}

impl<S> Layer<S> for DefaultHeaderLayer {
    type Service = DefaultHeaderService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        DefaultHeaderService {
            inner,
            name: self.name.clone(),
            value: self.value.clone(),
        }
    }
}

/// Service created by [`DefaultHeaderLayer`].
#[derive(Clone)]
pub struct DefaultHeaderService<S> {
    inner: S,
    name: HeaderName,
    value: HeaderValue,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for DefaultHeaderService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        req.headers_mut()
            .entry(self.name.clone())
            .or_insert_with(|| self.value.clone());
        self.inner.call(req)
    }
}
