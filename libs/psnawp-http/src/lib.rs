#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! HTTP plumbing for the `PlayStation` Network client.
//!
//! [`HttpClient`] is a hyper-util connection pool over rustls (HTTPS only
//! unless insecure HTTP is explicitly allowed) wrapped in tower layers: a
//! per-request timeout, `User-Agent` and bearer token headers, and response
//! decompression. A bounded buffer in front of the stack fails fast with
//! [`HttpError::Overloaded`] instead of queueing without limit.
//!
//! Nothing is retried. A failed call surfaces its error to the caller.
//!
//! ```ignore
//! use psnawp_http::{AccessToken, HttpClient};
//!
//! let client = HttpClient::builder()
//!     .bearer_token(AccessToken::new("..."))
//!     .build()?;
//! let blocks: serde_json::Value = client
//!     .get("https://m.np.playstation.com/api/userProfile/v1/internal/users/me/blocks")
//!     .send()
//!     .await?
//!     .json()
//!     .await?;
//! ```

mod builder;
mod client;
mod config;
mod error;
mod layers;
mod request;
mod response;
mod secret;

pub use builder::HttpClientBuilder;
pub use client::HttpClient;
pub use config::{DEFAULT_USER_AGENT, HttpClientConfig, TransportSecurity};
pub use error::{HttpError, InvalidUriKind};
pub use http::StatusCode;
pub use layers::{DefaultHeaderLayer, DefaultHeaderService};
pub use request::RequestBuilder;
pub use response::{ERROR_BODY_PREVIEW_LIMIT, HttpResponse, ResponseBody};
pub use secret::AccessToken;
