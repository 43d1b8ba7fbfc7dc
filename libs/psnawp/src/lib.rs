#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Client for the `PlayStation` Network web API
//!
//! - Resolve accounts by online id (handle) or account id
//! - Profile, presence, legacy profile, friendship and block status
//! - Trophy titles
//! - Private messaging through groups created on first use
//!
//! Every operation issues its request(s) when awaited and returns the parsed
//! response; nothing is cached and nothing is retried.
//!
//! # Example
//!
//! ```ignore
//! use psnawp::{Psnawp, PsnConfig};
//!
//! let psnawp = Psnawp::new(PsnConfig::load(None)?)?;
//! let user = psnawp.user_by_online_id("VaultTec_Trading").await?;
//!
//! let presence = user.presence().await?;
//! let titles = user.trophy_titles(800).await?;
//! user.send_message("Hello World!").await?;
//! ```

mod client;
mod config;
mod endpoints;
mod error;
mod group;
mod models;
mod psnawp;
mod transport;
mod user;

#[cfg(test)]
mod testing;

pub use client::{Client, MAX_FRIENDS_LIMIT};
pub use config::{ENV_PREFIX, HttpSettings, INSECURE_HTTP_AVAILABLE, PsnConfig};
pub use endpoints::{Endpoints, LEGACY_HOST, MOBILE_HOST};
pub use error::PsnError;
pub use group::{Group, MAX_CONVERSATION_LIMIT};
pub use models::{AccountIdentity, Conversation, MessageEvent, MessageSender, SentMessage};
pub use psnawp::Psnawp;
pub use psnawp_http::{AccessToken, HttpError, StatusCode};
pub use transport::{HttpTransport, Transport};
pub use user::{
    DEFAULT_CONVERSATION_COUNT, DEFAULT_TROPHY_TITLES_LIMIT, LEGACY_PROFILE_FIELDS,
    MAX_TROPHY_TITLES_LIMIT, User, UserLookup,
};
