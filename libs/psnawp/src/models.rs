//! Response records for the fields this client inspects.
//!
//! Endpoints whose payload is handed back verbatim return
//! [`serde_json::Value`] instead; these types cover the rest. Unknown upstream
//! fields are kept in `extra` so nothing the server sends is dropped.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Account identifiers as reported by the legacy profile endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountIdentity {
    pub account_id: String,
    pub online_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_online_id: Option<String>,
}

/// Envelope of a handle lookup: `{"profile": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileLookup {
    pub profile: AccountIdentity,
}

/// The subset of `.../{accountId}/profiles` used to resolve a handle.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub online_id: String,
}

/// `.../me/blocks`. A body without `blockList` does not decode.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockList {
    pub block_list: Vec<String>,
}

/// Reply to a group creation request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCreated {
    pub group_id: String,
}

/// Author of a message event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSender {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of a group conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<MessageSender>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A page of group messages, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    #[serde(default)]
    pub messages: Vec<MessageEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_count: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reply to a posted message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_timestamp: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
