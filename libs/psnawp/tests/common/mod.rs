#![allow(dead_code)]

use httpmock::prelude::*;
use psnawp::{AccessToken, Endpoints, HttpSettings, PsnConfig, Psnawp};
use serde_json::json;

pub const TOKEN: &str = "integration-token";
pub const ACCOUNT: &str = "6515971742264256071";
pub const HANDLE: &str = "VaultTec_Trading";

/// A facade whose every endpoint points at `server`.
pub fn psnawp_for(server: &MockServer) -> Psnawp {
    let config = PsnConfig {
        endpoints: Endpoints::rooted_at(&server.base_url()),
        http: HttpSettings {
            allow_insecure_http: true,
            ..HttpSettings::default()
        },
        access_token: Some(AccessToken::new(TOKEN)),
    };
    Psnawp::new(config).expect("client builds")
}

/// Mock the profile lookup used to resolve [`ACCOUNT`].
pub fn mock_profile<'a>(server: &'a MockServer) -> httpmock::Mock<'a> {
    server.mock(|when, then| {
        when.method(GET)
            .path(format!("/api/userProfile/v1/internal/users/{ACCOUNT}/profiles"))
            .header("authorization", format!("Bearer {TOKEN}"));
        then.status(200)
            .json_body(json!({"onlineId": HANDLE, "aboutMe": "", "avatars": []}));
    })
}
