//! Login against the CC98 identity server (OAuth2 password grant).

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::config::Account;
use crate::error::{CheckinError, Result};
use crate::gateway::{Endpoint, GatewayResolver};

// 官方客户端的固定 client 凭据
const CLIENT_ID: &str = "9a1fd200-8687-44b1-4c20-08d50a96e5cd";
const CLIENT_SECRET: &str = "8b53f727-08e2-4509-8857-e34bf92b27f2";
const SCOPE: &str = "cc98-api openid offline_access";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    error: String,
}

/// Bearer token for one account, alive for one run through the batch.
/// Never persisted.
#[derive(Debug)]
pub struct Session {
    bearer: String,
}

impl Session {
    pub fn bearer(&self) -> &str {
        &self.bearer
    }

    #[cfg(test)]
    pub fn for_tests(bearer: &str) -> Self {
        Self { bearer: bearer.to_string() }
    }
}

pub async fn login(
    client: &Client,
    resolver: &GatewayResolver,
    account: &Account,
) -> Result<Session> {
    let url = resolver.resolve(Endpoint::Login)?;
    let form = [
        ("grant_type", "password"),
        ("username", account.username.as_str()),
        ("password", account.password.as_str()),
        ("client_id", CLIENT_ID),
        ("client_secret", CLIENT_SECRET),
        ("scope", SCOPE),
    ];

    let res = client.post(&url).form(&form).send().await?;
    let status = res.status();
    let body = res.text().await?;

    if status == StatusCode::BAD_REQUEST {
        // The identity server answers 400 invalid_grant for wrong credentials.
        // Anything else on 400 is not a credential problem.
        let kind = serde_json::from_str::<TokenErrorBody>(&body)
            .map(|e| e.error)
            .unwrap_or_default();
        if kind == "invalid_grant" {
            return Err(CheckinError::Auth("username or password rejected".into()));
        }
        return Err(CheckinError::Transient(format!("login returned 400: {body}")));
    }
    if !status.is_success() {
        return Err(CheckinError::Transient(format!("login returned {status}")));
    }

    let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
        CheckinError::ResponseFormat(format!("token response did not parse ({e}): {body}"))
    })?;
    debug!(user = %account.username, "access token obtained");
    Ok(Session { bearer: token.access_token })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayBases, GatewayMode};

    fn resolver_for(server: &mockito::ServerGuard) -> GatewayResolver {
        let bases = GatewayBases { openid: server.url(), api: server.url() };
        GatewayResolver::new(GatewayMode::Direct, bases, None)
    }

    fn account() -> Account {
        Account { username: "alice".into(), password: "hunter2".into() }
    }

    #[tokio::test]
    async fn successful_login_yields_a_bearer_session() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/connect/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "access_token": "tok-123",
                    "token_type": "Bearer",
                    "expires_in": 2592000
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = Client::new();
        let session = login(&client, &resolver_for(&server), &account())
            .await
            .unwrap();
        assert_eq!(session.bearer(), "tok-123");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn invalid_grant_is_an_authentication_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/connect/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant"}"#)
            .create_async()
            .await;

        let client = Client::new();
        let err = login(&client, &resolver_for(&server), &account())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckinError::Auth(_)));
    }

    #[tokio::test]
    async fn server_error_is_transient() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/connect/token")
            .with_status(502)
            .create_async()
            .await;

        let client = Client::new();
        let err = login(&client, &resolver_for(&server), &account())
            .await
            .unwrap_err();
        assert!(err.is_transient(), "{err}");
    }

    #[tokio::test]
    async fn garbage_2xx_body_is_a_format_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/connect/token")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let client = Client::new();
        let err = login(&client, &resolver_for(&server), &account())
            .await
            .unwrap_err();
        match err {
            CheckinError::ResponseFormat(msg) => assert!(msg.contains("maintenance")),
            other => panic!("expected ResponseFormat, got {other}"),
        }
    }
}
