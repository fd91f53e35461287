use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AccountMode, Identity};
use crate::core::error::{LauncherError, LauncherResult};

pub const ELY_AUTH_SERVER: &str = "https://authserver.ely.by";

/// Remote identity provider. Implementations report the real cause of a
/// failure; callers decide how much of it the user sees.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, email: &str, password: &str) -> LauncherResult<Identity>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthenticateRequest<'a> {
    username: &'a str,
    password: &'a str,
    request_user: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthenticateResponse {
    access_token: String,
    client_token: String,
    selected_profile: SelectedProfile,
}

#[derive(Debug, Deserialize)]
struct SelectedProfile {
    id: String,
    name: String,
}

/// Yggdrasil-style `authenticate` call against Ely.by.
#[derive(Debug, Clone)]
pub struct ElyAuthClient {
    client: Client,
    base_url: String,
}

impl ElyAuthClient {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, ELY_AUTH_SERVER)
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn authenticate_url(&self) -> String {
        format!("{}/auth/authenticate", self.base_url)
    }
}

#[async_trait]
impl Authenticator for ElyAuthClient {
    async fn authenticate(&self, email: &str, password: &str) -> LauncherResult<Identity> {
        let url = self.authenticate_url();
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(&AuthenticateRequest {
                username: email,
                password,
                request_user: true,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LauncherError::Other(format!(
                "auth server answered HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let body = response.text().await?;
        let parsed: AuthenticateResponse = serde_json::from_str(&body)?;

        Ok(Identity {
            mode: AccountMode::Ely,
            access_token: Some(parsed.access_token),
            client_token: Some(parsed.client_token),
            uuid: parsed.selected_profile.id,
            name: parsed.selected_profile.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;
    use crate::core::auth::{IdentityResolver, PlaintextCredentialStore, StoredCredentials};
    use crate::core::http::build_http_client;

    /// Answers a single request with `status` and `body`, handing back the
    /// raw request it received.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];

            loop {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request_complete(&request) {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
            String::from_utf8_lossy(&request).into_owned()
        });

        (base, handle)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        raw.len() >= header_end + 4 + content_length
    }

    fn resolver_for(base: &str, dir: &std::path::Path) -> (IdentityResolver, PlaintextCredentialStore) {
        let store = PlaintextCredentialStore::new(dir.join("user_auth.json"));
        let client = ElyAuthClient::with_base_url(build_http_client().unwrap(), base);
        (IdentityResolver::new(Arc::new(client), store.clone()), store)
    }

    #[tokio::test]
    async fn forbidden_login_is_invalid_credentials_and_persists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (base, server) = serve_once(
            "403 Forbidden",
            r#"{"error":"ForbiddenOperationException","errorMessage":"Invalid credentials. Invalid email or password."}"#,
        )
        .await;
        let (resolver, store) = resolver_for(&base, dir.path());

        let err = resolver
            .online_identity("steve@example.com", "wrong")
            .await
            .unwrap_err();

        assert!(matches!(err, LauncherError::InvalidCredentials));
        assert_eq!(err.to_string(), "Invalid credentials");
        assert!(!store.path().exists());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn successful_login_returns_profile_and_persists_pair() {
        let dir = tempfile::tempdir().unwrap();
        let (base, server) = serve_once(
            "200 OK",
            r#"{"accessToken":"at-123","clientToken":"ct-456","selectedProfile":{"id":"ffc8fdc95824509e8a57c99b940fb996","name":"ErickSkrauch"}}"#,
        )
        .await;
        let (resolver, store) = resolver_for(&base, dir.path());

        let identity = resolver
            .online_identity("erick@example.com", "s3cret")
            .await
            .unwrap();

        assert_eq!(identity.mode, AccountMode::Ely);
        assert_eq!(identity.name, "ErickSkrauch");
        assert_eq!(identity.uuid, "ffc8fdc95824509e8a57c99b940fb996");
        assert_eq!(identity.access_token.as_deref(), Some("at-123"));
        assert_eq!(identity.client_token.as_deref(), Some("ct-456"));

        assert_eq!(
            store.load().await,
            StoredCredentials {
                last_email: "erick@example.com".into(),
                last_password: "s3cret".into(),
            }
        );

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /auth/authenticate "));
        assert!(request.contains(r#""requestUser":true"#));
        assert!(request.contains(r#""username":"erick@example.com""#));
        assert!(request
            .to_ascii_lowercase()
            .contains("content-type: application/json"));
    }

    #[tokio::test]
    async fn malformed_success_body_is_invalid_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let (base, server) = serve_once("200 OK", r#"{"accessToken":"at"}"#).await;
        let (resolver, store) = resolver_for(&base, dir.path());

        let err = resolver.online_identity("a@b.c", "pw").await.unwrap_err();
        assert!(matches!(err, LauncherError::InvalidCredentials));
        assert!(!store.path().exists());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_server_is_invalid_credentials() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let dir = tempfile::tempdir().unwrap();
        let (resolver, _store) = resolver_for(&base, dir.path());
        let err = resolver.online_identity("a@b.c", "pw").await.unwrap_err();
        assert!(matches!(err, LauncherError::InvalidCredentials));
    }
}
