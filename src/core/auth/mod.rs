pub mod credentials;
pub mod ely;

use std::sync::Arc;

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::error::{LauncherError, LauncherResult};

pub use credentials::{PlaintextCredentialStore, StoredCredentials};
pub use ely::{Authenticator, ElyAuthClient, ELY_AUTH_SERVER};

pub const OFFLINE_PLACEHOLDER_NAME: &str = "LauncherUser";
pub const OFFLINE_ACCESS_TOKEN: &str = "fake-token";
pub const OFFLINE_CLIENT_TOKEN: &str = "fake-client";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccountMode {
    Offline,
    Ely,
}

/// A playable account identity handed to the game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub mode: AccountMode,
    pub access_token: Option<String>,
    pub client_token: Option<String>,
    pub uuid: String,
    pub name: String,
}

impl Identity {
    /// Locally synthesized identity. The uuid is the MD5 of the name laid out
    /// as 8-4-4-4-12, so a name always maps to the same player.
    pub fn offline(name: &str) -> Self {
        let name = if name.is_empty() {
            OFFLINE_PLACEHOLDER_NAME
        } else {
            name
        };

        Self {
            mode: AccountMode::Offline,
            access_token: Some(OFFLINE_ACCESS_TOKEN.into()),
            client_token: Some(OFFLINE_CLIENT_TOKEN.into()),
            uuid: offline_uuid(name),
            name: name.to_string(),
        }
    }
}

fn offline_uuid(name: &str) -> String {
    let digest = Md5::digest(name.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest);
    Uuid::from_bytes(bytes).hyphenated().to_string()
}

/// Offline identity from whatever the UI sent: a plain username or a
/// profile object carrying `name`. Anything else gets the placeholder name.
pub fn offline_identity(seed: &Value) -> Identity {
    let name = match seed {
        Value::String(name) if !name.is_empty() => name.as_str(),
        Value::Object(profile) => match profile.get("name") {
            Some(Value::String(name)) if !name.is_empty() => name.as_str(),
            _ => OFFLINE_PLACEHOLDER_NAME,
        },
        _ => OFFLINE_PLACEHOLDER_NAME,
    };

    Identity::offline(name)
}

/// Produces identities: offline ones locally, online ones through the
/// auth collaborator.
#[derive(Clone)]
pub struct IdentityResolver {
    authenticator: Arc<dyn Authenticator>,
    credentials: PlaintextCredentialStore,
}

impl IdentityResolver {
    pub fn new(authenticator: Arc<dyn Authenticator>, credentials: PlaintextCredentialStore) -> Self {
        Self {
            authenticator,
            credentials,
        }
    }

    /// Log in against the auth server.
    ///
    /// Every failure is reported as [`LauncherError::InvalidCredentials`] and
    /// nothing is persisted. On success the raw email/password pair is stored
    /// in plaintext for autofill.
    pub async fn online_identity(&self, email: &str, password: &str) -> LauncherResult<Identity> {
        let identity = match self.authenticator.authenticate(email, password).await {
            Ok(identity) => identity,
            Err(cause) => {
                warn!("Ely.by login failed: {cause}");
                return Err(LauncherError::InvalidCredentials);
            }
        };

        if let Err(err) = self.credentials.save(email, password).await {
            warn!("[AuthManager] Could not persist credentials: {err}");
        }

        info!("Logged in to Ely.by as {}", identity.name);
        Ok(identity)
    }

    pub async fn saved_credentials(&self) -> StoredCredentials {
        self.credentials.load().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn offline_uuid_is_md5_in_canonical_groups() {
        // md5("abc") = 900150983cd24fb0d6963f7d28e17f72
        let identity = Identity::offline("abc");
        assert_eq!(identity.uuid, "90015098-3cd2-4fb0-d696-3f7d28e17f72");
        assert_eq!(identity.name, "abc");
        assert_eq!(identity.mode, AccountMode::Offline);
        assert_eq!(identity.access_token.as_deref(), Some("fake-token"));
        assert_eq!(identity.client_token.as_deref(), Some("fake-client"));
    }

    #[test]
    fn offline_identity_is_deterministic() {
        for name in ["Steve", "Alex", "ñandú", "a b c", "x"] {
            let first = offline_identity(&json!(name));
            let second = offline_identity(&json!(name));
            assert_eq!(first, second);
            assert_eq!(first.name, name);
        }
        assert_ne!(Identity::offline("Steve").uuid, Identity::offline("steve").uuid);
    }

    #[test]
    fn profile_objects_use_their_name() {
        let identity = offline_identity(&json!({ "name": "Alex", "uuid": "ignored" }));
        assert_eq!(identity, Identity::offline("Alex"));
    }

    #[test]
    fn unusable_seeds_fall_back_to_placeholder() {
        let placeholder = Identity::offline(OFFLINE_PLACEHOLDER_NAME);
        for seed in [
            json!(null),
            json!(42),
            json!(true),
            json!(""),
            json!([]),
            json!(["Alex"]),
            json!({}),
            json!({ "name": "" }),
            json!({ "name": 7 }),
        ] {
            assert_eq!(offline_identity(&seed), placeholder, "seed: {seed}");
        }
        assert_eq!(placeholder.name, "LauncherUser");
    }
}
