//! Email magic-link login.
//!
//! A login attempt stores a random nonce in the caller's session and emails a
//! link whose single query parameter is an encrypted payload binding the
//! email, the nonce, and an issue timestamp. Consuming the link re-derives
//! the payload, checks the fixed TTL, and compares the nonce against the
//! session before logging in or handing off to signup. The signup form
//! resubmits the same magic parameter, so no second email round trip is
//! needed.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::models::User;
use crate::repositories::{RepositoryError, UserRepository};
use crate::services::email_service::{EmailError, EmailService};
use crate::validate::{FieldErrors, FormCheck};

/// Session key holding the logged-in account id.
pub const SESSION_USER_ID: &str = "user_id";
/// Session key holding the pending login nonce. At most one per session.
pub const SESSION_NONCE: &str = "nonce";

/// Fixed validity window of a link, evaluated at consumption time.
pub const MAGIC_LINK_TTL_MINUTES: i64 = 10;

pub const VALIDATE_PATH: &str = "/validate-magic-link";

#[derive(Debug, thiserror::Error)]
pub enum MagicLinkError {
    #[error("{0}")]
    InvalidPayload(String),
    #[error("The magic link has expired")]
    Expired,
    #[error("Invalid nonce")]
    NonceMismatch,
    #[error("Validation failed")]
    Validation(FieldErrors),
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Email error: {0}")]
    Email(#[from] EmailError),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct MagicLinkPayload {
    pub email: String,
    pub nonce: String,
    pub created_at: DateTime<Utc>,
}

/// AES-256-GCM over the serialized payload; the random nonce is prepended to
/// the ciphertext and the whole token is URL-safe base64, so it can ride in a
/// query parameter unescaped.
pub struct LinkCipher {
    key: [u8; 32],
}

impl std::fmt::Debug for LinkCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkCipher").field("key", &"[REDACTED]").finish()
    }
}

impl LinkCipher {
    pub fn new(secret: &str) -> Self {
        use sha2::{Digest, Sha256};
        let digest = Sha256::digest(secret.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        Self { key }
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let key = Key::<Aes256Gcm>::from_slice(&self.key);
        let cipher = Aes256Gcm::new(key);
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| anyhow!("Encryption failed: {}", e))?;

        let mut combined = nonce.to_vec();
        combined.extend_from_slice(&ciphertext);

        Ok(URL_SAFE_NO_PAD.encode(&combined))
    }

    pub fn decrypt(&self, encrypted: &str) -> Result<String> {
        let combined = URL_SAFE_NO_PAD
            .decode(encrypted)
            .map_err(|e| anyhow!("Invalid token encoding: {}", e))?;

        if combined.len() < 12 {
            return Err(anyhow!("Invalid token: too short"));
        }

        let (nonce, ciphertext) = combined.split_at(12);
        let nonce = Nonce::from_slice(nonce);

        let key = Key::<Aes256Gcm>::from_slice(&self.key);
        let cipher = Aes256Gcm::new(key);
        let plaintext = cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| anyhow!("Decryption failed: {}", e))?;

        String::from_utf8(plaintext).map_err(|e| anyhow!("Invalid UTF-8 in token: {}", e))
    }
}

/// Outcome of consuming a valid link.
#[derive(Debug)]
pub enum LinkOutcome {
    /// Existing account: the session now carries the user id.
    Authenticated(User),
    /// No account for this email; the nonce is left in place so the signup
    /// form can resubmit the same token.
    SignupRequired(String),
}

/// Returned by `issue_login_attempt`; the raw link is surfaced only outside
/// production so it can be followed without a mailbox.
#[derive(Debug)]
pub struct IssuedLogin {
    pub email: String,
    pub dev_link: Option<String>,
}

pub struct MagicLinkService {
    origin: String,
    production: bool,
    cipher: LinkCipher,
    users: Arc<dyn UserRepository>,
    email: Arc<dyn EmailService>,
}

impl MagicLinkService {
    pub fn new(
        config: &AppConfig,
        users: Arc<dyn UserRepository>,
        email: Arc<dyn EmailService>,
    ) -> Self {
        Self {
            origin: config.origin.clone(),
            production: config.environment.is_production(),
            cipher: LinkCipher::new(&config.magic_link_secret),
            users,
            email,
        }
    }

    /// Builds a login URL for the given email and nonce, stamped with the
    /// current time.
    pub fn generate_link(&self, email: &str, nonce: &str) -> Result<String, MagicLinkError> {
        self.generate_link_at(email, nonce, Utc::now())
    }

    /// Deterministic given a fixed timestamp (up to the cipher's random
    /// nonce); the hook expiry tests use.
    pub fn generate_link_at(
        &self,
        email: &str,
        nonce: &str,
        created_at: DateTime<Utc>,
    ) -> Result<String, MagicLinkError> {
        let payload = MagicLinkPayload {
            email: email.to_string(),
            nonce: nonce.to_string(),
            created_at,
        };

        let json = serde_json::to_string(&payload)
            .map_err(|e| MagicLinkError::InvalidPayload(e.to_string()))?;
        let token = self
            .cipher
            .encrypt(&json)
            .map_err(|e| MagicLinkError::InvalidPayload(e.to_string()))?;

        Ok(format!("{}{}?magic={}", self.origin, VALIDATE_PATH, token))
    }

    /// Stores a fresh nonce in the session (replacing any pending one),
    /// builds a link, and dispatches it by email.
    pub async fn issue_login_attempt(
        &self,
        session: &Session,
        email: &str,
    ) -> Result<IssuedLogin, MagicLinkError> {
        let mut check = FormCheck::new();
        let email = check.email("email", email);
        check.finish().map_err(MagicLinkError::Validation)?;

        let nonce = Uuid::new_v4().to_string();
        session.insert(SESSION_NONCE, &nonce).await?;

        let link = self.generate_link(&email, &nonce)?;
        self.email.send_magic_link(&email, &link).await?;

        tracing::info!(email = %email, "issued magic-link login attempt");

        Ok(IssuedLogin {
            dev_link: (!self.production).then(|| link),
            email,
        })
    }

    /// Decrypts and shape-checks the magic query parameter. Any unexpected
    /// shape fails closed.
    pub fn payload_from_param(
        &self,
        magic: Option<&str>,
    ) -> Result<MagicLinkPayload, MagicLinkError> {
        let magic = magic.ok_or_else(|| {
            MagicLinkError::InvalidPayload("magic parameter doesn't exist".to_string())
        })?;

        let json = self.cipher.decrypt(magic).map_err(|_| {
            MagicLinkError::InvalidPayload("Invalid magic link payload".to_string())
        })?;

        serde_json::from_str::<MagicLinkPayload>(&json).map_err(|_| {
            MagicLinkError::InvalidPayload("Invalid magic link payload".to_string())
        })
    }

    /// Validates a returned link against the caller's session.
    ///
    /// The stored nonce is cleared on expiry and on mismatch so a stale
    /// nonce can never be replayed by a later attempt; it survives only the
    /// signup-required outcome, where the same token must validate once more.
    pub async fn consume_link(
        &self,
        session: &Session,
        magic: Option<&str>,
    ) -> Result<LinkOutcome, MagicLinkError> {
        let payload = self.payload_from_param(magic)?;

        let expires_at = payload.created_at + Duration::minutes(MAGIC_LINK_TTL_MINUTES);
        if Utc::now() > expires_at {
            session.remove::<String>(SESSION_NONCE).await?;
            return Err(MagicLinkError::Expired);
        }

        let stored = session.get::<String>(SESSION_NONCE).await?;
        if stored.as_deref() != Some(payload.nonce.as_str()) {
            session.remove::<String>(SESSION_NONCE).await?;
            return Err(MagicLinkError::NonceMismatch);
        }

        match self.users.find_by_email(&payload.email).await? {
            Some(user) => {
                session.insert(SESSION_USER_ID, user.id).await?;
                session.remove::<String>(SESSION_NONCE).await?;
                tracing::info!(user_id = user.id, "magic-link login");
                Ok(LinkOutcome::Authenticated(user))
            }
            None => Ok(LinkOutcome::SignupRequired(payload.email)),
        }
    }

    /// Creates the account for a signup-required link. The form resubmits
    /// the original magic parameter, which is re-derived here; names must be
    /// non-blank.
    pub async fn complete_signup(
        &self,
        session: &Session,
        magic: Option<&str>,
        first_name: &str,
        last_name: &str,
    ) -> Result<User, MagicLinkError> {
        let mut check = FormCheck::new();
        let first_name = check.require("firstName", first_name, "First Name cannot be blank.");
        let last_name = check.require("lastName", last_name, "Last Name cannot be blank.");
        check.finish().map_err(MagicLinkError::Validation)?;

        let payload = self.payload_from_param(magic)?;

        let user = self
            .users
            .create(&payload.email, &first_name, &last_name)
            .await?;

        session.insert(SESSION_USER_ID, user.id).await?;
        session.remove::<String>(SESSION_NONCE).await?;
        tracing::info!(user_id = user.id, "account created via magic link");

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use crate::repositories::user_repository::MockUserRepository;
    use crate::services::email_service::ConsoleEmailService;
    use mockall::predicate::*;
    use tower_sessions::MemoryStore;

    fn service_with(users: MockUserRepository) -> MagicLinkService {
        let config = AppConfig::new(
            "http://localhost:3000",
            "test-secret",
            Environment::Development,
        );
        MagicLinkService::new(&config, Arc::new(users), Arc::new(ConsoleEmailService))
    }

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn consume_authenticates_known_email() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .with(eq("alex@example.com"))
            .times(1)
            .returning(|_| {
                Box::pin(async move {
                    Ok(Some(User {
                        id: 42,
                        email: "alex@example.com".to_string(),
                        first_name: "Alex".to_string(),
                        last_name: "Smith".to_string(),
                        created_at: None,
                    }))
                })
            });

        let service = service_with(users);
        let session = session();
        session.insert(SESSION_NONCE, "n1").await.unwrap();

        let link = service.generate_link("alex@example.com", "n1").unwrap();
        let magic = link.split("magic=").nth(1).unwrap();

        let outcome = service.consume_link(&session, Some(magic)).await.unwrap();
        assert!(matches!(outcome, LinkOutcome::Authenticated(user) if user.id == 42));
        assert_eq!(session.get::<i64>(SESSION_USER_ID).await.unwrap(), Some(42));
    }

    #[tokio::test]
    async fn consume_never_hits_repository_on_nonce_mismatch() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().times(0);

        let service = service_with(users);
        let session = session();
        session.insert(SESSION_NONCE, "other").await.unwrap();

        let link = service.generate_link("alex@example.com", "n1").unwrap();
        let magic = link.split("magic=").nth(1).unwrap();

        let result = service.consume_link(&session, Some(magic)).await;
        assert!(matches!(result, Err(MagicLinkError::NonceMismatch)));
    }

    #[test]
    fn cipher_round_trips() {
        let cipher = LinkCipher::new("test-secret");
        let plaintext = r#"{"email":"a@b.com","nonce":"n1","createdAt":"2026-01-01T00:00:00Z"}"#;

        let token = cipher.encrypt(plaintext).unwrap();
        assert_ne!(token, plaintext);
        assert_eq!(cipher.decrypt(&token).unwrap(), plaintext);
    }

    #[test]
    fn cipher_is_url_safe() {
        let cipher = LinkCipher::new("test-secret");
        let token = cipher.encrypt("payload payload payload").unwrap();
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn tampered_token_fails_loudly() {
        let cipher = LinkCipher::new("test-secret");
        let token = cipher.encrypt("hello").unwrap();

        let mut tampered = token.into_bytes();
        let last = tampered.len() - 1;
        tampered[last] = if tampered[last] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).unwrap();

        assert!(cipher.decrypt(&tampered).is_err());
    }

    #[test]
    fn wrong_secret_fails() {
        let token = LinkCipher::new("secret-one").encrypt("hello").unwrap();
        assert!(LinkCipher::new("secret-two").decrypt(&token).is_err());
    }

    #[test]
    fn payload_shape_is_strict() {
        let ok = r#"{"email":"a@b.com","nonce":"n1","createdAt":"2026-01-01T00:00:00Z"}"#;
        assert!(serde_json::from_str::<MagicLinkPayload>(ok).is_ok());

        let missing_nonce = r#"{"email":"a@b.com","createdAt":"2026-01-01T00:00:00Z"}"#;
        assert!(serde_json::from_str::<MagicLinkPayload>(missing_nonce).is_err());

        let extra_field =
            r#"{"email":"a@b.com","nonce":"n1","createdAt":"2026-01-01T00:00:00Z","x":1}"#;
        assert!(serde_json::from_str::<MagicLinkPayload>(extra_field).is_err());

        let bad_timestamp = r#"{"email":"a@b.com","nonce":"n1","createdAt":"yesterday"}"#;
        assert!(serde_json::from_str::<MagicLinkPayload>(bad_timestamp).is_err());

        let wrong_type = r#"{"email":42,"nonce":"n1","createdAt":"2026-01-01T00:00:00Z"}"#;
        assert!(serde_json::from_str::<MagicLinkPayload>(wrong_type).is_err());
    }
}
