// ============================
// portal-state/src/session.rs
// ============================
//! Credential session handling and durable persistence.
//!
//! The session survives process restarts through a [`SessionStore`]; expiry
//! is checked lazily on every [`SessionManager::is_authenticated`] call
//! instead of through a scheduled timer, so there is nothing to cancel on
//! logout.
use crate::error::StateError;
use async_trait::async_trait;
use boathouse_common::{
    AuthResponse, LoginRequest, MessageResponse, ResetPasswordPayload, ResetRequestPayload,
    ResetRequestResponse, UserProfile,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::{fs as tokio_fs, sync::RwLock};

/// Session lifetime in seconds (25 hours)
pub const SESSION_TTL_SECS: i64 = 60 * 60 * 25;

/// The persisted session document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredSession {
    pub user: UserProfile,
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl StoredSession {
    /// Whether the credential is still within its validity window
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.token.is_empty() && now < self.expires_at
    }
}

/// Durable key-value persistence for the session document
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Option<StoredSession>, StateError>;
    async fn save(&self, session: &StoredSession) -> Result<(), StateError>;
    async fn clear(&self) -> Result<(), StateError>;
}

/// File-backed session store: one JSON document per install
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            path: dir.as_ref().join("session.json"),
        }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<StoredSession>, StateError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = tokio_fs::read_to_string(&self.path).await?;
        let session: StoredSession = serde_json::from_str(&content)?;
        Ok(Some(session))
    }

    async fn save(&self, session: &StoredSession) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent() {
            tokio_fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(session)?;
        tokio_fs::write(&self.path, json).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StateError> {
        if self.path.exists() {
            tokio_fs::remove_file(&self.path).await?;
        }
        Ok(())
    }
}

/// Client of the external authentication service
#[async_trait]
pub trait AuthClient: Send + Sync {
    /// Exchange credentials for a user + token pair
    async fn login(&self, request: LoginRequest) -> Result<AuthResponse, StateError>;

    /// Notify the service of a logout; best-effort
    async fn logout(&self, token: &str) -> Result<(), StateError>;

    /// Request a password-reset link for an email
    async fn request_reset(&self, payload: ResetRequestPayload)
        -> Result<ResetRequestResponse, StateError>;

    /// Complete a password reset with a token
    async fn reset_password(&self, payload: ResetPasswordPayload)
        -> Result<MessageResponse, StateError>;

    /// Check whether a reset token is still valid
    async fn verify_reset_token(&self, token: &str) -> Result<MessageResponse, StateError>;
}

/// Owns the authenticated-user identity, the issued token and its expiry.
///
/// States are Anonymous and Authenticated; the only transitions are a
/// successful `login` (in), and `logout`, lazy expiry, or `restore` of an
/// already-expired session (out).
pub struct SessionManager {
    auth: Arc<dyn AuthClient>,
    store: Arc<dyn SessionStore>,
    current: RwLock<Option<StoredSession>>,
    ttl: Duration,
}

impl SessionManager {
    /// Create a session manager with the default 25-hour lifetime
    pub fn new(auth: Arc<dyn AuthClient>, store: Arc<dyn SessionStore>) -> Self {
        Self::with_ttl(auth, store, Duration::seconds(SESSION_TTL_SECS))
    }

    /// Create a session manager with a custom session lifetime
    pub fn with_ttl(auth: Arc<dyn AuthClient>, store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        Self {
            auth,
            store,
            current: RwLock::new(None),
            ttl,
        }
    }

    /// Restore a persisted session at startup.
    ///
    /// An already-expired session is cleared from memory and durable
    /// storage before any state is exposed. Absence or expiry is a normal
    /// state, not a failure.
    pub async fn restore(&self) -> Result<(), StateError> {
        let persisted = self.store.load().await?;

        match persisted {
            Some(session) if session.is_valid(Utc::now()) => {
                *self.current.write().await = Some(session);
            },
            Some(_) => {
                self.store.clear().await?;
                *self.current.write().await = None;
            },
            None => {
                *self.current.write().await = None;
            },
        }

        Ok(())
    }

    /// Authenticate against the external service and persist the session
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, StateError> {
        if email.is_empty() || password.is_empty() {
            return Err(StateError::Validation(
                "email and password are required".to_string(),
            ));
        }

        let response = self
            .auth
            .login(LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;

        let now = Utc::now();
        let session = StoredSession {
            user: response.user.clone(),
            token: response.token,
            issued_at: now,
            expires_at: now + self.ttl,
        };

        self.store.save(&session).await?;
        *self.current.write().await = Some(session);

        Ok(response.user)
    }

    /// Clear the session everywhere; the remote notification is
    /// best-effort and never prevents the local clear
    pub async fn logout(&self) -> Result<(), StateError> {
        let token = self.current.read().await.as_ref().map(|s| s.token.clone());

        if let Some(token) = token {
            if let Err(err) = self.auth.logout(&token).await {
                tracing::debug!(%err, "logout notification failed");
            }
        }

        *self.current.write().await = None;
        self.store.clear().await
    }

    /// Token present AND now < expiry
    pub async fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .await
            .as_ref()
            .map(|s| s.is_valid(Utc::now()))
            .unwrap_or(false)
    }

    /// Drop an expired session from memory and durable storage.
    ///
    /// Returns true if a session was cleared. Callers that poll can use
    /// this in place of the timer the lazy check replaces.
    pub async fn expire_if_due(&self) -> Result<bool, StateError> {
        let expired = {
            let current = self.current.read().await;
            matches!(current.as_ref(), Some(s) if !s.is_valid(Utc::now()))
        };

        if expired {
            *self.current.write().await = None;
            self.store.clear().await?;
        }

        Ok(expired)
    }

    /// The authenticated user, if any
    pub async fn current_user(&self) -> Option<UserProfile> {
        self.current.read().await.as_ref().map(|s| s.user.clone())
    }

    /// The issued credential, if any
    pub async fn token(&self) -> Option<String> {
        self.current.read().await.as_ref().map(|s| s.token.clone())
    }

    /// Request a password-reset link
    pub async fn request_reset(&self, email: &str) -> Result<ResetRequestResponse, StateError> {
        if email.is_empty() {
            return Err(StateError::Validation("email is required".to_string()));
        }
        self.auth
            .request_reset(ResetRequestPayload {
                email: email.to_string(),
            })
            .await
    }

    /// Complete a password reset
    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<MessageResponse, StateError> {
        if token.is_empty() || new_password.is_empty() {
            return Err(StateError::Validation(
                "token and new password are required".to_string(),
            ));
        }
        self.auth
            .reset_password(ResetPasswordPayload {
                token: token.to_string(),
                new_password: new_password.to_string(),
            })
            .await
    }

    /// Check a reset token against the service
    pub async fn verify_reset_token(&self, token: &str) -> Result<MessageResponse, StateError> {
        self.auth.verify_reset_token(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boathouse_common::Role;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;
    use uuid::Uuid;

    fn sample_profile() -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            email: "megan@goredfish.com".to_string(),
            name: "Megan Rakow".to_string(),
            role: Role::Viewer,
        }
    }

    /// Scripted auth service: counts calls, optionally rejects
    struct MockAuth {
        login_calls: AtomicUsize,
        logout_calls: AtomicUsize,
        reject_with: Option<String>,
        fail_logout: bool,
    }

    impl MockAuth {
        fn accepting() -> Self {
            Self {
                login_calls: AtomicUsize::new(0),
                logout_calls: AtomicUsize::new(0),
                reject_with: None,
                fail_logout: false,
            }
        }

        fn rejecting(message: &str) -> Self {
            Self {
                reject_with: Some(message.to_string()),
                ..Self::accepting()
            }
        }
    }

    #[async_trait]
    impl AuthClient for MockAuth {
        async fn login(&self, request: LoginRequest) -> Result<AuthResponse, StateError> {
            self.login_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = &self.reject_with {
                return Err(StateError::Auth(message.clone()));
            }
            Ok(AuthResponse {
                user: UserProfile {
                    email: request.email,
                    ..sample_profile()
                },
                token: "token-1".to_string(),
            })
        }

        async fn logout(&self, _token: &str) -> Result<(), StateError> {
            self.logout_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_logout {
                return Err(StateError::Service("connection refused".to_string()));
            }
            Ok(())
        }

        async fn request_reset(
            &self,
            _payload: ResetRequestPayload,
        ) -> Result<ResetRequestResponse, StateError> {
            unimplemented!("not used in session tests")
        }

        async fn reset_password(
            &self,
            _payload: ResetPasswordPayload,
        ) -> Result<MessageResponse, StateError> {
            unimplemented!("not used in session tests")
        }

        async fn verify_reset_token(&self, _token: &str) -> Result<MessageResponse, StateError> {
            unimplemented!("not used in session tests")
        }
    }

    fn manager_with(
        auth: Arc<MockAuth>,
        dir: &TempDir,
        ttl: Duration,
    ) -> SessionManager {
        let store = Arc::new(FileSessionStore::new(dir.path()));
        SessionManager::with_ttl(auth, store, ttl)
    }

    #[tokio::test]
    async fn test_login_then_authenticated() {
        let auth = Arc::new(MockAuth::accepting());
        let dir = TempDir::new().unwrap();
        let manager = manager_with(auth.clone(), &dir, Duration::hours(25));

        assert!(!manager.is_authenticated().await);

        let user = manager.login("megan@goredfish.com", "10fornow").await.unwrap();
        assert_eq!(user.email, "megan@goredfish.com");
        assert!(manager.is_authenticated().await);
        assert_eq!(manager.token().await.as_deref(), Some("token-1"));
    }

    #[tokio::test]
    async fn test_empty_credentials_fail_before_any_network_call() {
        let auth = Arc::new(MockAuth::accepting());
        let dir = TempDir::new().unwrap();
        let manager = manager_with(auth.clone(), &dir, Duration::hours(25));

        let err = manager.login("", "x").await.unwrap_err();
        assert!(matches!(err, StateError::Validation(_)));

        let err = manager.login("megan@goredfish.com", "").await.unwrap_err();
        assert!(matches!(err, StateError::Validation(_)));

        assert_eq!(auth.login_calls.load(Ordering::SeqCst), 0);
        assert!(!manager.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_rejected_login_surfaces_service_message() {
        let auth = Arc::new(MockAuth::rejecting("Invalid credentials"));
        let dir = TempDir::new().unwrap();
        let manager = manager_with(auth, &dir, Duration::hours(25));

        let err = manager.login("megan@goredfish.com", "wrong").await.unwrap_err();
        match err {
            StateError::Auth(message) => assert_eq!(message, "Invalid credentials"),
            other => panic!("expected Auth error, got {other:?}"),
        }
        assert!(!manager.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_session_expires_lazily() {
        let auth = Arc::new(MockAuth::accepting());
        let dir = TempDir::new().unwrap();
        let manager = manager_with(auth, &dir, Duration::milliseconds(80));

        manager.login("megan@goredfish.com", "10fornow").await.unwrap();
        assert!(manager.is_authenticated().await);

        tokio::time::sleep(std::time::Duration::from_millis(120)).await;
        assert!(!manager.is_authenticated().await);

        // expire_if_due clears memory and durable storage
        assert!(manager.expire_if_due().await.unwrap());
        let store = FileSessionStore::new(dir.path());
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restore_roundtrip() {
        let auth = Arc::new(MockAuth::accepting());
        let dir = TempDir::new().unwrap();

        {
            let manager = manager_with(auth.clone(), &dir, Duration::hours(25));
            manager.login("megan@goredfish.com", "10fornow").await.unwrap();
        }

        // A fresh manager over the same store restores the session
        let manager = manager_with(auth, &dir, Duration::hours(25));
        assert!(!manager.is_authenticated().await);
        manager.restore().await.unwrap();
        assert!(manager.is_authenticated().await);
        assert_eq!(
            manager.current_user().await.unwrap().email,
            "megan@goredfish.com"
        );
    }

    #[tokio::test]
    async fn test_restore_clears_expired_persisted_session() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());

        // Persist an already-expired session directly
        let now = Utc::now();
        let expired = StoredSession {
            user: sample_profile(),
            token: "stale-token".to_string(),
            issued_at: now - Duration::hours(26),
            expires_at: now - Duration::hours(1),
        };
        store.save(&expired).await.unwrap();

        let auth = Arc::new(MockAuth::accepting());
        let manager = manager_with(auth, &dir, Duration::hours(25));
        manager.restore().await.unwrap();

        assert!(!manager.is_authenticated().await);
        // Durable storage was cleared as well
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_locally_even_if_notify_fails() {
        let auth = Arc::new(MockAuth {
            fail_logout: true,
            ..MockAuth::accepting()
        });
        let dir = TempDir::new().unwrap();
        let manager = manager_with(auth.clone(), &dir, Duration::hours(25));

        manager.login("megan@goredfish.com", "10fornow").await.unwrap();
        assert!(manager.is_authenticated().await);

        manager.logout().await.unwrap();
        assert_eq!(auth.logout_calls.load(Ordering::SeqCst), 1);
        assert!(!manager.is_authenticated().await);

        let store = FileSessionStore::new(dir.path());
        assert!(store.load().await.unwrap().is_none());
    }
}
