// ============================
// backend-lib/src/users/store.rs
// ============================
//! User store abstraction with flat-file implementation.
//!
//! Each account is one JSON document under `<root>/users/<id>.json`.
use crate::auth::ResetToken;
use crate::error::AppError;
use async_trait::async_trait;
use boathouse_common::{Role, UserProfile};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tokio::fs as tokio_fs;
use uuid::Uuid;

/// A stored user account document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub password_hash: String,
    /// Pending password-reset token, if one was requested
    #[serde(default)]
    pub reset_token: Option<ResetToken>,
}

impl UserRecord {
    /// Public view of the account
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
        }
    }
}

/// Trait for user store backends
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a new account; fails with `UserExists` on a duplicate email
    async fn create(&self, record: UserRecord) -> Result<(), AppError>;

    /// Look up an account by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError>;

    /// Look up an account by id
    async fn get(&self, id: Uuid) -> Result<Option<UserRecord>, AppError>;

    /// List all accounts
    async fn list(&self) -> Result<Vec<UserRecord>, AppError>;

    /// Replace an existing account document
    async fn update(&self, record: UserRecord) -> Result<(), AppError>;

    /// Delete an account
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;

    /// Attach a reset token to the account with this email
    async fn set_reset_token(&self, email: &str, token: ResetToken) -> Result<(), AppError>;

    /// Find the account holding this still-valid reset token, without
    /// consuming it
    async fn find_by_reset_token(&self, token: &str) -> Result<Option<UserRecord>, AppError>;

    /// Find the account holding this reset token, consuming the token.
    ///
    /// Expired tokens are consumed but yield `InvalidResetToken`.
    async fn take_by_reset_token(&self, token: &str) -> Result<UserRecord, AppError>;
}

/// Flat-file implementation of the `UserStore` trait
#[derive(Clone)]
pub struct FlatFileUserStore {
    root: PathBuf,
}

impl FlatFileUserStore {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("users"))?;
        Ok(Self { root })
    }

    fn doc_path(&self, id: Uuid) -> PathBuf {
        self.root.join("users").join(format!("{id}.json"))
    }

    async fn read_doc(&self, path: &Path) -> Result<UserRecord, AppError> {
        let content = tokio_fs::read_to_string(path).await?;
        let record: UserRecord = serde_json::from_str(&content)?;
        Ok(record)
    }

    async fn write_doc(&self, record: &UserRecord) -> Result<(), AppError> {
        let path = self.doc_path(record.id);
        tokio_fs::create_dir_all(path.parent().unwrap()).await?;

        let json = serde_json::to_string_pretty(record)?;
        tokio_fs::write(path, json).await?;
        Ok(())
    }

    /// Scan all user documents, skipping unreadable ones
    async fn scan(&self) -> Result<Vec<UserRecord>, AppError> {
        let dir = self.root.join("users");
        let mut records = Vec::new();

        let mut entries = tokio_fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match self.read_doc(&path).await {
                Ok(record) => records.push(record),
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "skipping unreadable user document");
                },
            }
        }

        Ok(records)
    }
}

#[async_trait]
impl UserStore for FlatFileUserStore {
    async fn create(&self, record: UserRecord) -> Result<(), AppError> {
        if self.find_by_email(&record.email).await?.is_some() {
            return Err(AppError::UserExists);
        }
        self.write_doc(&record).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        let needle = email.to_ascii_lowercase();
        let records = self.scan().await?;
        Ok(records
            .into_iter()
            .find(|r| r.email.to_ascii_lowercase() == needle))
    }

    async fn get(&self, id: Uuid) -> Result<Option<UserRecord>, AppError> {
        let path = self.doc_path(id);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(self.read_doc(&path).await?))
    }

    async fn list(&self) -> Result<Vec<UserRecord>, AppError> {
        let mut records = self.scan().await?;
        records.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(records)
    }

    async fn update(&self, record: UserRecord) -> Result<(), AppError> {
        if !self.doc_path(record.id).exists() {
            return Err(AppError::NotFound(format!("user {}", record.id)));
        }
        self.write_doc(&record).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let path = self.doc_path(id);
        if !path.exists() {
            return Err(AppError::NotFound(format!("user {id}")));
        }
        tokio_fs::remove_file(path).await?;
        Ok(())
    }

    async fn set_reset_token(&self, email: &str, token: ResetToken) -> Result<(), AppError> {
        let mut record = self
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {email}")))?;
        record.reset_token = Some(token);
        self.write_doc(&record).await
    }

    async fn find_by_reset_token(&self, token: &str) -> Result<Option<UserRecord>, AppError> {
        let now = Utc::now();
        let records = self.scan().await?;
        Ok(records.into_iter().find(|r| {
            r.reset_token
                .as_ref()
                .map(|t| t.token == token && t.is_valid(now))
                .unwrap_or(false)
        }))
    }

    async fn take_by_reset_token(&self, token: &str) -> Result<UserRecord, AppError> {
        let records = self.scan().await?;
        let mut record = records
            .into_iter()
            .find(|r| {
                r.reset_token
                    .as_ref()
                    .map(|t| t.token == token)
                    .unwrap_or(false)
            })
            .ok_or(AppError::InvalidResetToken)?;

        let reset = record.reset_token.take().unwrap();
        // Single use: the token comes off the document either way
        self.write_doc(&record).await?;

        if !reset.is_valid(Utc::now()) {
            return Err(AppError::InvalidResetToken);
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{generate_reset_token, hash_password};
    use chrono::Duration;
    use tempfile::TempDir;

    fn sample_user(email: &str) -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: "Megan Rakow".to_string(),
            role: Role::Viewer,
            password_hash: hash_password("10fornowA!").unwrap(),
            reset_token: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let dir = TempDir::new().unwrap();
        let store = FlatFileUserStore::new(dir.path()).unwrap();

        let user = sample_user("megan@goredfish.com");
        store.create(user.clone()).await.unwrap();

        let found = store
            .find_by_email("MEGAN@goredfish.com")
            .await
            .unwrap()
            .expect("lookup is case-insensitive");
        assert_eq!(found.id, user.id);

        let by_id = store.get(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "megan@goredfish.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let dir = TempDir::new().unwrap();
        let store = FlatFileUserStore::new(dir.path()).unwrap();

        store.create(sample_user("a@example.com")).await.unwrap();
        let err = store.create(sample_user("a@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::UserExists));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let dir = TempDir::new().unwrap();
        let store = FlatFileUserStore::new(dir.path()).unwrap();

        let mut user = sample_user("a@example.com");
        store.create(user.clone()).await.unwrap();

        user.role = Role::Admin;
        store.update(user.clone()).await.unwrap();
        let updated = store.get(user.id).await.unwrap().unwrap();
        assert_eq!(updated.role, Role::Admin);

        store.delete(user.id).await.unwrap();
        assert!(store.get(user.id).await.unwrap().is_none());

        let err = store.delete(user.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_reset_token_single_use() {
        let dir = TempDir::new().unwrap();
        let store = FlatFileUserStore::new(dir.path()).unwrap();

        let user = sample_user("a@example.com");
        store.create(user.clone()).await.unwrap();

        let token = ResetToken {
            token: generate_reset_token(),
            expires_at: Utc::now() + Duration::hours(1),
        };
        store
            .set_reset_token("a@example.com", token.clone())
            .await
            .unwrap();

        let taken = store.take_by_reset_token(&token.token).await.unwrap();
        assert_eq!(taken.id, user.id);

        // Second use fails: the token was consumed
        let err = store.take_by_reset_token(&token.token).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidResetToken));
    }

    #[tokio::test]
    async fn test_expired_reset_token_rejected_and_consumed() {
        let dir = TempDir::new().unwrap();
        let store = FlatFileUserStore::new(dir.path()).unwrap();

        let user = sample_user("a@example.com");
        store.create(user.clone()).await.unwrap();

        let token = ResetToken {
            token: generate_reset_token(),
            expires_at: Utc::now() - Duration::minutes(1),
        };
        store
            .set_reset_token("a@example.com", token.clone())
            .await
            .unwrap();

        let err = store.take_by_reset_token(&token.token).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidResetToken));

        let record = store.get(user.id).await.unwrap().unwrap();
        assert!(record.reset_token.is_none());
    }

    #[tokio::test]
    async fn test_list_sorted_by_email() {
        let dir = TempDir::new().unwrap();
        let store = FlatFileUserStore::new(dir.path()).unwrap();

        store.create(sample_user("zoe@example.com")).await.unwrap();
        store.create(sample_user("amy@example.com")).await.unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].email, "amy@example.com");
        assert_eq!(all[1].email, "zoe@example.com");
    }
}
