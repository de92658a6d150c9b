//! Storage layer for chat users
//!
//! Provides a persistent implementation using Cloudflare R2 / AWS S3 and an
//! in-memory one for deployments without a bucket.

use crate::config::CoreSettings;
use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use aws_types::region::Region;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Error retrieving object from S3
    #[error("S3 Get error: {0}")]
    S3Get(Box<SdkError<GetObjectError>>),
    /// Error putting object into S3
    #[error("S3 put error: {0}")]
    S3Put(String),
    /// Error during JSON serialization or deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Standard I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Configuration error (missing credentials, etc.)
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A Telegram user known to the bot.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ChatUser {
    /// Telegram user id
    pub user_id: i64,
    /// `@username`, if set
    pub username: Option<String>,
    /// First name
    pub first_name: Option<String>,
    /// Last name
    pub last_name: Option<String>,
    /// IETF language tag reported by the client
    pub language_code: Option<String>,
    /// Set when a delivery failed because the user blocked the bot
    #[serde(default)]
    pub is_blocked_bot: bool,
    /// Last time the record was written
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ChatUser {
    /// Combine an inbound identity with the stored record.
    ///
    /// Fields missing from `self` are taken from `existing`; the blocked
    /// flag is cleared because the user is evidently talking to us.
    #[must_use]
    pub fn merged_with(self, existing: Option<Self>) -> Self {
        let existing = existing.unwrap_or_default();
        Self {
            user_id: self.user_id,
            username: self.username.or(existing.username),
            first_name: self.first_name.or(existing.first_name),
            last_name: self.last_name.or(existing.last_name),
            language_code: self.language_code.or(existing.language_code),
            is_blocked_bot: false,
            updated_at: Some(Utc::now()),
        }
    }
}

/// Interface for user storage providers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert or update a user by id, returning the stored record
    async fn upsert_user(&self, user: ChatUser) -> Result<ChatUser, StorageError>;
    /// Get a user by id
    async fn get_user(&self, user_id: i64) -> Result<Option<ChatUser>, StorageError>;
    /// Set the blocked flag on a known user. Unknown users are ignored.
    async fn set_blocked(&self, user_id: i64, blocked: bool) -> Result<(), StorageError>;
    /// Check connection to storage
    async fn check_connection(&self) -> Result<(), String>;
}

/// R2-backed storage implementation
pub struct R2Storage {
    client: Client,
    bucket: String,
    cache: Cache<String, Arc<Vec<u8>>>,
}

impl R2Storage {
    /// Create a new R2 storage instance
    ///
    /// # Errors
    ///
    /// Returns an error if R2 configuration is missing.
    pub async fn new(settings: &CoreSettings) -> Result<Self, StorageError> {
        let endpoint_url = settings
            .r2_endpoint_url
            .as_ref()
            .ok_or_else(|| StorageError::Config("R2_ENDPOINT_URL is missing".into()))?;
        let access_key = settings
            .r2_access_key_id
            .as_ref()
            .ok_or_else(|| StorageError::Config("R2_ACCESS_KEY_ID is missing".into()))?;
        let secret_key = settings
            .r2_secret_access_key
            .as_ref()
            .ok_or_else(|| StorageError::Config("R2_SECRET_ACCESS_KEY is missing".into()))?;
        let bucket = settings
            .r2_bucket_name
            .as_ref()
            .ok_or_else(|| StorageError::Config("R2_BUCKET_NAME is missing".into()))?;

        let credentials = Credentials::new(access_key, secret_key, None, None, "r2-storage");

        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new("auto"))
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .endpoint_url(endpoint_url)
            .force_path_style(true)
            .build();

        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(Duration::from_secs(60 * 60))
            .time_to_idle(Duration::from_secs(30 * 60))
            .build();

        Ok(Self {
            client: Client::from_conf(s3_config),
            bucket: bucket.clone(),
            cache,
        })
    }

    async fn save_json<T: Serialize + Sync>(&self, key: &str, data: &T) -> Result<(), StorageError> {
        let body_bytes = serde_json::to_vec_pretty(data)?;

        // Write-through
        self.cache
            .insert(key.to_string(), Arc::new(body_bytes.clone()))
            .await;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body_bytes))
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| StorageError::S3Put(e.to_string()))?;

        Ok(())
    }

    async fn load_json<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, StorageError> {
        if let Some(cached) = self.cache.get(key).await {
            match serde_json::from_slice(&cached) {
                Ok(data) => return Ok(Some(data)),
                Err(e) => {
                    warn!("Cache deserialization failed for {key}: {e}");
                    self.cache.invalidate(key).await;
                }
            }
        }

        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(output) => {
                let data = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| StorageError::Io(std::io::Error::other(e)))?
                    .into_bytes();

                self.cache
                    .insert(key.to_string(), Arc::new(data.to_vec()))
                    .await;

                Ok(Some(serde_json::from_slice(&data)?))
            }
            Err(SdkError::ServiceError(err)) if err.err().is_no_such_key() => Ok(None),
            Err(e) => Err(StorageError::S3Get(Box::new(e))),
        }
    }
}

#[async_trait]
impl UserStore for R2Storage {
    async fn upsert_user(&self, user: ChatUser) -> Result<ChatUser, StorageError> {
        let key = user_key(user.user_id);
        let existing = self.load_json::<ChatUser>(&key).await?;
        let merged = user.merged_with(existing);
        self.save_json(&key, &merged).await?;
        debug!("Upserted user {}", merged.user_id);
        Ok(merged)
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<ChatUser>, StorageError> {
        self.load_json(&user_key(user_id)).await
    }

    async fn set_blocked(&self, user_id: i64, blocked: bool) -> Result<(), StorageError> {
        let key = user_key(user_id);
        let Some(mut user) = self.load_json::<ChatUser>(&key).await? else {
            return Ok(());
        };
        user.is_blocked_bot = blocked;
        user.updated_at = Some(Utc::now());
        self.save_json(&key, &user).await
    }

    async fn check_connection(&self) -> Result<(), String> {
        match self.client.list_buckets().send().await {
            Ok(_) => {
                info!("Successfully connected to R2 storage.");
                Ok(())
            }
            Err(e) => {
                let err_msg = format!("R2 connectivity test failed: {e:#?}");
                error!("{err_msg}");
                Err(err_msg)
            }
        }
    }
}

/// Process-local user storage.
#[derive(Default)]
pub struct InMemoryStorage {
    users: RwLock<HashMap<i64, ChatUser>>,
}

impl InMemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryStorage {
    async fn upsert_user(&self, user: ChatUser) -> Result<ChatUser, StorageError> {
        let mut users = self.users.write().await;
        let existing = users.remove(&user.user_id);
        let merged = user.merged_with(existing);
        users.insert(merged.user_id, merged.clone());
        Ok(merged)
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<ChatUser>, StorageError> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn set_blocked(&self, user_id: i64, blocked: bool) -> Result<(), StorageError> {
        if let Some(user) = self.users.write().await.get_mut(&user_id) {
            user.is_blocked_bot = blocked;
            user.updated_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn check_connection(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Build the configured store: R2 when credentials are present, otherwise
/// in-memory.
///
/// # Errors
///
/// Returns an error if R2 is configured but the client cannot be created.
pub async fn create_user_store(settings: &CoreSettings) -> Result<Arc<dyn UserStore>, StorageError> {
    if settings.has_r2() {
        let storage = R2Storage::new(settings).await?;
        if let Err(e) = storage.check_connection().await {
            warn!("R2 check failed, continuing anyway: {e}");
        }
        Ok(Arc::new(storage))
    } else {
        info!("R2 is not configured, users are kept in memory");
        Ok(Arc::new(InMemoryStorage::new()))
    }
}

/// Returns the R2 key for a user's record
#[must_use]
pub fn user_key(user_id: i64) -> String {
    format!("users/{user_id}.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(user_id: i64) -> ChatUser {
        ChatUser {
            user_id,
            username: Some("neo".into()),
            first_name: Some("Thomas".into()),
            last_name: None,
            language_code: Some("en".into()),
            ..ChatUser::default()
        }
    }

    #[test]
    fn test_user_key() {
        assert_eq!(user_key(42), "users/42.json");
    }

    #[test]
    fn test_merge_keeps_missing_fields_and_unblocks() {
        let existing = ChatUser {
            last_name: Some("Anderson".into()),
            is_blocked_bot: true,
            ..identity(1)
        };
        let inbound = ChatUser {
            username: None,
            first_name: Some("Tom".into()),
            ..identity(1)
        };
        let merged = inbound.merged_with(Some(existing));
        assert_eq!(merged.username.as_deref(), Some("neo"));
        assert_eq!(merged.first_name.as_deref(), Some("Tom"));
        assert_eq!(merged.last_name.as_deref(), Some("Anderson"));
        assert!(!merged.is_blocked_bot);
        assert!(merged.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_in_memory_upsert_and_block() -> Result<(), StorageError> {
        let store = InMemoryStorage::new();
        assert_eq!(store.get_user(7).await?, None);

        store.upsert_user(identity(7)).await?;
        store.set_blocked(7, true).await?;
        assert_eq!(store.get_user(7).await?.map(|u| u.is_blocked_bot), Some(true));

        let user = store.upsert_user(identity(7)).await?;
        assert!(!user.is_blocked_bot);
        Ok(())
    }

    #[tokio::test]
    async fn test_in_memory_set_blocked_ignores_unknown_user() -> Result<(), StorageError> {
        let store = InMemoryStorage::new();
        store.set_blocked(99, true).await?;
        assert_eq!(store.get_user(99).await?, None);
        Ok(())
    }
}
