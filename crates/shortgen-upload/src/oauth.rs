//! OAuth access-token resolution and refresh.
//!
//! The authorization-code exchange happens elsewhere; this module only
//! keeps an already-granted credential usable by refreshing it when it
//! expires and writing the new token back to the credential store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use shortgen_models::OAuthCredential;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::UploadConfig;
use crate::error::{UploadError, UploadResult};
use crate::metrics::record_token_refresh;
use crate::store::CredentialStore;

/// A freshly issued access token.
#[derive(Debug, Clone)]
pub struct RefreshedToken {
    pub access_token: String,
    pub expires_at: Option<DateTime<Utc>>,
    /// Set when the provider rotates the refresh token as well.
    pub refresh_token: Option<String>,
}

/// Identity provider able to trade a refresh token for a new access token.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> UploadResult<RefreshedToken>;
}

/// Google OAuth token endpoint.
pub struct GoogleIdentityProvider {
    http: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl GoogleIdentityProvider {
    pub fn new(config: &UploadConfig) -> UploadResult<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    async fn refresh(&self, refresh_token: &str) -> UploadResult<RefreshedToken> {
        let params = [
            ("refresh_token", refresh_token),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let resp = self.http.post(&self.token_url).form(&params).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(UploadError::auth(format!(
                "Token refresh failed ({status}): {text}"
            )));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| UploadError::malformed(format!("Invalid token response: {e}")))?;

        Ok(RefreshedToken {
            access_token: token.access_token,
            expires_at: token
                .expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs)),
            refresh_token: token.refresh_token.filter(|t| !t.is_empty()),
        })
    }
}

/// Hands out a usable credential for an account, refreshing on expiry.
pub struct CredentialResolver {
    store: Arc<dyn CredentialStore>,
    provider: Arc<dyn IdentityProvider>,
    refresh_lock: Mutex<()>,
}

impl CredentialResolver {
    pub fn new(store: Arc<dyn CredentialStore>, provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            store,
            provider,
            refresh_lock: Mutex::new(()),
        }
    }

    /// A credential whose access token is not expired.
    ///
    /// A refreshed token is persisted before it is returned. Any failure
    /// to produce a usable credential is an `AuthenticationFailure`.
    pub async fn resolve(&self, account: &str) -> UploadResult<OAuthCredential> {
        let credential = self.load(account).await?;
        if !credential.is_expired() {
            return Ok(credential);
        }

        // One refresh at a time; re-read in case another caller just did it.
        let _guard = self.refresh_lock.lock().await;
        let credential = self.load(account).await?;
        if !credential.is_expired() {
            return Ok(credential);
        }

        if !credential.can_refresh() {
            return Err(UploadError::auth(format!(
                "Access token for {account} expired and no refresh token is stored"
            )));
        }
        let refresh_token = credential.refresh_token.clone().unwrap_or_default();

        let refreshed = match self.provider.refresh(&refresh_token).await {
            Ok(token) => {
                record_token_refresh(true);
                token
            }
            Err(e) => {
                record_token_refresh(false);
                warn!(account = %account, "Failed to refresh credentials: {}", e);
                return Err(if matches!(e, UploadError::AuthenticationFailure(_)) {
                    e
                } else {
                    UploadError::auth(e.to_string())
                });
            }
        };

        let mut updated = credential;
        updated.access_token = refreshed.access_token;
        updated.token_expires = refreshed.expires_at;
        if let Some(rotated) = refreshed.refresh_token {
            updated.refresh_token = Some(rotated);
        }

        self.store.save_credential(account, &updated).await?;
        info!(account = %account, "Refreshed credentials");
        Ok(updated)
    }

    async fn load(&self, account: &str) -> UploadResult<OAuthCredential> {
        self.store
            .get_credential(account)
            .await?
            .ok_or_else(|| UploadError::auth(format!("No YouTube credentials found for {account}")))
    }
}
