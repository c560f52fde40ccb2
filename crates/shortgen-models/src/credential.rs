//! Stored OAuth credentials for a hosting-service account.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Refresh tokens this long before their recorded expiry.
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Access/refresh token pair persisted per account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthCredential {
    pub access_token: String,

    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Expiry of `access_token`; unknown expiry is treated as still valid.
    #[serde(default)]
    pub token_expires: Option<DateTime<Utc>>,
}

impl OAuthCredential {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            token_expires: None,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn with_expiry(mut self, expires: DateTime<Utc>) -> Self {
        self.token_expires = Some(expires);
        self
    }

    /// Whether the access token is expired (or about to be) at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.token_expires {
            Some(expires) => now + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) >= expires,
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }
}

// Tokens never end up in logs.
impl std::fmt::Debug for OAuthCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredential")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("token_expires", &self.token_expires)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_with_margin() {
        let now = Utc::now();
        let cred = OAuthCredential::new("a").with_expiry(now + Duration::seconds(30));
        assert!(cred.is_expired_at(now));

        let cred = OAuthCredential::new("a").with_expiry(now + Duration::minutes(30));
        assert!(!cred.is_expired_at(now));

        assert!(!OAuthCredential::new("a").is_expired_at(now));
    }

    #[test]
    fn test_can_refresh() {
        assert!(!OAuthCredential::new("a").can_refresh());
        assert!(OAuthCredential::new("a").with_refresh_token("r").can_refresh());
        assert!(!OAuthCredential::new("a").with_refresh_token("").can_refresh());
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let cred = OAuthCredential::new("secret-access").with_refresh_token("secret-refresh");
        let dbg = format!("{cred:?}");
        assert!(!dbg.contains("secret"));
    }
}
