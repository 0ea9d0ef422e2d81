//! Service-account token used for privileged IAM directory calls.
//!
//! A static token from configuration wins when present. Otherwise an
//! ephemeral token is obtained by logging in with the configured service
//! account against the control application, cached until roughly 90 seconds
//! before expiry, and dropped on a directory 401.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::config::IamConfig;

use super::client::{IamClient, LoginRequest};

const REFRESH_MARGIN_SECONDS: i64 = 90;
const DEFAULT_TTL_SECONDS: i64 = 300;

#[derive(Default)]
struct CachedToken {
    token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

/// Mutex-guarded cache for the ephemeral service token.
#[derive(Default)]
pub struct ServiceTokenCache {
    inner: Mutex<CachedToken>,
}

impl ServiceTokenCache {
    /// The cached token, if it is still comfortably inside its lifetime.
    pub fn cached(&self, now: DateTime<Utc>) -> Option<String> {
        let inner = self.inner.lock().expect("token cache mutex poisoned");
        let token = inner.token.clone()?;
        let expires_at = inner.expires_at?;
        if now < expires_at - Duration::seconds(REFRESH_MARGIN_SECONDS) {
            Some(token)
        } else {
            None
        }
    }

    pub fn store(&self, token: String, expires_in_seconds: Option<i64>, now: DateTime<Utc>) {
        let ttl = expires_in_seconds
            .filter(|seconds| *seconds > 0)
            .unwrap_or(DEFAULT_TTL_SECONDS);
        let mut inner = self.inner.lock().expect("token cache mutex poisoned");
        inner.token = Some(token);
        inner.expires_at = Some(now + Duration::seconds(ttl));
    }

    /// Drop the cached token (used after a 401 from IAM).
    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("token cache mutex poisoned");
        inner.token = None;
        inner.expires_at = None;
    }
}

/// Produces tokens ready to use against IAM Directory.
pub struct ServiceTokenProvider {
    client: IamClient,
    cache: ServiceTokenCache,
    control_app_id: String,
    static_token: Option<String>,
    service_user: Option<String>,
    service_password: Option<String>,
}

impl ServiceTokenProvider {
    pub fn from_config(config: &IamConfig) -> Self {
        Self {
            client: IamClient::new(config),
            cache: ServiceTokenCache::default(),
            control_app_id: config.control_app_id().to_string(),
            static_token: config.service_token.clone(),
            service_user: config.service_user.clone(),
            service_password: config.service_password.clone(),
        }
    }

    /// Token priority: static configuration, then the cached ephemeral
    /// token, then a fresh service-account login. Returns `None` when no
    /// service credentials are configured or the login fails; callers fall
    /// back to the end-user token.
    pub async fn get(&self) -> Option<String> {
        if let Some(token) = &self.static_token {
            return Some(token.clone());
        }
        let (user, password) = match (&self.service_user, &self.service_password) {
            (Some(user), Some(password)) => (user.clone(), password.clone()),
            _ => return None,
        };

        let now = Utc::now();
        if let Some(token) = self.cache.cached(now) {
            return Some(token);
        }

        let request = LoginRequest {
            username_or_email: user,
            password,
            captcha_token: None,
            // Avoids SESSION_ALREADY_ACTIVE when the service account is reused.
            force: true,
            app_id: Some(self.control_app_id.clone()),
        };
        let response = match self.client.login(&request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "service token login failed, falling back to user token");
                return None;
            }
        };

        let token = response
            .get("access_token")
            .and_then(|value| value.as_str())
            .map(str::to_string)?;
        let expires_in = response.get("expires_in").and_then(|value| value.as_i64());
        self.cache.store(token.clone(), expires_in, now);
        Some(token)
    }

    pub fn invalidate(&self) {
        self.cache.clear();
    }
}
