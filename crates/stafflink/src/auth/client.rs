//! Thin reqwest wrapper for the upstream IAM service.

use std::time::Duration;

use serde_json::{json, Value};

use crate::config::IamConfig;

/// Failures talking to IAM, split by whether the service answered at all.
#[derive(Debug, thiserror::Error)]
pub enum IamError {
    #[error("identity service unreachable: {reason}")]
    Unavailable { reason: String },
    #[error("identity service returned status {status}")]
    Service { status: u16, body: Value },
}

impl IamError {
    /// HTTP status the proxy should surface for this failure.
    pub fn status(&self) -> u16 {
        match self {
            IamError::Unavailable { .. } => 503,
            IamError::Service { status, .. } => *status,
        }
    }

    /// Structured error detail carried back to the caller.
    pub fn detail(&self) -> Value {
        match self {
            IamError::Unavailable { reason } => json!({
                "error": "IAM_UNAVAILABLE",
                "message": "We cannot reach the identity service. Try again in a few minutes.",
                "reason": reason,
            }),
            IamError::Service { body, .. } => {
                if body.is_object() && !body.as_object().map_or(true, |map| map.is_empty()) {
                    body.clone()
                } else {
                    json!({
                        "error": "IAM_SERVICE_ERROR",
                        "message": "The identity service returned an unexpected error.",
                    })
                }
            }
        }
    }
}

/// Credentials forwarded to the IAM login endpoint.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
    pub captcha_token: Option<String>,
    pub force: bool,
    /// Overrides the configured application id (used by the service account).
    pub app_id: Option<String>,
}

/// HTTP client for IAM login, introspection, and directory lookups.
#[derive(Clone)]
pub struct IamClient {
    http: reqwest::Client,
    base_url: String,
    app_id: String,
    timeout: Duration,
}

impl IamClient {
    pub fn new(config: &IamConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            app_id: config.app_id.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<Value, IamError> {
        let mut payload = json!({
            "username_or_email": request.username_or_email,
            "password": request.password,
            "app_id": request.app_id.as_deref().unwrap_or(&self.app_id),
            "force": request.force,
        });
        if let Some(captcha) = &request.captcha_token {
            payload["captcha_token"] = Value::String(captcha.clone());
        }
        self.post("auth/login", Some(payload), None).await
    }

    /// Invalidate an IAM session through the logout endpoint.
    pub async fn logout(&self, token: &str) -> Result<(), IamError> {
        self.post("auth/logout", None, Some(token)).await?;
        Ok(())
    }

    /// Ask IAM whether the given token is still active.
    pub async fn introspect(&self, token: &str) -> Result<Value, IamError> {
        // Some IAM deployments require the app_id to return app-scoped roles.
        self.post(
            "auth/introspect",
            Some(json!({ "token": token, "app_id": self.app_id })),
            None,
        )
        .await
    }

    /// Directory roles for a user, used as a permission fallback.
    pub async fn user_roles(&self, user_id: &str, token: &str) -> Result<Value, IamError> {
        self.get(&format!("directory/users/{user_id}/roles"), &[], token)
            .await
    }

    /// Directory user listing (recruiter picker).
    pub async fn list_users(
        &self,
        token: &str,
        params: &[(String, String)],
    ) -> Result<Value, IamError> {
        self.get("directory/users", params, token).await
    }

    /// Roles declared for an application in the directory.
    pub async fn list_roles(&self, app_id: &str, token: &str) -> Result<Value, IamError> {
        self.get(&format!("directory/applications/{app_id}/roles"), &[], token)
            .await
    }

    async fn post(
        &self,
        path: &str,
        payload: Option<Value>,
        bearer: Option<&str>,
    ) -> Result<Value, IamError> {
        let mut request = self
            .http
            .post(format!("{}/{path}", self.base_url))
            .timeout(self.timeout);
        if let Some(payload) = &payload {
            request = request.json(payload);
        }
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        Self::dispatch(request).await
    }

    async fn get(
        &self,
        path: &str,
        params: &[(String, String)],
        bearer: &str,
    ) -> Result<Value, IamError> {
        let request = self
            .http
            .get(format!("{}/{path}", self.base_url))
            .query(params)
            .timeout(self.timeout)
            .bearer_auth(bearer);
        Self::dispatch(request).await
    }

    async fn dispatch(request: reqwest::RequestBuilder) -> Result<Value, IamError> {
        let response = request.send().await.map_err(|err| IamError::Unavailable {
            reason: err.to_string(),
        })?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if status.is_client_error() || status.is_server_error() {
            return Err(IamError::Service {
                status: status.as_u16(),
                body,
            });
        }
        Ok(if body.is_null() { json!({}) } else { body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_maps_to_503_with_reason() {
        let error = IamError::Unavailable {
            reason: "connection refused".to_string(),
        };
        assert_eq!(error.status(), 503);
        let detail = error.detail();
        assert_eq!(detail["error"], "IAM_UNAVAILABLE");
        assert_eq!(detail["reason"], "connection refused");
    }

    #[test]
    fn service_error_keeps_upstream_status_and_body() {
        let error = IamError::Service {
            status: 409,
            body: json!({ "error": "SESSION_ALREADY_ACTIVE", "message": "active elsewhere" }),
        };
        assert_eq!(error.status(), 409);
        assert_eq!(error.detail()["error"], "SESSION_ALREADY_ACTIVE");
    }

    #[test]
    fn service_error_without_body_uses_generic_detail() {
        let error = IamError::Service {
            status: 500,
            body: Value::Null,
        };
        assert_eq!(error.detail()["error"], "IAM_SERVICE_ERROR");
    }
}
