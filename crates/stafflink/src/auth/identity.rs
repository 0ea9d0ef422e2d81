//! Request authentication and permission resolution against IAM.

use axum::http::HeaderMap;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::config::{AuthConfig, IamConfig};
use crate::recruitment::permissions::PermissionSet;

use super::client::{IamClient, IamError};
use super::service_token::ServiceTokenProvider;

pub const DEBUG_USER_ID_HEADER: &str = "x-stafflink-user-id";
pub const DEBUG_USER_NAME_HEADER: &str = "x-stafflink-user-name";
pub const DEBUG_PERMISSIONS_HEADER: &str = "x-stafflink-permissions";

/// Identity and permissions resolved once per request.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    pub user_id: Option<Uuid>,
    pub user_name: String,
    pub permissions: PermissionSet,
}

impl AuthContext {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("authentication required")]
    MissingToken,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error(transparent)]
    Iam(#[from] IamError),
}

/// Authenticates requests via IAM introspection, with an ordered fallback
/// chain for permissions: explicit payload permissions, app-scoped entries,
/// then a directory lookup using the service token.
pub struct Authenticator {
    client: IamClient,
    service_tokens: ServiceTokenProvider,
    app_id: String,
    cookie_name: String,
    allow_debug_headers: bool,
}

impl Authenticator {
    pub fn new(iam: &IamConfig, auth: &AuthConfig) -> Self {
        Self {
            client: IamClient::new(iam),
            service_tokens: ServiceTokenProvider::from_config(iam),
            app_id: iam.app_id.to_ascii_lowercase(),
            cookie_name: auth.cookie_name.clone(),
            allow_debug_headers: auth.allow_debug_headers,
        }
    }

    pub fn client(&self) -> &IamClient {
        &self.client
    }

    pub fn service_tokens(&self) -> &ServiceTokenProvider {
        &self.service_tokens
    }

    /// Bearer header first, authentication cookie second.
    pub fn token_from_headers(&self, headers: &HeaderMap) -> Option<String> {
        if let Some(value) = headers.get(axum::http::header::AUTHORIZATION) {
            if let Ok(raw) = value.to_str() {
                if let Some(token) = raw.strip_prefix("Bearer ").or_else(|| raw.strip_prefix("bearer ")) {
                    let token = token.trim();
                    if !token.is_empty() {
                        return Some(token.to_string());
                    }
                }
            }
        }
        cookie_value(headers, &self.cookie_name)
    }

    /// Resolve the caller identity for this request.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        if self.allow_debug_headers {
            if let Some(context) = debug_context(headers) {
                return Ok(context);
            }
        }

        let token = self
            .token_from_headers(headers)
            .ok_or(AuthError::MissingToken)?;

        let payload = self.client.introspect(&token).await?;
        if !payload
            .get("active")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            return Err(AuthError::InvalidToken);
        }

        let mut permissions = normalize_permission_list(
            payload
                .get("permissions")
                .or_else(|| payload.get("perms"))
                .unwrap_or(&Value::Null),
        );
        if permissions.is_empty() {
            permissions = extract_app_permissions(&payload, &self.app_id);
        }
        if permissions.is_empty() {
            permissions = self.directory_permissions(&token, &payload).await?;
        }

        Ok(AuthContext {
            user_id: payload_user_id(&payload),
            user_name: payload_user_name(&payload),
            permissions: PermissionSet::new(permissions),
        })
    }

    /// Directory fallback with a single refresh-and-retry on 401.
    async fn directory_permissions(
        &self,
        user_token: &str,
        payload: &Value,
    ) -> Result<Vec<String>, AuthError> {
        let user_id = match payload_user_id(payload) {
            Some(user_id) => user_id,
            // Without a directory-addressable id there is nothing to look up.
            None => return Ok(Vec::new()),
        };

        let service_token = self.service_tokens.get().await;
        let token = service_token.as_deref().unwrap_or(user_token);

        let data = match self.client.user_roles(&user_id.to_string(), token).await {
            Ok(data) => data,
            Err(IamError::Service { status: 401, .. }) => {
                warn!(%user_id, "directory lookup rejected the service token, retrying once");
                self.service_tokens.invalidate();
                let refreshed = self.service_tokens.get().await;
                let retry_token = refreshed.as_deref().unwrap_or(user_token);
                self.client
                    .user_roles(&user_id.to_string(), retry_token)
                    .await?
            }
            Err(err) => {
                warn!(%user_id, error = %err, "directory roles lookup failed");
                return Err(err.into());
            }
        };

        let permissions = extract_app_permissions(&data, &self.app_id);
        if !permissions.is_empty() {
            return Ok(permissions);
        }
        Ok(normalize_permission_list(
            data.get("permissions")
                .or_else(|| data.get("perms"))
                .unwrap_or(&Value::Null),
        ))
    }
}

fn debug_context(headers: &HeaderMap) -> Option<AuthContext> {
    let user_id = header_value(headers, DEBUG_USER_ID_HEADER);
    let permissions = header_value(headers, DEBUG_PERMISSIONS_HEADER);
    if user_id.is_none() && permissions.is_none() {
        return None;
    }

    let permissions = permissions
        .map(|raw| {
            raw.split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    Some(AuthContext {
        user_id: user_id.and_then(|raw| Uuid::parse_str(raw.trim()).ok()),
        user_name: header_value(headers, DEBUG_USER_NAME_HEADER).unwrap_or_default(),
        permissions: PermissionSet::new(permissions),
    })
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .filter(|value| !value.is_empty())
}

/// Read one cookie out of the `Cookie` header.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers
        .get(axum::http::header::COOKIE)
        .and_then(|value| value.to_str().ok())?;
    raw.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

/// Accepts lists of strings or objects carrying `name`/`permission`/`code`.
pub(crate) fn normalize_permission_list(raw: &Value) -> Vec<String> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };
    items.iter().filter_map(coerce_name).collect()
}

/// Collect permissions from the `applications` section of an IAM payload,
/// keeping only entries for the configured application.
pub(crate) fn extract_app_permissions(payload: &Value, app_id: &str) -> Vec<String> {
    let Some(apps) = payload.get("applications").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut collected: Vec<String> = Vec::new();
    for app in apps {
        let candidate_id = app
            .get("id")
            .or_else(|| app.get("app_id"))
            .or_else(|| app.get("application_id"))
            .or_else(|| app.get("application"))
            .and_then(coerce_name);
        if !app_id.is_empty() && candidate_id.as_deref() != Some(app_id) {
            continue;
        }

        collected.extend(normalize_permission_list(
            app.get("permissions")
                .or_else(|| app.get("perms"))
                .unwrap_or(&Value::Null),
        ));

        // Roles returned by Directory nest their own permission lists.
        if let Some(roles) = app.get("roles").and_then(Value::as_array) {
            for role in roles {
                collected.extend(normalize_permission_list(
                    role.get("permissions")
                        .or_else(|| role.get("perms"))
                        .unwrap_or(&Value::Null),
                ));
            }
        }
    }

    collected.sort();
    collected.dedup();
    collected
}

fn coerce_name(value: &Value) -> Option<String> {
    let raw = match value {
        Value::String(raw) => raw.as_str(),
        Value::Object(map) => map
            .get("name")
            .or_else(|| map.get("permission"))
            .or_else(|| map.get("code"))
            .and_then(Value::as_str)?,
        _ => return None,
    };
    let normalized = raw.trim().to_ascii_lowercase();
    (!normalized.is_empty()).then_some(normalized)
}

fn payload_user_id(payload: &Value) -> Option<Uuid> {
    let raw = payload
        .get("sub")
        .and_then(Value::as_str)
        .or_else(|| {
            payload
                .get("user")
                .and_then(|user| user.get("id"))
                .and_then(Value::as_str)
        })?;
    Uuid::parse_str(raw).ok()
}

fn payload_user_name(payload: &Value) -> String {
    let Some(user) = payload.get("user") else {
        return String::new();
    };
    let first = user
        .get("first_name")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let last = user
        .get("last_name")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let combined = format!("{first} {last}");
    let combined = combined.trim();
    if !combined.is_empty() {
        return combined.to_string();
    }
    user.get("email")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_string_and_object_permission_lists() {
        let raw = json!(["Links.Read_All", { "name": "Exports.Create" }, { "code": "blacklist.read" }, 42]);
        assert_eq!(
            normalize_permission_list(&raw),
            vec!["links.read_all", "exports.create", "blacklist.read"]
        );
    }

    #[test]
    fn app_permissions_filter_on_matching_application() {
        let payload = json!({
            "applications": [
                { "id": "OTHER-APP", "permissions": ["links.create"] },
                {
                    "app_id": "stafflink",
                    "permissions": ["links.read_own"],
                    "roles": [ { "name": "recruiter", "permissions": ["candidates.read_own"] } ]
                },
            ]
        });
        assert_eq!(
            extract_app_permissions(&payload, "stafflink"),
            vec!["candidates.read_own", "links.read_own"]
        );
    }

    #[test]
    fn app_permissions_empty_without_applications_section() {
        assert!(extract_app_permissions(&json!({ "active": true }), "stafflink").is_empty());
    }

    #[test]
    fn user_identity_comes_from_sub_or_user_object() {
        let id = Uuid::new_v4();
        let payload = json!({ "sub": id.to_string() });
        assert_eq!(payload_user_id(&payload), Some(id));

        let payload = json!({ "user": { "id": id.to_string(), "first_name": "Ana", "last_name": "Reyes" } });
        assert_eq!(payload_user_id(&payload), Some(id));
        assert_eq!(payload_user_name(&payload), "Ana Reyes");

        let payload = json!({ "user": { "email": "ana@example.com" } });
        assert_eq!(payload_user_name(&payload), "ana@example.com");
    }

    #[test]
    fn cookie_header_parsing_finds_the_named_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            "theme=dark; stafflink_access_token=tok-123; other=1"
                .parse()
                .expect("header value"),
        );
        assert_eq!(
            cookie_value(&headers, "stafflink_access_token"),
            Some("tok-123".to_string())
        );
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn debug_headers_build_a_context() {
        let mut headers = HeaderMap::new();
        let user_id = Uuid::new_v4();
        headers.insert(
            DEBUG_USER_ID_HEADER,
            user_id.to_string().parse().expect("header value"),
        );
        headers.insert(
            DEBUG_PERMISSIONS_HEADER,
            "links.read_all, exports.create".parse().expect("header value"),
        );

        let context = debug_context(&headers).expect("debug context");
        assert_eq!(context.user_id, Some(user_id));
        assert!(context.has_permission("links.read_all"));
        assert!(context.has_permission("exports.create"));
    }
}
