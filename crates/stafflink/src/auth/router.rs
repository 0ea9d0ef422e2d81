//! Proxy endpoints forwarding authentication to IAM and managing the
//! HTTP-only access-token cookie.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::{AuthConfig, IamConfig};
use crate::error::ApiError;
use crate::recruitment::permissions::RequiredPermissions;

use super::client::{IamError, LoginRequest};
use super::identity::Authenticator;

const LOGIN_SUCCESS_MESSAGE: &str = "Signed in successfully.";
const DEFAULT_LOGIN_ERROR_MESSAGE: &str = "We could not validate the provided credentials.";
const SERVER_SIDE_LOGIN_ERROR_MESSAGE: &str =
    "The identity service is not available right now. Try again later.";
const SESSION_ALREADY_ACTIVE_MESSAGE: &str =
    "There is an active session in another browser. Press \"Sign in\" again to close it and continue here.";
const LOGOUT_SUCCESS_MESSAGE: &str = "Session closed successfully.";
const TOKEN_REQUIRED_MESSAGE: &str =
    "Send Authorization: Bearer <token> or the authentication cookie to close the session.";

const IAM_USERS: RequiredPermissions = RequiredPermissions::all(&["links.manage_users"]);

const SESSION_DETAIL_KEYS: [&str; 6] = [
    "session_id",
    "application_name",
    "issued_at",
    "last_seen_at",
    "ip_address",
    "user_agent",
];

/// State shared by the auth proxy endpoints.
#[derive(Clone)]
pub struct AuthState {
    pub authenticator: Arc<Authenticator>,
    pub auth: AuthConfig,
    pub iam: IamConfig,
}

pub fn auth_router(state: AuthState) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(session_from_cookie).post(session_from_body))
        .route("/iam/users", get(iam_users))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    username_or_email: String,
    password: String,
    #[serde(default)]
    captcha_token: Option<String>,
    #[serde(default)]
    force: bool,
}

async fn login(State(state): State<AuthState>, Json(payload): Json<LoginPayload>) -> Response {
    let request = LoginRequest {
        username_or_email: payload.username_or_email,
        password: payload.password,
        captcha_token: payload.captcha_token,
        force: payload.force,
        app_id: None,
    };

    let iam_response = match state.authenticator.client().login(&request).await {
        Ok(response) => response,
        Err(err) => return iam_error_response(&err),
    };

    let expires_in = coerce_int(iam_response.get("expires_in"));
    let token = iam_response
        .get("access_token")
        .or_else(|| iam_response.get("token"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let session_detail = extract_session_detail(&iam_response);

    let mut payload = json!({
        "access_token": token.clone(),
        "token_type": iam_response
            .get("token_type")
            .and_then(Value::as_str)
            .unwrap_or("Bearer"),
        "expires_in": expires_in.unwrap_or(0),
        "session_id": session_detail
            .as_ref()
            .and_then(|detail| detail.get("session_id").cloned())
            .or_else(|| iam_response.get("session_id").cloned()),
        "message": LOGIN_SUCCESS_MESSAGE,
    });
    if let Some(detail) = session_detail {
        payload["session"] = detail;
    }

    let mut response = (StatusCode::OK, Json(payload)).into_response();
    if let Some(token) = token {
        set_auth_cookie(&mut response, &state.auth, &token, expires_in);
    }
    response
}

async fn logout(State(state): State<AuthState>, headers: HeaderMap) -> Response {
    let token = match state.authenticator.token_from_headers(&headers) {
        Some(token) => token,
        None => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "TOKEN_REQUIRED",
                    "message": TOKEN_REQUIRED_MESSAGE,
                })),
            )
                .into_response()
        }
    };

    if let Err(err) = state.authenticator.client().logout(&token).await {
        return iam_error_response(&err);
    }

    let mut response = (
        StatusCode::OK,
        Json(json!({ "message": LOGOUT_SUCCESS_MESSAGE })),
    )
        .into_response();
    clear_auth_cookie(&mut response, &state.auth);
    response
}

async fn session_from_cookie(State(state): State<AuthState>, headers: HeaderMap) -> Response {
    let token = match super::identity::cookie_value(&headers, &state.auth.cookie_name) {
        Some(token) => token,
        None => return (StatusCode::OK, Json(json!({ "active": false }))).into_response(),
    };
    introspect_and_respond(&state, &token, true).await
}

#[derive(Debug, Deserialize)]
struct SessionPayload {
    token: String,
}

async fn session_from_body(
    State(state): State<AuthState>,
    Json(payload): Json<SessionPayload>,
) -> Response {
    introspect_and_respond(&state, &payload.token, false).await
}

async fn introspect_and_respond(state: &AuthState, token: &str, clear_cookie: bool) -> Response {
    let payload = match state.authenticator.client().introspect(token).await {
        Ok(payload) => payload,
        Err(err) => return iam_error_response(&err),
    };

    if !payload.get("active").and_then(Value::as_bool).unwrap_or(false) {
        let mut response = (StatusCode::OK, Json(json!({ "active": false }))).into_response();
        if clear_cookie {
            clear_auth_cookie(&mut response, &state.auth);
        }
        return response;
    }
    (StatusCode::OK, Json(payload)).into_response()
}

/// Directory user listing for the recruiter picker, filtered to active
/// accounts and, when resolvable, the configured recruiter role.
async fn iam_users(
    State(state): State<AuthState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let context = state.authenticator.authenticate(&headers).await?;
    if !IAM_USERS.allows(&context.permissions) {
        return Err(ApiError::PermissionDenied);
    }

    let token = match state.authenticator.service_tokens().get().await {
        Some(token) => token,
        None => state
            .authenticator
            .token_from_headers(&headers)
            .ok_or(ApiError::AuthRequired)?,
    };

    let mut params: Vec<(String, String)> = Vec::new();
    for key in ["search", "limit", "offset"] {
        if let Some(value) = query.get(key) {
            params.push((key.to_string(), value.clone()));
        }
    }
    if !state.iam.app_id.is_empty() {
        params.push(("app_id".to_string(), state.iam.app_id.clone()));
    }
    if let Some(role_id) = resolve_recruiter_role(&state, &token).await {
        params.push(("role_id".to_string(), role_id));
    }
    params.push(("status".to_string(), "ACTIVE".to_string()));

    let payload = state
        .authenticator
        .client()
        .list_users(&token, &params)
        .await?;
    Ok(Json(payload))
}

async fn resolve_recruiter_role(state: &AuthState, token: &str) -> Option<String> {
    if state.iam.app_id.is_empty() {
        return None;
    }
    let roles = state
        .authenticator
        .client()
        .list_roles(&state.iam.app_id, token)
        .await
        .ok()?;
    let roles = roles.as_array()?;
    let wanted = state.iam.recruiter_role_name.to_ascii_lowercase();
    roles.iter().find_map(|role| {
        let name = role.get("name").and_then(Value::as_str)?;
        if name.to_ascii_lowercase() == wanted {
            role.get("id").and_then(Value::as_str).map(str::to_string)
        } else {
            None
        }
    })
}

fn iam_error_response(err: &IamError) -> Response {
    let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, Json(format_iam_error(err))).into_response()
}

/// Map upstream error codes onto the user-facing messages the frontend
/// shows verbatim.
fn format_iam_error(err: &IamError) -> Value {
    let detail = err.detail();
    let error_code = detail
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("IAM_SERVICE_ERROR")
        .to_string();

    let message = if error_code == "SESSION_ALREADY_ACTIVE" {
        SESSION_ALREADY_ACTIVE_MESSAGE.to_string()
    } else if let Some(known) = known_login_error(&error_code) {
        known.to_string()
    } else if err.status() >= 500 {
        SERVER_SIDE_LOGIN_ERROR_MESSAGE.to_string()
    } else {
        detail
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_LOGIN_ERROR_MESSAGE)
            .to_string()
    };

    let mut payload = json!({ "error": error_code, "message": message });
    if let Some(session) = normalize_session_detail(detail.get("session")) {
        payload["session"] = session;
    }
    payload
}

fn known_login_error(code: &str) -> Option<&'static str> {
    match code {
        "INVALID_CREDENTIALS" => Some("The username or password does not match."),
        "USER_NOT_FOUND" => Some("The user does not exist or has no access to Stafflink."),
        "PASSWORD_EXPIRED" => Some("Your password expired. Update it in IAM before continuing."),
        "ACCOUNT_LOCKED" => Some("Your account is locked. Contact the support team."),
        _ => None,
    }
}

fn extract_session_detail(source: &Value) -> Option<Value> {
    if let Some(session) = normalize_session_detail(source.get("session")) {
        return Some(session);
    }
    normalize_session_detail(Some(source))
}

fn normalize_session_detail(raw: Option<&Value>) -> Option<Value> {
    let raw = raw?.as_object()?;
    let mut detail = serde_json::Map::new();
    for key in SESSION_DETAIL_KEYS {
        if let Some(value) = raw.get(key) {
            if !value.is_null() {
                detail.insert(key.to_string(), value.clone());
            }
        }
    }
    if detail.is_empty() {
        None
    } else {
        for key in SESSION_DETAIL_KEYS {
            detail.entry(key.to_string()).or_insert(Value::Null);
        }
        Some(Value::Object(detail))
    }
}

fn set_auth_cookie(
    response: &mut Response,
    config: &AuthConfig,
    token: &str,
    max_age: Option<i64>,
) {
    let mut cookie = format!(
        "{}={token}; Path={}; HttpOnly; SameSite=Lax",
        config.cookie_name, config.cookie_path
    );
    if let Some(max_age) = max_age {
        cookie.push_str(&format!("; Max-Age={max_age}"));
    }
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    append_cookie(response, &cookie);
}

fn clear_auth_cookie(response: &mut Response, config: &AuthConfig) {
    let cookie = format!(
        "{}=; Path={}; HttpOnly; SameSite=Lax; Max-Age=0",
        config.cookie_name, config.cookie_path
    );
    append_cookie(response, &cookie);
}

fn append_cookie(response: &mut Response, cookie: &str) {
    if let Ok(value) = HeaderValue::from_str(cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
}


fn coerce_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(number) => number.as_i64(),
        Value::String(raw) => raw.trim().parse().ok(),
        _ => None,
    }
}
