//! IAM proxy: HTTP client, service-token cache, request authentication,
//! and the login/logout/session endpoints.

pub mod client;
pub mod identity;
pub mod router;
pub mod service_token;

pub use client::{IamClient, IamError, LoginRequest};
pub use identity::{AuthContext, AuthError, Authenticator};
pub use router::{auth_router, AuthState};
pub use service_token::{ServiceTokenCache, ServiceTokenProvider};
