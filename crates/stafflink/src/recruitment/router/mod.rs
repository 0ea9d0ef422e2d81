//! HTTP surface for the recruitment domain: a public intake router and an
//! authenticated back-office router sharing one state.

pub mod backoffice;
pub mod public;

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::auth::identity::{AuthContext, Authenticator};
use crate::config::UploadConfig;
use crate::error::ApiError;
use crate::integrations::smart::SmartBatchWriter;
use crate::integrations::storage::StorageBackend;
use crate::recruitment::permissions::RequiredPermissions;
use crate::recruitment::services::applicants::ApplicantService;
use crate::recruitment::services::blacklist::BlacklistService;
use crate::recruitment::services::campaigns::CampaignService;
use crate::recruitment::services::exports::ExportService;
use crate::recruitment::services::links::LinkService;
use crate::recruitment::services::verification::VerificationService;
use crate::recruitment::services::{Actor, RequestMeta};
use crate::recruitment::store::RecruitmentStore;

pub use backoffice::backoffice_router;
pub use public::public_router;

/// Shared state wiring every recruitment service to the routers.
pub struct RecruitmentState<S> {
    pub campaigns: Arc<CampaignService<S>>,
    pub links: Arc<LinkService<S>>,
    pub applicants: Arc<ApplicantService<S>>,
    pub verification: Arc<VerificationService<S>>,
    pub exports: Arc<ExportService<S>>,
    pub blacklist: Arc<BlacklistService<S>>,
    pub authenticator: Arc<Authenticator>,
}

impl<S> Clone for RecruitmentState<S> {
    fn clone(&self) -> Self {
        Self {
            campaigns: self.campaigns.clone(),
            links: self.links.clone(),
            applicants: self.applicants.clone(),
            verification: self.verification.clone(),
            exports: self.exports.clone(),
            blacklist: self.blacklist.clone(),
            authenticator: self.authenticator.clone(),
        }
    }
}

impl<S: RecruitmentStore + 'static> RecruitmentState<S> {
    pub fn new(
        store: Arc<S>,
        storage: Arc<dyn StorageBackend>,
        uploads: UploadConfig,
        export_writer: SmartBatchWriter,
        authenticator: Arc<Authenticator>,
    ) -> Self {
        Self {
            campaigns: Arc::new(CampaignService::new(store.clone())),
            links: Arc::new(LinkService::new(store.clone())),
            applicants: Arc::new(ApplicantService::new(store.clone(), storage, uploads)),
            verification: Arc::new(VerificationService::new(store.clone())),
            exports: Arc::new(ExportService::new(store.clone(), export_writer)),
            blacklist: Arc::new(BlacklistService::new(store)),
            authenticator,
        }
    }
}

pub(crate) async fn authenticate<S>(
    state: &RecruitmentState<S>,
    headers: &HeaderMap,
) -> Result<AuthContext, ApiError> {
    Ok(state.authenticator.authenticate(headers).await?)
}

pub(crate) fn authorize(
    context: &AuthContext,
    required: RequiredPermissions,
) -> Result<(), ApiError> {
    if required.allows(&context.permissions) {
        Ok(())
    } else {
        Err(ApiError::PermissionDenied)
    }
}

pub(crate) fn actor_from(context: &AuthContext) -> Actor {
    Actor {
        id: context.user_id,
        name: context.user_name.clone(),
    }
}

/// Origin metadata stamped on public submissions.
pub(crate) fn request_meta(headers: &HeaderMap) -> RequestMeta {
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty());
    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    RequestMeta {
        ip_address,
        user_agent,
    }
}
