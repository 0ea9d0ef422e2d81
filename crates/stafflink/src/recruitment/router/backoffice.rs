//! Authenticated back-office endpoints: campaigns, links, candidates,
//! the verification queue, export batches, and the blacklist.

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::identity::AuthContext;
use crate::error::ApiError;
use crate::integrations::storage::StorageError;
use crate::recruitment::domain::{LinkStatus, RecruitmentLink};
use crate::recruitment::permissions::RequiredPermissions;
use crate::recruitment::services::applicants::{
    AssignmentUpdateRequest, ChecklistUpdateRequest, CreateApplicantRequest, ProcessUpdateRequest,
    UpdateApplicantRequest,
};
use crate::recruitment::services::blacklist::{CreateBlacklistRequest, UpdateBlacklistRequest};
use crate::recruitment::services::campaigns::{CreateCampaignRequest, UpdateCampaignRequest};
use crate::recruitment::services::exports::CreateBatchRequest;
use crate::recruitment::services::links::{CreateLinkRequest, UpdateLinkRequest};
use crate::recruitment::services::verification::{
    ControlledUpdateRequest, CorrectionRequest, DecisionRequest,
};
use crate::recruitment::store::{ApplicantFilter, RecruitmentStore};

use super::public::applicant_view;
use super::{actor_from, authenticate, authorize, RecruitmentState};

const CAMPAIGNS_READ: RequiredPermissions = RequiredPermissions::all(&["campaigns.read"]);
const CAMPAIGNS_MANAGE: RequiredPermissions = RequiredPermissions::all(&["campaigns.manage"]);
const LINKS_READ: RequiredPermissions =
    RequiredPermissions::any(&["links.read_all", "links.read_own"]);
const LINKS_CREATE: RequiredPermissions = RequiredPermissions::all(&["links.create"]);
const LINKS_UPDATE: RequiredPermissions =
    RequiredPermissions::any(&["links.update_all", "links.update_own"]);
const CANDIDATES_READ: RequiredPermissions =
    RequiredPermissions::any(&["candidates.read_all", "candidates.read_own"]);
const CANDIDATES_MANAGE: RequiredPermissions = RequiredPermissions::all(&["candidates.manage"]);
const CANDIDATES_PROCESS: RequiredPermissions = RequiredPermissions::all(&["candidates.process"]);
const CANDIDATES_CONTRACT: RequiredPermissions =
    RequiredPermissions::all(&["candidates.contract"]);
const VERIFICATION_VIEW: RequiredPermissions = RequiredPermissions::all(&["verification.view"]);
const VERIFICATION_DECIDE: RequiredPermissions =
    RequiredPermissions::all(&["verification.decide"]);
const VERIFICATION_CORRECTION: RequiredPermissions =
    RequiredPermissions::all(&["verification.request_correction"]);
const CANDIDATES_CONTROLLED: RequiredPermissions =
    RequiredPermissions::all(&["candidates.update_controlled"]);
const EXPORTS_READ: RequiredPermissions = RequiredPermissions::all(&["exports.read"]);
const EXPORTS_CREATE: RequiredPermissions = RequiredPermissions::all(&["exports.create"]);
const EXPORTS_DOWNLOAD: RequiredPermissions = RequiredPermissions::all(&["exports.download"]);
const EXPORTS_MARK_DELIVERED: RequiredPermissions =
    RequiredPermissions::all(&["exports.mark_delivered"]);
const BLACKLIST_READ: RequiredPermissions = RequiredPermissions::all(&["blacklist.read"]);
const BLACKLIST_MANAGE: RequiredPermissions = RequiredPermissions::all(&["blacklist.manage"]);

pub fn backoffice_router<S: RecruitmentStore + 'static>(state: RecruitmentState<S>) -> Router {
    Router::new()
        .route(
            "/api/v1/campaigns",
            get(list_campaigns::<S>).post(create_campaign::<S>),
        )
        .route(
            "/api/v1/campaigns/:id",
            get(get_campaign::<S>).patch(update_campaign::<S>),
        )
        .route("/api/v1/links", get(list_links::<S>).post(create_link::<S>))
        .route(
            "/api/v1/links/:id",
            get(get_link::<S>).patch(update_link::<S>),
        )
        .route("/api/v1/links/:id/expire", post(expire_link::<S>))
        .route("/api/v1/links/:id/revoke", post(revoke_link::<S>))
        .route("/api/v1/links/:id/activate", post(activate_link::<S>))
        .route(
            "/api/v1/candidates",
            get(list_candidates::<S>).post(create_candidate::<S>),
        )
        .route(
            "/api/v1/candidates/:id",
            get(get_candidate::<S>).patch(update_candidate::<S>),
        )
        .route(
            "/api/v1/candidates/:id/documents",
            axum::routing::patch(update_candidate_checklist::<S>),
        )
        .route(
            "/api/v1/candidates/:id/process",
            axum::routing::patch(update_candidate_process::<S>),
        )
        .route(
            "/api/v1/candidates/:id/assignment",
            axum::routing::patch(update_candidate_assignment::<S>),
        )
        .route("/api/v1/verification", get(verification_queue::<S>))
        .route(
            "/api/v1/verification/:id",
            get(verification_detail::<S>).patch(controlled_update::<S>),
        )
        .route(
            "/api/v1/verification/:id/decision",
            post(register_decision::<S>),
        )
        .route(
            "/api/v1/verification/:id/request-correction",
            post(request_correction::<S>),
        )
        .route(
            "/api/v1/exports",
            get(list_batches::<S>).post(create_batch::<S>),
        )
        .route("/api/v1/exports/:id", get(get_batch::<S>))
        .route("/api/v1/exports/:id/file", get(download_batch_file::<S>))
        .route(
            "/api/v1/exports/:id/mark-delivered",
            post(mark_delivered::<S>),
        )
        .route(
            "/api/v1/blacklist",
            get(list_blacklist::<S>).post(create_blacklist_entry::<S>),
        )
        .route(
            "/api/v1/blacklist/:id",
            get(get_blacklist_entry::<S>)
                .patch(update_blacklist_entry::<S>)
                .delete(remove_blacklist_entry::<S>),
        )
        .with_state(state)
}

// Campaigns

async fn list_campaigns<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, CAMPAIGNS_READ)?;
    Ok(Json(state.campaigns.list()?))
}

async fn get_campaign<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, CAMPAIGNS_READ)?;
    Ok(Json(state.campaigns.get(id)?))
}

async fn create_campaign<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
    Json(payload): Json<CreateCampaignRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, CAMPAIGNS_MANAGE)?;
    let campaign = state.campaigns.create(payload, &actor_from(&context))?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

async fn update_campaign<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCampaignRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, CAMPAIGNS_MANAGE)?;
    Ok(Json(state.campaigns.update(id, payload, &actor_from(&context))?))
}

// Links

#[derive(Debug, Default, Deserialize)]
struct LinkListQuery {
    campaign_id: Option<Uuid>,
}

async fn list_links<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
    Query(query): Query<LinkListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, LINKS_READ)?;
    let owner_scope = match owner_scope(&context, "links.read_all") {
        Scope::All => None,
        Scope::Own(owner_id) => Some(owner_id),
        Scope::Nothing => return Ok(Json(Vec::<RecruitmentLink>::new())),
    };
    Ok(Json(state.links.list(owner_scope, query.campaign_id)?))
}

async fn get_link<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, LINKS_READ)?;
    let link = state.links.get(id)?;
    conceal_unless_visible(&context, "links.read_all", link.owner_id)?;
    let campaign = state.links.campaign_for(&link)?;
    Ok(Json(link_detail_view(&link, &campaign.name)))
}

async fn create_link<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, LINKS_CREATE)?;
    let link = state.links.create(payload, &actor_from(&context))?;
    Ok((StatusCode::CREATED, Json(link)))
}

async fn update_link<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, LINKS_UPDATE)?;
    let link = state.links.get(id)?;
    if !context.has_permission("links.update_all") {
        require_ownership(&context, link.owner_id)?;
    }
    Ok(Json(state.links.update(id, payload, &actor_from(&context))?))
}

async fn expire_link<S: RecruitmentStore>(
    state: State<RecruitmentState<S>>,
    headers: HeaderMap,
    path: Path<Uuid>,
) -> Result<Json<RecruitmentLink>, ApiError> {
    link_lifecycle_action(state, headers, path, LinkStatus::Expired, "links.expire").await
}

async fn revoke_link<S: RecruitmentStore>(
    state: State<RecruitmentState<S>>,
    headers: HeaderMap,
    path: Path<Uuid>,
) -> Result<Json<RecruitmentLink>, ApiError> {
    link_lifecycle_action(state, headers, path, LinkStatus::Revoked, "links.revoke").await
}

async fn activate_link<S: RecruitmentStore>(
    state: State<RecruitmentState<S>>,
    headers: HeaderMap,
    path: Path<Uuid>,
) -> Result<Json<RecruitmentLink>, ApiError> {
    link_lifecycle_action(state, headers, path, LinkStatus::Active, "links.activate").await
}

async fn link_lifecycle_action<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    status: LinkStatus,
    permission: &str,
) -> Result<Json<RecruitmentLink>, ApiError> {
    let context = authenticate(&state, &headers).await?;
    let link = state.links.get(id)?;
    // A blanket permission allows the action on any link; otherwise the
    // caller needs the `_own` variant and ownership of the link.
    if !context.has_permission(permission) {
        let own_permission = format!("{permission}_own");
        if !context.has_permission(&own_permission) {
            return Err(ApiError::PermissionDenied);
        }
        require_ownership(&context, link.owner_id)?;
    }
    Ok(Json(state.links.set_status(id, status, &actor_from(&context))?))
}

// Candidates

#[derive(Debug, Default, Deserialize)]
struct CandidateListQuery {
    document: Option<String>,
    campaign_id: Option<Uuid>,
    link_id: Option<Uuid>,
}

async fn list_candidates<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
    Query(query): Query<CandidateListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, CANDIDATES_READ)?;
    let owner_id = match owner_scope(&context, "candidates.read_all") {
        Scope::All => None,
        Scope::Own(owner_id) => Some(owner_id),
        Scope::Nothing => return Ok(Json(Vec::new())),
    };
    let filter = ApplicantFilter {
        document_number: query.document.map(|raw| raw.trim().to_uppercase()),
        campaign_id: query.campaign_id,
        link_id: query.link_id,
        owner_id,
    };
    let applicants = state.applicants.list(&filter)?;
    let mut views = Vec::with_capacity(applicants.len());
    for applicant in &applicants {
        let documents = state.applicants.documents(applicant.id)?;
        views.push(applicant_view(applicant, &documents));
    }
    Ok(Json(views))
}

#[derive(Debug, Deserialize)]
struct CandidateCreate {
    link_id: Uuid,
    #[serde(flatten)]
    applicant: CreateApplicantRequest,
}

async fn create_candidate<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
    Json(payload): Json<CandidateCreate>,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, CANDIDATES_MANAGE)?;
    let link = state.links.get(payload.link_id)?;
    let applicant = state
        .applicants
        .create(&link, payload.applicant, &actor_from(&context))?;
    let documents = state.applicants.documents(applicant.id)?;
    Ok((
        StatusCode::CREATED,
        Json(applicant_view(&applicant, &documents)),
    ))
}

async fn get_candidate<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, CANDIDATES_READ)?;
    let applicant = state.applicants.get(id)?;
    if !context.has_permission("candidates.read_all") {
        let link = state.links.get(applicant.link_id)?;
        conceal_unless_visible(&context, "candidates.read_all", link.owner_id)?;
    }
    let actor = actor_from(&context);
    let mut view = applicant_view(&applicant, &state.applicants.documents(applicant.id)?);
    view["checklist"] = json!(state.applicants.checklist(applicant.id)?);
    view["process"] = json!(state.applicants.process(applicant.id, &actor)?);
    view["assignment"] = json!(state.applicants.assignment(applicant.id)?);
    Ok(Json(view))
}

async fn update_candidate<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateApplicantRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, CANDIDATES_MANAGE)?;
    let applicant = state.applicants.update(id, payload, &actor_from(&context))?;
    let documents = state.applicants.documents(applicant.id)?;
    Ok(Json(applicant_view(&applicant, &documents)))
}

async fn update_candidate_checklist<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChecklistUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, CANDIDATES_PROCESS)?;
    Ok(Json(state.applicants.update_checklist(id, payload)?))
}

async fn update_candidate_process<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProcessUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, CANDIDATES_PROCESS)?;
    Ok(Json(state.applicants.update_process(
        id,
        payload,
        &actor_from(&context),
    )?))
}

async fn update_candidate_assignment<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignmentUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, CANDIDATES_CONTRACT)?;
    Ok(Json(state.applicants.update_assignment(id, payload)?))
}

// Verification queue

async fn verification_queue<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, VERIFICATION_VIEW)?;
    Ok(Json(state.verification.queue()?))
}

async fn verification_detail<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, VERIFICATION_VIEW)?;
    Ok(Json(state.verification.entry(id)?))
}

async fn controlled_update<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<ControlledUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, CANDIDATES_CONTROLLED)?;
    state
        .verification
        .controlled_update(id, payload, &actor_from(&context))?;
    Ok(Json(state.verification.entry(id)?))
}

async fn register_decision<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<DecisionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, VERIFICATION_DECIDE)?;
    state
        .verification
        .decide(id, payload, &actor_from(&context))?;
    Ok(Json(state.verification.entry(id)?))
}

async fn request_correction<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<CorrectionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, VERIFICATION_CORRECTION)?;
    state
        .verification
        .request_correction(id, payload, &actor_from(&context))?;
    Ok(Json(state.verification.entry(id)?))
}

// Export batches

async fn list_batches<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, EXPORTS_READ)?;
    Ok(Json(state.exports.list()?))
}

async fn create_batch<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
    Json(payload): Json<CreateBatchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, EXPORTS_CREATE)?;
    let result = state.exports.create_batch(payload, &actor_from(&context))?;
    Ok((
        StatusCode::CREATED,
        Json(batch_detail_view(&result.batch, &result.items)),
    ))
}

async fn get_batch<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, EXPORTS_READ)?;
    let result = state.exports.get_with_items(id)?;
    Ok(Json(batch_detail_view(&result.batch, &result.items)))
}

async fn download_batch_file<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, EXPORTS_DOWNLOAD)?;
    let path = state.exports.file(id)?;
    let bytes = std::fs::read(&path).map_err(StorageError::from)?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "batch.csv".to_string());
    Ok((
        [
            (header::CONTENT_TYPE, mime::TEXT_CSV.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    ))
}

async fn mark_delivered<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, EXPORTS_MARK_DELIVERED)?;
    let batch = state.exports.mark_delivered(id, &actor_from(&context))?;
    let items = state.exports.get_with_items(batch.id)?.items;
    Ok(Json(batch_detail_view(&batch, &items)))
}

// Blacklist

async fn list_blacklist<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, BLACKLIST_READ)?;
    Ok(Json(state.blacklist.list()?))
}

async fn create_blacklist_entry<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
    Json(payload): Json<CreateBlacklistRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, BLACKLIST_MANAGE)?;
    let entry = state.blacklist.create(payload, &actor_from(&context))?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn get_blacklist_entry<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, BLACKLIST_READ)?;
    Ok(Json(state.blacklist.get(id)?))
}

async fn update_blacklist_entry<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBlacklistRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, BLACKLIST_MANAGE)?;
    Ok(Json(state.blacklist.update(id, payload, &actor_from(&context))?))
}

async fn remove_blacklist_entry<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let context = authenticate(&state, &headers).await?;
    authorize(&context, BLACKLIST_MANAGE)?;
    state.blacklist.remove(id, &actor_from(&context))?;
    Ok(StatusCode::NO_CONTENT)
}

// Helpers

enum Scope {
    All,
    Own(Uuid),
    Nothing,
}

fn owner_scope(context: &AuthContext, read_all_permission: &str) -> Scope {
    if context.has_permission(read_all_permission) {
        return Scope::All;
    }
    match context.user_id {
        Some(user_id) => Scope::Own(user_id),
        None => Scope::Nothing,
    }
}

/// Rows the caller cannot see are concealed as not-found.
fn conceal_unless_visible(
    context: &AuthContext,
    read_all_permission: &str,
    owner_id: Uuid,
) -> Result<(), ApiError> {
    if context.has_permission(read_all_permission) || context.user_id == Some(owner_id) {
        Ok(())
    } else {
        Err(ApiError::NotFound)
    }
}

fn require_ownership(context: &AuthContext, owner_id: Uuid) -> Result<(), ApiError> {
    if context.user_id == Some(owner_id) {
        Ok(())
    } else {
        Err(ApiError::PermissionDenied)
    }
}

fn link_detail_view(link: &RecruitmentLink, campaign_name: &str) -> Value {
    let mut view = json!(link);
    view["campaign_name"] = json!(campaign_name);
    view
}

fn batch_detail_view(
    batch: &crate::recruitment::domain::SmartExportBatch,
    items: &[crate::recruitment::domain::SmartExportBatchItem],
) -> Value {
    let mut view = json!(batch);
    view["items"] = json!(items);
    view
}
