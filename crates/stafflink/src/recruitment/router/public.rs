//! Unauthenticated intake endpoints driven by a link slug.

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::recruitment::domain::{
    Applicant, ApplicantDocument, Campaign, DocumentKind, RecruitmentLink,
};
use crate::recruitment::services::applicants::{CreateApplicantRequest, UpdateApplicantRequest};
use crate::recruitment::services::Actor;
use crate::recruitment::store::RecruitmentStore;

use super::{request_meta, RecruitmentState};

pub fn public_router<S: RecruitmentStore + 'static>(state: RecruitmentState<S>) -> Router {
    Router::new()
        .route("/public/links/:slug", get(link_detail::<S>))
        .route("/public/applicants", post(create_applicant::<S>))
        .route(
            "/public/applicants/:id",
            get(applicant_detail::<S>).patch(update_applicant::<S>),
        )
        .route("/public/applicants/:id/submit", post(submit_applicant::<S>))
        .route(
            "/public/applicants/:id/documents",
            post(upload_document::<S>),
        )
        .with_state(state)
}

async fn link_detail<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let (link, campaign) = state.links.public_by_slug(&slug)?;
    Ok(Json(public_link_view(&link, &campaign)))
}

#[derive(Debug, Deserialize)]
struct PublicApplicantCreate {
    pub link_slug: String,
    #[serde(flatten)]
    pub applicant: CreateApplicantRequest,
}

async fn create_applicant<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    Json(payload): Json<PublicApplicantCreate>,
) -> Result<impl IntoResponse, ApiError> {
    // Unknown slugs surface as a plain validation error here; only the link
    // detail endpoint conceals with 404.
    let (link, _) = state
        .links
        .public_by_slug(&payload.link_slug)
        .map_err(|_| ApiError::validation("This recruitment link is not available."))?;
    let applicant = state
        .applicants
        .create(&link, payload.applicant, &Actor::public_form())?;
    let documents = state.applicants.documents(applicant.id)?;
    Ok((
        StatusCode::CREATED,
        Json(applicant_view(&applicant, &documents)),
    ))
}

async fn applicant_detail<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let applicant = state.applicants.get(id)?;
    let documents = state.applicants.documents(applicant.id)?;
    Ok(Json(applicant_view(&applicant, &documents)))
}

async fn update_applicant<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateApplicantRequest>,
) -> Result<Json<Value>, ApiError> {
    let applicant = state
        .applicants
        .update(id, payload, &Actor::public_form())?;
    let documents = state.applicants.documents(applicant.id)?;
    Ok(Json(applicant_view(&applicant, &documents)))
}

#[derive(Debug, Deserialize)]
struct SubmitPayload {
    #[serde(default)]
    lpdp_consent: bool,
}

async fn submit_applicant<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<SubmitPayload>,
) -> Result<Json<Value>, ApiError> {
    let meta = request_meta(&headers);
    let applicant = state.applicants.submit(id, payload.lpdp_consent, &meta)?;
    let documents = state.applicants.documents(applicant.id)?;
    Ok(Json(applicant_view(&applicant, &documents)))
}

async fn upload_document<S: RecruitmentStore>(
    State(state): State<RecruitmentState<S>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut kind: Option<DocumentKind> = None;
    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::validation("Malformed multipart payload."))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("kind") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|_| ApiError::validation("Malformed multipart payload."))?;
                kind = Some(
                    serde_json::from_value(Value::String(raw.trim().to_string()))
                        .map_err(|_| ApiError::validation("Unknown document kind."))?,
                );
            }
            Some("file") => {
                let original_name = field
                    .file_name()
                    .unwrap_or("upload.bin")
                    .to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::validation("Malformed multipart payload."))?;
                file = Some((original_name, content_type, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let kind = kind.ok_or_else(|| ApiError::validation("A document kind is required."))?;
    let (original_name, content_type, bytes) =
        file.ok_or_else(|| ApiError::validation("A file is required."))?;

    let document = state.applicants.upload_document(
        id,
        kind,
        &original_name,
        content_type.as_deref(),
        &bytes,
        None,
    )?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": document.id,
            "kind": document.kind,
            "original_name": document.original_name,
        })),
    ))
}

fn public_link_view(link: &RecruitmentLink, campaign: &Campaign) -> Value {
    json!({
        "slug": link.slug,
        "title": link.title,
        "campaign": {
            "code": campaign.code,
            "name": campaign.name,
            "site_name": campaign.site_name,
        },
        "modality": link.modality,
        "employment_condition": link.employment_condition,
        "period_label": link.period_label,
        "rest_day": link.rest_day,
        "work_week": link.work_week,
        "expires_at": link.expires_at,
    })
}

pub(crate) fn applicant_view(applicant: &Applicant, documents: &[ApplicantDocument]) -> Value {
    json!({
        "id": applicant.id,
        "link_id": applicant.link_id,
        "status": applicant.status,
        "first_name": applicant.first_name,
        "last_name": applicant.last_name,
        "second_last_name": applicant.second_last_name,
        "document_type": applicant.document_type,
        "document_number": applicant.document_number,
        "birth_date": applicant.birth_date,
        "email": applicant.email,
        "phone": applicant.phone,
        "alternate_phone": applicant.alternate_phone,
        "modality": applicant.modality,
        "rest_day": applicant.rest_day,
        "lpdp_consent": applicant.lpdp_consent,
        "submitted_at": applicant.submitted_at,
        "documents": documents
            .iter()
            .map(|document| json!({
                "id": document.id,
                "kind": document.kind,
                "original_name": document.original_name,
            }))
            .collect::<Vec<_>>(),
    })
}
