use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::config::UploadConfig;
use crate::integrations::smart::SmartBatchWriter;
use crate::integrations::storage::LocalStorage;
use crate::recruitment::domain::{Campaign, DocumentKind, DocumentType, RecruitmentLink};
use crate::recruitment::memory::MemoryStore;
use crate::recruitment::services::applicants::{ApplicantService, CreateApplicantRequest};
use crate::recruitment::services::campaigns::{CampaignService, CreateCampaignRequest};
use crate::recruitment::services::exports::ExportService;
use crate::recruitment::services::links::{CreateLinkRequest, LinkService};
use crate::recruitment::services::verification::VerificationService;
use crate::recruitment::services::Actor;

pub(super) struct Harness {
    pub store: Arc<MemoryStore>,
    pub campaigns: CampaignService<MemoryStore>,
    pub links: LinkService<MemoryStore>,
    pub applicants: ApplicantService<MemoryStore>,
    pub verification: VerificationService<MemoryStore>,
    pub exports: ExportService<MemoryStore>,
    pub actor: Actor,
    // Keeps the upload/export directories alive for the test duration.
    _workdir: tempfile::TempDir,
}

pub(super) fn harness() -> Harness {
    let workdir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(MemoryStore::default());
    let storage = Arc::new(LocalStorage::new(workdir.path().join("uploads")));
    let uploads = UploadConfig {
        max_size_bytes: 1024 * 1024,
        allowed_extensions: vec!["pdf".to_string(), "jpg".to_string(), "png".to_string()],
    };
    let writer = SmartBatchWriter::new(workdir.path().join("exports"));

    Harness {
        campaigns: CampaignService::new(store.clone()),
        links: LinkService::new(store.clone()),
        applicants: ApplicantService::new(store.clone(), storage, uploads),
        verification: VerificationService::new(store.clone()),
        exports: ExportService::new(store.clone(), writer),
        actor: Actor {
            id: Some(Uuid::new_v4()),
            name: "Rosa Perez".to_string(),
        },
        store,
        _workdir: workdir,
    }
}

pub(super) fn campaign(harness: &Harness) -> Campaign {
    harness
        .campaigns
        .create(
            CreateCampaignRequest {
                code: format!("CAMP-{}", Uuid::new_v4().simple()),
                name: "Lima North".to_string(),
                site_name: "Lima".to_string(),
                description: String::new(),
                is_active: true,
            },
            &harness.actor,
        )
        .expect("campaign created")
}

pub(super) fn open_link(harness: &Harness, campaign: &Campaign) -> RecruitmentLink {
    harness
        .links
        .create(
            CreateLinkRequest {
                campaign_id: campaign.id,
                title: "Weekly intake".to_string(),
                slug: None,
                modality: None,
                employment_condition: None,
                period_label: String::new(),
                period_start: None,
                period_end: None,
                rest_day: None,
                work_week: None,
                quota: None,
                expires_at: Utc::now() + Duration::days(7),
                notes: String::new(),
            },
            &harness.actor,
        )
        .expect("link created")
}

pub(super) fn applicant_request(document_number: &str) -> CreateApplicantRequest {
    CreateApplicantRequest {
        first_name: "Maria".to_string(),
        last_name: "Lopez".to_string(),
        second_last_name: "Ramirez".to_string(),
        document_type: DocumentType::Dni,
        document_number: document_number.to_string(),
        birth_date: None,
        email: "maria@example.com".to_string(),
        phone: "999000111".to_string(),
        alternate_phone: String::new(),
        modality: None,
        rest_day: None,
        metadata: None,
    }
}

pub(super) fn upload_required_documents(
    harness: &Harness,
    applicant_id: Uuid,
    kinds: &[DocumentKind],
) {
    for kind in kinds {
        harness
            .applicants
            .upload_document(
                applicant_id,
                *kind,
                &format!("{}.jpg", kind.label()),
                Some("image/jpeg"),
                b"scan",
                None,
            )
            .expect("document uploaded");
    }
}
