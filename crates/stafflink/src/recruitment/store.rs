//! Storage abstraction so services and routers can be exercised in isolation.

use uuid::Uuid;

use super::domain::{
    Applicant, ApplicantDocument, ApplicantStatus, AuditRecord, BlacklistEntry, Campaign,
    ContractAssignment, DocumentChecklist, DocumentType, ProcessRecord, RecruitmentLink,
    SmartExportBatch, SmartExportBatchItem, Verification,
};

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Filters accepted by the link listing.
#[derive(Debug, Clone, Default)]
pub struct LinkFilter {
    pub owner_id: Option<Uuid>,
    pub campaign_id: Option<Uuid>,
}

/// Filters accepted by the applicant listing.
#[derive(Debug, Clone, Default)]
pub struct ApplicantFilter {
    pub document_number: Option<String>,
    pub campaign_id: Option<Uuid>,
    pub link_id: Option<Uuid>,
    /// Restrict to applicants whose parent link belongs to this recruiter.
    pub owner_id: Option<Uuid>,
}

/// Relational backing for the recruitment domain.
///
/// Multi-row writes (`insert_applicant`, `create_export_batch`) must be
/// atomic: either every row lands or none does. Uniqueness violations
/// surface as [`StoreError::Conflict`] so callers can translate them into
/// domain errors instead of leaking raw constraint failures.
pub trait RecruitmentStore: Send + Sync {
    // Campaigns. `insert_campaign` enforces the unique campaign code.
    fn insert_campaign(&self, campaign: Campaign) -> Result<Campaign, StoreError>;
    fn update_campaign(&self, campaign: Campaign) -> Result<(), StoreError>;
    fn fetch_campaign(&self, id: Uuid) -> Result<Option<Campaign>, StoreError>;
    fn list_campaigns(&self) -> Result<Vec<Campaign>, StoreError>;

    // Links. `insert_link` enforces the unique public slug.
    fn insert_link(&self, link: RecruitmentLink) -> Result<RecruitmentLink, StoreError>;
    fn update_link(&self, link: RecruitmentLink) -> Result<(), StoreError>;
    fn fetch_link(&self, id: Uuid) -> Result<Option<RecruitmentLink>, StoreError>;
    fn fetch_link_by_slug(&self, slug: &str) -> Result<Option<RecruitmentLink>, StoreError>;
    fn list_links(&self, filter: &LinkFilter) -> Result<Vec<RecruitmentLink>, StoreError>;

    /// Insert an applicant together with its three 1:1 sub-records.
    /// Enforces the (link, document type, document number) uniqueness rule.
    fn insert_applicant(
        &self,
        applicant: Applicant,
        checklist: DocumentChecklist,
        process: ProcessRecord,
        assignment: ContractAssignment,
    ) -> Result<Applicant, StoreError>;
    fn update_applicant(&self, applicant: Applicant) -> Result<(), StoreError>;
    fn fetch_applicant(&self, id: Uuid) -> Result<Option<Applicant>, StoreError>;
    fn list_applicants(&self, filter: &ApplicantFilter) -> Result<Vec<Applicant>, StoreError>;
    /// Applicants awaiting back-office review, oldest submission first.
    fn verification_queue(&self) -> Result<Vec<Applicant>, StoreError>;

    fn insert_document(&self, document: ApplicantDocument) -> Result<ApplicantDocument, StoreError>;
    fn list_documents(&self, applicant_id: Uuid) -> Result<Vec<ApplicantDocument>, StoreError>;

    // 1:1 sub-records, lazily created on first access.
    fn document_checklist(&self, applicant_id: Uuid) -> Result<DocumentChecklist, StoreError>;
    fn save_document_checklist(&self, checklist: DocumentChecklist) -> Result<(), StoreError>;
    fn process_record(
        &self,
        applicant_id: Uuid,
        actor_id: Option<Uuid>,
    ) -> Result<ProcessRecord, StoreError>;
    fn save_process_record(&self, process: ProcessRecord) -> Result<(), StoreError>;
    fn contract_assignment(&self, applicant_id: Uuid) -> Result<ContractAssignment, StoreError>;
    fn save_contract_assignment(&self, assignment: ContractAssignment) -> Result<(), StoreError>;

    /// Get or create the decision record for an applicant. Idempotent.
    fn ensure_verification(&self, applicant_id: Uuid) -> Result<Verification, StoreError>;
    fn fetch_verification(&self, applicant_id: Uuid) -> Result<Option<Verification>, StoreError>;
    fn save_verification(&self, verification: Verification) -> Result<(), StoreError>;

    // Blacklist. `insert_blacklist_entry` enforces the unique document number.
    fn insert_blacklist_entry(&self, entry: BlacklistEntry) -> Result<BlacklistEntry, StoreError>;
    fn update_blacklist_entry(&self, entry: BlacklistEntry) -> Result<(), StoreError>;
    fn remove_blacklist_entry(&self, id: Uuid) -> Result<(), StoreError>;
    fn fetch_blacklist_entry(&self, id: Uuid) -> Result<Option<BlacklistEntry>, StoreError>;
    fn list_blacklist(&self) -> Result<Vec<BlacklistEntry>, StoreError>;
    /// True when an active entry matches the (normalized) document number.
    fn is_blacklisted(&self, document_number: &str) -> Result<bool, StoreError>;

    /// Persist a batch, its items, and the per-applicant status flips in one
    /// atomic step. Fails wholesale when any target applicant is missing or
    /// not in `verified_ok`.
    fn create_export_batch(
        &self,
        batch: SmartExportBatch,
        applicant_ids: &[Uuid],
    ) -> Result<(SmartExportBatch, Vec<SmartExportBatchItem>), StoreError>;
    fn update_export_batch(&self, batch: SmartExportBatch) -> Result<(), StoreError>;
    fn fetch_export_batch(&self, id: Uuid) -> Result<Option<SmartExportBatch>, StoreError>;
    fn list_export_batches(&self) -> Result<Vec<SmartExportBatch>, StoreError>;
    fn list_batch_items(&self, batch_id: Uuid) -> Result<Vec<SmartExportBatchItem>, StoreError>;

    fn append_audit(&self, record: AuditRecord) -> Result<(), StoreError>;
    fn audit_trail(
        &self,
        entity_type: super::domain::AuditEntity,
        entity_id: Uuid,
    ) -> Result<Vec<AuditRecord>, StoreError>;
}

/// Convenience used by listings that scope to a recruiter's own rows.
pub fn applicant_matches(
    applicant: &Applicant,
    link: &RecruitmentLink,
    filter: &ApplicantFilter,
) -> bool {
    if let Some(number) = &filter.document_number {
        if !applicant.document_number.eq_ignore_ascii_case(number.trim()) {
            return false;
        }
    }
    if let Some(campaign_id) = filter.campaign_id {
        if link.campaign_id != campaign_id {
            return false;
        }
    }
    if let Some(link_id) = filter.link_id {
        if applicant.link_id != link_id {
            return false;
        }
    }
    if let Some(owner_id) = filter.owner_id {
        if link.owner_id != owner_id {
            return false;
        }
    }
    true
}

/// Statuses that place an applicant in the verification queue.
pub const QUEUE_STATUSES: [ApplicantStatus; 2] =
    [ApplicantStatus::Submitted, ApplicantStatus::UnderReview];

/// Document types subject to the blacklist check.
pub const BLACKLIST_CHECKED_TYPES: [DocumentType; 1] = [DocumentType::Dni];
