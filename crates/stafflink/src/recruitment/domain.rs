//! Canonical entities for the recruitment intake domain.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hiring campaign / site owning a group of links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub site_name: String,
    #[serde(default)]
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    Active,
    Expired,
    Revoked,
}

impl LinkStatus {
    pub const fn label(self) -> &'static str {
        match self {
            LinkStatus::Active => "active",
            LinkStatus::Expired => "expired",
            LinkStatus::Revoked => "revoked",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Onsite,
    Hybrid,
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentCondition {
    Payroll,
    Contractor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

/// Shareable, expiring application endpoint scoped to one campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecruitmentLink {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub slug: String,
    pub title: String,
    pub owner_id: Uuid,
    #[serde(default)]
    pub owner_name: String,
    pub status: LinkStatus,
    pub modality: Modality,
    pub employment_condition: EmploymentCondition,
    #[serde(default)]
    pub period_label: String,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub rest_day: Option<Weekday>,
    pub work_week: Option<u8>,
    pub quota: Option<u32>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecruitmentLink {
    /// A link accepts submissions only while active and before its deadline.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.status == LinkStatus::Active && self.expires_at > now
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Dni,
    Ce,
}

impl DocumentType {
    pub const fn label(self) -> &'static str {
        match self {
            DocumentType::Dni => "dni",
            DocumentType::Ce => "ce",
        }
    }

    /// Upload kinds that must be present before an applicant can submit.
    pub const fn required_document_kinds(self) -> &'static [DocumentKind] {
        match self {
            DocumentType::Dni => &[DocumentKind::DniFront, DocumentKind::DniBack],
            DocumentType::Ce => &[DocumentKind::CeFront, DocumentKind::CeBack],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicantStatus {
    Draft,
    Submitted,
    UnderReview,
    VerifiedOk,
    Observed,
    Rejected,
    Exported,
}

impl ApplicantStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicantStatus::Draft => "draft",
            ApplicantStatus::Submitted => "submitted",
            ApplicantStatus::UnderReview => "under_review",
            ApplicantStatus::VerifiedOk => "verified_ok",
            ApplicantStatus::Observed => "observed",
            ApplicantStatus::Rejected => "rejected",
            ApplicantStatus::Exported => "exported",
        }
    }

    /// Applicant data stays editable only in the early stages of the workflow.
    pub const fn is_editable(self) -> bool {
        matches!(self, ApplicantStatus::Draft | ApplicantStatus::Submitted)
    }
}

/// One person's submission against a link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Applicant {
    pub id: Uuid,
    pub link_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub second_last_name: String,
    pub document_type: DocumentType,
    pub document_number: String,
    pub birth_date: Option<NaiveDate>,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub alternate_phone: String,
    pub modality: Modality,
    pub rest_day: Option<Weekday>,
    pub status: ApplicantStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub lpdp_consent: bool,
    pub lpdp_accepted_at: Option<DateTime<Utc>>,
    pub origin_ip: Option<String>,
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Applicant {
    pub fn full_name(&self) -> String {
        let mut name = format!("{} {}", self.first_name, self.last_name);
        if !self.second_last_name.is_empty() {
            name.push(' ');
            name.push_str(&self.second_last_name);
        }
        name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    DniFront,
    DniBack,
    CeFront,
    CeBack,
    Other,
}

impl DocumentKind {
    pub const fn label(self) -> &'static str {
        match self {
            DocumentKind::DniFront => "dni_front",
            DocumentKind::DniBack => "dni_back",
            DocumentKind::CeFront => "ce_front",
            DocumentKind::CeBack => "ce_back",
            DocumentKind::Other => "other",
        }
    }
}

/// File uploaded through the public intake form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantDocument {
    pub id: Uuid,
    pub applicant_id: Uuid,
    pub kind: DocumentKind,
    pub file_path: String,
    pub original_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    #[serde(default)]
    pub checksum: String,
    pub uploaded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Back-office checklist of physically verified papers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChecklist {
    pub applicant_id: Uuid,
    pub identity_front_verified: bool,
    pub identity_back_verified: bool,
    pub address_proof_verified: bool,
    #[serde(default)]
    pub notes: String,
    pub updated_at: DateTime<Utc>,
}

impl DocumentChecklist {
    pub fn new(applicant_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            applicant_id,
            identity_front_verified: false,
            identity_back_verified: false,
            address_proof_verified: false,
            notes: String::new(),
            updated_at: now,
        }
    }
}

/// Hiring-process milestones tracked by the back office.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub applicant_id: Uuid,
    pub interview_at: Option<DateTime<Utc>>,
    pub medical_check_at: Option<DateTime<Utc>>,
    pub training_started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: String,
    pub updated_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

impl ProcessRecord {
    pub fn new(applicant_id: Uuid, updated_by: Option<Uuid>, now: DateTime<Utc>) -> Self {
        Self {
            applicant_id,
            interview_at: None,
            medical_check_at: None,
            training_started_at: None,
            notes: String::new(),
            updated_by,
            updated_at: now,
        }
    }
}

/// Contractual terms assigned to an applicant, seeded from the link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractAssignment {
    pub applicant_id: Uuid,
    pub employment_condition: EmploymentCondition,
    #[serde(default)]
    pub company_name: String,
    pub base_salary: Option<u32>,
    pub variable_bonus: Option<u32>,
    pub mobility_bonus: Option<u32>,
    #[serde(default)]
    pub contract_role: String,
    pub updated_at: DateTime<Utc>,
}

impl ContractAssignment {
    pub fn from_link(applicant_id: Uuid, link: &RecruitmentLink, now: DateTime<Utc>) -> Self {
        Self {
            applicant_id,
            employment_condition: link.employment_condition,
            company_name: String::new(),
            base_salary: None,
            variable_bonus: None,
            mobility_bonus: None,
            contract_role: String::new(),
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Observed,
    Rejected,
}

impl VerificationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Approved => "approved",
            VerificationStatus::Observed => "observed",
            VerificationStatus::Rejected => "rejected",
        }
    }
}

/// Back-office decision record, one per applicant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    pub id: Uuid,
    pub applicant_id: Uuid,
    pub status: VerificationStatus,
    pub reviewed_by: Option<Uuid>,
    #[serde(default)]
    pub reviewed_by_name: String,
    pub decided_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub decision_reason: String,
    pub requested_correction_by: Option<Uuid>,
    pub requested_correction_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Verification {
    pub fn pending(applicant_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            applicant_id,
            status: VerificationStatus::Pending,
            reviewed_by: None,
            reviewed_by_name: String::new(),
            decided_at: None,
            decision_reason: String::new(),
            requested_correction_by: None,
            requested_correction_at: None,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlacklistStatus {
    Active,
    Inactive,
}

/// Denylist entry keyed by national ID number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlacklistEntry {
    pub id: Uuid,
    pub document_number: String,
    pub status: BlacklistStatus,
    #[serde(default)]
    pub reason: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Pending,
    Generated,
    Delivered,
    Failed,
}

impl BatchStatus {
    pub const fn label(self) -> &'static str {
        match self {
            BatchStatus::Pending => "pending",
            BatchStatus::Generated => "generated",
            BatchStatus::Delivered => "delivered",
            BatchStatus::Failed => "failed",
        }
    }
}

/// Batch of verified applicants handed to the Smart payroll system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartExportBatch {
    pub id: Uuid,
    pub batch_code: String,
    pub status: BatchStatus,
    pub generated_by: Option<Uuid>,
    #[serde(default)]
    pub generated_by_name: String,
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchItemStatus {
    Queued,
    Exported,
    Failed,
}

/// Applicant ↔ batch relation with its own export status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartExportBatchItem {
    pub id: Uuid,
    pub batch_id: Uuid,
    pub applicant_id: Uuid,
    pub status: BatchItemStatus,
    pub exported_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error_message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEntity {
    Campaign,
    Link,
    Applicant,
    Verification,
    Export,
    Other,
}

/// Append-only trace of every state-changing action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: Uuid,
    pub entity_type: AuditEntity,
    pub entity_id: Uuid,
    pub action: String,
    pub actor_id: Option<Uuid>,
    #[serde(default)]
    pub actor_name: String,
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn link(status: LinkStatus, expires_in: Duration) -> RecruitmentLink {
        let now = Utc::now();
        RecruitmentLink {
            id: Uuid::new_v4(),
            campaign_id: Uuid::new_v4(),
            slug: "weekly-intake".to_string(),
            title: "Weekly intake".to_string(),
            owner_id: Uuid::new_v4(),
            owner_name: String::new(),
            status,
            modality: Modality::Onsite,
            employment_condition: EmploymentCondition::Payroll,
            period_label: String::new(),
            period_start: None,
            period_end: None,
            rest_day: None,
            work_week: None,
            quota: None,
            expires_at: now + expires_in,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn link_open_requires_active_status_and_future_deadline() {
        let now = Utc::now();
        assert!(link(LinkStatus::Active, Duration::days(1)).is_open(now));
        assert!(!link(LinkStatus::Active, Duration::minutes(-1)).is_open(now));
        assert!(!link(LinkStatus::Expired, Duration::days(1)).is_open(now));
        assert!(!link(LinkStatus::Revoked, Duration::days(1)).is_open(now));
    }

    #[test]
    fn required_documents_follow_document_type() {
        assert_eq!(
            DocumentType::Dni.required_document_kinds(),
            &[DocumentKind::DniFront, DocumentKind::DniBack]
        );
        assert_eq!(
            DocumentType::Ce.required_document_kinds(),
            &[DocumentKind::CeFront, DocumentKind::CeBack]
        );
    }

    #[test]
    fn full_name_skips_empty_second_last_name() {
        let now = Utc::now();
        let applicant = Applicant {
            id: Uuid::new_v4(),
            link_id: Uuid::new_v4(),
            first_name: "MARIA".to_string(),
            last_name: "LOPEZ".to_string(),
            second_last_name: String::new(),
            document_type: DocumentType::Dni,
            document_number: "87654321".to_string(),
            birth_date: None,
            email: "maria@example.com".to_string(),
            phone: "999000111".to_string(),
            alternate_phone: String::new(),
            modality: Modality::Onsite,
            rest_day: None,
            status: ApplicantStatus::Draft,
            submitted_at: None,
            last_reviewed_at: None,
            lpdp_consent: false,
            lpdp_accepted_at: None,
            origin_ip: None,
            user_agent: String::new(),
            metadata: serde_json::Value::Null,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(applicant.full_name(), "MARIA LOPEZ");
    }
}
