use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::config::UploadConfig;
use crate::error::ApiError;
use crate::integrations::storage::StorageBackend;
use crate::recruitment::domain::{
    Applicant, ApplicantDocument, ApplicantStatus, AuditEntity, ContractAssignment,
    DocumentChecklist, DocumentKind, DocumentType, Modality, ProcessRecord, RecruitmentLink,
    Weekday,
};
use crate::recruitment::store::{
    ApplicantFilter, RecruitmentStore, StoreError, BLACKLIST_CHECKED_TYPES,
};
use crate::recruitment::validators::{validate_document, validate_upload};

use super::{record_audit, uppercase, Actor, RequestMeta};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateApplicantRequest {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub second_last_name: String,
    pub document_type: DocumentType,
    pub document_number: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub alternate_phone: String,
    #[serde(default)]
    pub modality: Option<Modality>,
    #[serde(default)]
    pub rest_day: Option<Weekday>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateApplicantRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub second_last_name: Option<String>,
    pub document_type: Option<DocumentType>,
    pub document_number: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub alternate_phone: Option<String>,
    pub modality: Option<Modality>,
    pub rest_day: Option<Weekday>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChecklistUpdateRequest {
    pub identity_front_verified: Option<bool>,
    pub identity_back_verified: Option<bool>,
    pub address_proof_verified: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessUpdateRequest {
    pub interview_at: Option<DateTime<Utc>>,
    pub medical_check_at: Option<DateTime<Utc>>,
    pub training_started_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignmentUpdateRequest {
    pub company_name: Option<String>,
    pub base_salary: Option<u32>,
    pub variable_bonus: Option<u32>,
    pub mobility_bonus: Option<u32>,
    pub contract_role: Option<String>,
}

/// Intake, edits, uploads, and submission for applicants.
pub struct ApplicantService<S> {
    store: Arc<S>,
    storage: Arc<dyn StorageBackend>,
    uploads: UploadConfig,
}

impl<S: RecruitmentStore> ApplicantService<S> {
    pub fn new(store: Arc<S>, storage: Arc<dyn StorageBackend>, uploads: UploadConfig) -> Self {
        Self {
            store,
            storage,
            uploads,
        }
    }

    /// Create a draft against an open link. The applicant and its three
    /// dependent records land atomically; a store conflict surfaces as the
    /// domain duplicate-application error.
    pub fn create(
        &self,
        link: &RecruitmentLink,
        request: CreateApplicantRequest,
        actor: &Actor,
    ) -> Result<Applicant, ApiError> {
        if !link.is_open(Utc::now()) {
            return Err(ApiError::validation("This recruitment link is not available."));
        }

        let document_number = validate_document(request.document_type, &request.document_number)?;
        self.ensure_not_blacklisted(request.document_type, &document_number)?;

        let now = Utc::now();
        let applicant = Applicant {
            id: Uuid::new_v4(),
            link_id: link.id,
            first_name: uppercase(&request.first_name),
            last_name: uppercase(&request.last_name),
            second_last_name: uppercase(&request.second_last_name),
            document_type: request.document_type,
            document_number,
            birth_date: request.birth_date,
            email: request.email.trim().to_string(),
            phone: request.phone.trim().to_string(),
            alternate_phone: request.alternate_phone.trim().to_string(),
            modality: request.modality.unwrap_or(link.modality),
            rest_day: request.rest_day.or(link.rest_day),
            status: ApplicantStatus::Draft,
            submitted_at: None,
            last_reviewed_at: None,
            lpdp_consent: false,
            lpdp_accepted_at: None,
            origin_ip: None,
            user_agent: String::new(),
            metadata: request.metadata.unwrap_or_else(|| json!({})),
            created_at: now,
            updated_at: now,
        };

        let checklist = DocumentChecklist::new(applicant.id, now);
        let process = ProcessRecord::new(applicant.id, actor.id, now);
        let assignment = ContractAssignment::from_link(applicant.id, link, now);

        let applicant = match self
            .store
            .insert_applicant(applicant, checklist, process, assignment)
        {
            Ok(applicant) => applicant,
            Err(StoreError::Conflict) => {
                return Err(ApiError::validation(
                    "An application with this document already exists for this link.",
                ))
            }
            Err(err) => return Err(err.into()),
        };

        record_audit(
            self.store.as_ref(),
            AuditEntity::Applicant,
            applicant.id,
            "create",
            actor,
            json!({ "link_id": applicant.link_id }),
            None,
        )?;
        Ok(applicant)
    }

    /// Edits are limited to early-stage applicants; a changed document
    /// number is re-validated and re-checked against the blacklist.
    pub fn update(
        &self,
        id: Uuid,
        request: UpdateApplicantRequest,
        actor: &Actor,
    ) -> Result<Applicant, ApiError> {
        let mut applicant = self.get(id)?;
        if !applicant.status.is_editable() {
            return Err(ApiError::validation(
                "The applicant can no longer be edited in this status.",
            ));
        }

        if let Some(document_type) = request.document_type {
            applicant.document_type = document_type;
        }
        if let Some(raw_number) = &request.document_number {
            let document_number = validate_document(applicant.document_type, raw_number)?;
            self.ensure_not_blacklisted(applicant.document_type, &document_number)?;
            applicant.document_number = document_number;
        }
        if let Some(first_name) = request.first_name {
            applicant.first_name = uppercase(&first_name);
        }
        if let Some(last_name) = request.last_name {
            applicant.last_name = uppercase(&last_name);
        }
        if let Some(second_last_name) = request.second_last_name {
            applicant.second_last_name = uppercase(&second_last_name);
        }
        if request.birth_date.is_some() {
            applicant.birth_date = request.birth_date;
        }
        if let Some(email) = request.email {
            applicant.email = email.trim().to_string();
        }
        if let Some(phone) = request.phone {
            applicant.phone = phone.trim().to_string();
        }
        if let Some(alternate_phone) = request.alternate_phone {
            applicant.alternate_phone = alternate_phone.trim().to_string();
        }
        if let Some(modality) = request.modality {
            applicant.modality = modality;
        }
        if request.rest_day.is_some() {
            applicant.rest_day = request.rest_day;
        }
        if let Some(metadata) = request.metadata {
            applicant.metadata = metadata;
        }
        applicant.updated_at = Utc::now();
        self.store.update_applicant(applicant.clone())?;
        record_audit(
            self.store.as_ref(),
            AuditEntity::Applicant,
            applicant.id,
            "update",
            actor,
            json!({}),
            None,
        )?;
        Ok(applicant)
    }

    /// Store an uploaded file and record it against the applicant.
    pub fn upload_document(
        &self,
        applicant_id: Uuid,
        kind: DocumentKind,
        original_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
        uploaded_by: Option<Uuid>,
    ) -> Result<ApplicantDocument, ApiError> {
        let applicant = self.get(applicant_id)?;
        validate_upload(&self.uploads, original_name, bytes.len() as u64)?;

        let content_type = content_type
            .filter(|value| !value.is_empty())
            .unwrap_or(mime::APPLICATION_OCTET_STREAM.as_ref())
            .to_string();
        let destination = format!(
            "{}/{}-{}-{}",
            applicant.id,
            kind.label(),
            Utc::now().timestamp(),
            original_name
        );
        let file_path = self.storage.save(bytes, &destination, &content_type)?;

        let document = ApplicantDocument {
            id: Uuid::new_v4(),
            applicant_id: applicant.id,
            kind,
            file_path,
            original_name: original_name.to_string(),
            content_type,
            size_bytes: bytes.len() as u64,
            checksum: String::new(),
            uploaded_by,
            created_at: Utc::now(),
        };
        Ok(self.store.insert_document(document)?)
    }

    /// Finalize a submission: consent plus the full required document set,
    /// then the status flip and the idempotent Verification creation.
    pub fn submit(
        &self,
        id: Uuid,
        lpdp_consent: bool,
        meta: &RequestMeta,
    ) -> Result<Applicant, ApiError> {
        let mut applicant = self.get(id)?;
        if !lpdp_consent {
            return Err(ApiError::validation("LPDP consent must be accepted."));
        }

        let uploaded: Vec<DocumentKind> = self
            .store
            .list_documents(applicant.id)?
            .iter()
            .map(|document| document.kind)
            .collect();
        let missing = applicant
            .document_type
            .required_document_kinds()
            .iter()
            .any(|required| !uploaded.contains(required));
        if missing {
            return Err(ApiError::validation("Required documents are missing."));
        }

        let now = Utc::now();
        applicant.status = ApplicantStatus::Submitted;
        applicant.lpdp_consent = true;
        applicant.lpdp_accepted_at = Some(now);
        applicant.submitted_at = Some(now);
        applicant.origin_ip = meta.ip_address.clone();
        applicant.user_agent = meta.user_agent.clone().unwrap_or_default();
        applicant.updated_at = now;
        self.store.update_applicant(applicant.clone())?;

        self.store.ensure_verification(applicant.id)?;
        info!(applicant_id = %applicant.id, link_id = %applicant.link_id, "applicant submitted");
        record_audit(
            self.store.as_ref(),
            AuditEntity::Applicant,
            applicant.id,
            "submit",
            &Actor::public_form(),
            json!({ "link_id": applicant.link_id }),
            Some(meta),
        )?;
        Ok(applicant)
    }

    pub fn get(&self, id: Uuid) -> Result<Applicant, ApiError> {
        self.store.fetch_applicant(id)?.ok_or(ApiError::NotFound)
    }

    pub fn list(&self, filter: &ApplicantFilter) -> Result<Vec<Applicant>, ApiError> {
        Ok(self.store.list_applicants(filter)?)
    }

    pub fn documents(&self, applicant_id: Uuid) -> Result<Vec<ApplicantDocument>, ApiError> {
        Ok(self.store.list_documents(applicant_id)?)
    }

    pub fn checklist(&self, applicant_id: Uuid) -> Result<DocumentChecklist, ApiError> {
        Ok(self.store.document_checklist(applicant_id)?)
    }

    pub fn update_checklist(
        &self,
        applicant_id: Uuid,
        request: ChecklistUpdateRequest,
    ) -> Result<DocumentChecklist, ApiError> {
        let mut checklist = self.store.document_checklist(applicant_id)?;
        if let Some(value) = request.identity_front_verified {
            checklist.identity_front_verified = value;
        }
        if let Some(value) = request.identity_back_verified {
            checklist.identity_back_verified = value;
        }
        if let Some(value) = request.address_proof_verified {
            checklist.address_proof_verified = value;
        }
        if let Some(notes) = request.notes {
            checklist.notes = notes;
        }
        checklist.updated_at = Utc::now();
        self.store.save_document_checklist(checklist.clone())?;
        Ok(checklist)
    }

    pub fn process(&self, applicant_id: Uuid, actor: &Actor) -> Result<ProcessRecord, ApiError> {
        Ok(self.store.process_record(applicant_id, actor.id)?)
    }

    pub fn update_process(
        &self,
        applicant_id: Uuid,
        request: ProcessUpdateRequest,
        actor: &Actor,
    ) -> Result<ProcessRecord, ApiError> {
        let mut process = self.store.process_record(applicant_id, actor.id)?;
        if request.interview_at.is_some() {
            process.interview_at = request.interview_at;
        }
        if request.medical_check_at.is_some() {
            process.medical_check_at = request.medical_check_at;
        }
        if request.training_started_at.is_some() {
            process.training_started_at = request.training_started_at;
        }
        if let Some(notes) = request.notes {
            process.notes = notes;
        }
        process.updated_by = actor.id;
        process.updated_at = Utc::now();
        self.store.save_process_record(process.clone())?;
        Ok(process)
    }

    pub fn assignment(&self, applicant_id: Uuid) -> Result<ContractAssignment, ApiError> {
        Ok(self.store.contract_assignment(applicant_id)?)
    }

    pub fn update_assignment(
        &self,
        applicant_id: Uuid,
        request: AssignmentUpdateRequest,
    ) -> Result<ContractAssignment, ApiError> {
        let mut assignment = self.store.contract_assignment(applicant_id)?;
        if let Some(company_name) = request.company_name {
            assignment.company_name = company_name;
        }
        if request.base_salary.is_some() {
            assignment.base_salary = request.base_salary;
        }
        if request.variable_bonus.is_some() {
            assignment.variable_bonus = request.variable_bonus;
        }
        if request.mobility_bonus.is_some() {
            assignment.mobility_bonus = request.mobility_bonus;
        }
        if let Some(contract_role) = request.contract_role {
            assignment.contract_role = contract_role;
        }
        assignment.updated_at = Utc::now();
        self.store.save_contract_assignment(assignment.clone())?;
        Ok(assignment)
    }

    fn ensure_not_blacklisted(
        &self,
        document_type: DocumentType,
        document_number: &str,
    ) -> Result<(), ApiError> {
        if !BLACKLIST_CHECKED_TYPES.contains(&document_type) {
            return Ok(());
        }
        if self.store.is_blacklisted(document_number)? {
            return Err(ApiError::Validation {
                message: "The document is blacklisted.".to_string(),
                field: Some("document_number"),
            });
        }
        Ok(())
    }
}
