use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::recruitment::domain::{
    Applicant, ApplicantStatus, AuditEntity, Verification, VerificationStatus,
};
use crate::recruitment::store::RecruitmentStore;

use super::{record_audit, uppercase, Actor};

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionRequest {
    pub status: VerificationStatus,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorrectionRequest {
    pub message: String,
}

/// Narrow allow-list applied by the controlled back-office update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ControlledUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub second_last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub alternate_phone: Option<String>,
}

/// Queue entry enriched with link/campaign context for the review screen.
#[derive(Debug, Clone, Serialize)]
pub struct QueueEntry {
    pub applicant: Applicant,
    pub verification: Option<Verification>,
    pub link_title: String,
    pub campaign_name: String,
}

pub struct VerificationService<S> {
    store: Arc<S>,
}

impl<S: RecruitmentStore> VerificationService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Applicants in submitted/under_review, oldest submission first.
    pub fn queue(&self) -> Result<Vec<QueueEntry>, ApiError> {
        let applicants = self.store.verification_queue()?;
        let mut entries = Vec::with_capacity(applicants.len());
        for applicant in applicants {
            let verification = self.store.fetch_verification(applicant.id)?;
            let link = self.store.fetch_link(applicant.link_id)?;
            let campaign = match &link {
                Some(link) => self.store.fetch_campaign(link.campaign_id)?,
                None => None,
            };
            entries.push(QueueEntry {
                verification,
                link_title: link.map(|link| link.title).unwrap_or_default(),
                campaign_name: campaign.map(|campaign| campaign.name).unwrap_or_default(),
                applicant,
            });
        }
        Ok(entries)
    }

    pub fn entry(&self, applicant_id: Uuid) -> Result<QueueEntry, ApiError> {
        let applicant = self
            .store
            .fetch_applicant(applicant_id)?
            .ok_or(ApiError::NotFound)?;
        let verification = self.store.fetch_verification(applicant.id)?;
        let link = self.store.fetch_link(applicant.link_id)?;
        let campaign = match &link {
            Some(link) => self.store.fetch_campaign(link.campaign_id)?,
            None => None,
        };
        Ok(QueueEntry {
            verification,
            link_title: link.map(|link| link.title).unwrap_or_default(),
            campaign_name: campaign.map(|campaign| campaign.name).unwrap_or_default(),
            applicant,
        })
    }

    /// Register the reviewer decision and map it onto the applicant status.
    pub fn decide(
        &self,
        applicant_id: Uuid,
        request: DecisionRequest,
        actor: &Actor,
    ) -> Result<Applicant, ApiError> {
        let mut applicant = self
            .store
            .fetch_applicant(applicant_id)?
            .ok_or(ApiError::NotFound)?;

        let now = Utc::now();
        let mut verification = self.store.ensure_verification(applicant.id)?;
        verification.status = request.status;
        verification.reviewed_by = actor.id;
        verification.reviewed_by_name = actor.name.clone();
        verification.decision_reason = request.reason.clone();
        verification.decided_at = Some(now);
        verification.updated_at = now;
        self.store.save_verification(verification.clone())?;

        applicant.status = match request.status {
            VerificationStatus::Approved => ApplicantStatus::VerifiedOk,
            VerificationStatus::Observed => ApplicantStatus::Observed,
            _ => ApplicantStatus::Rejected,
        };
        applicant.last_reviewed_at = Some(now);
        applicant.updated_at = now;
        self.store.update_applicant(applicant.clone())?;

        record_audit(
            self.store.as_ref(),
            AuditEntity::Verification,
            verification.id,
            "decision",
            actor,
            json!({ "status": request.status.label(), "reason": request.reason }),
            None,
        )?;
        Ok(applicant)
    }

    /// Force the observed state on both records, outside the decision map.
    pub fn request_correction(
        &self,
        applicant_id: Uuid,
        request: CorrectionRequest,
        actor: &Actor,
    ) -> Result<Applicant, ApiError> {
        let mut applicant = self
            .store
            .fetch_applicant(applicant_id)?
            .ok_or(ApiError::NotFound)?;

        let now = Utc::now();
        let mut verification = self.store.ensure_verification(applicant.id)?;
        verification.status = VerificationStatus::Observed;
        verification.requested_correction_by = actor.id;
        verification.requested_correction_at = Some(now);
        verification.decision_reason = request.message.clone();
        verification.updated_at = now;
        self.store.save_verification(verification.clone())?;

        applicant.status = ApplicantStatus::Observed;
        applicant.updated_at = now;
        self.store.update_applicant(applicant.clone())?;

        record_audit(
            self.store.as_ref(),
            AuditEntity::Verification,
            verification.id,
            "request_correction",
            actor,
            json!({ "message": request.message }),
            None,
        )?;
        Ok(applicant)
    }

    /// Field-level correction restricted to contact data. Fields outside the
    /// allow-list never reach this type; an empty patch is a no-op.
    pub fn controlled_update(
        &self,
        applicant_id: Uuid,
        request: ControlledUpdateRequest,
        actor: &Actor,
    ) -> Result<Applicant, ApiError> {
        let mut applicant = self
            .store
            .fetch_applicant(applicant_id)?
            .ok_or(ApiError::NotFound)?;

        let mut modified = serde_json::Map::new();
        if let Some(first_name) = request.first_name {
            applicant.first_name = uppercase(&first_name);
            modified.insert("first_name".to_string(), json!(applicant.first_name));
        }
        if let Some(last_name) = request.last_name {
            applicant.last_name = uppercase(&last_name);
            modified.insert("last_name".to_string(), json!(applicant.last_name));
        }
        if let Some(second_last_name) = request.second_last_name {
            applicant.second_last_name = uppercase(&second_last_name);
            modified.insert(
                "second_last_name".to_string(),
                json!(applicant.second_last_name),
            );
        }
        if let Some(email) = request.email {
            applicant.email = email.trim().to_string();
            modified.insert("email".to_string(), json!(applicant.email));
        }
        if let Some(phone) = request.phone {
            applicant.phone = phone.trim().to_string();
            modified.insert("phone".to_string(), json!(applicant.phone));
        }
        if let Some(alternate_phone) = request.alternate_phone {
            applicant.alternate_phone = alternate_phone.trim().to_string();
            modified.insert(
                "alternate_phone".to_string(),
                json!(applicant.alternate_phone),
            );
        }

        if modified.is_empty() {
            return Ok(applicant);
        }

        applicant.updated_at = Utc::now();
        self.store.update_applicant(applicant.clone())?;
        record_audit(
            self.store.as_ref(),
            AuditEntity::Applicant,
            applicant.id,
            "bo_update",
            actor,
            serde_json::Value::Object(modified),
            None,
        )?;
        Ok(applicant)
    }
}
