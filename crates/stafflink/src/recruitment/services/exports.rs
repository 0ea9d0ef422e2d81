use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::integrations::smart::{batch_file, SmartBatchWriter, SmartFormatter, SmartRow};
use crate::recruitment::domain::{
    ApplicantStatus, AuditEntity, BatchStatus, SmartExportBatch, SmartExportBatchItem,
};
use crate::recruitment::store::{RecruitmentStore, StoreError};

use super::{record_audit, Actor};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBatchRequest {
    pub applicant_ids: Vec<Uuid>,
    #[serde(default)]
    pub notes: String,
}

/// Batch detail returned by the export endpoints.
#[derive(Debug, Clone)]
pub struct BatchWithItems {
    pub batch: SmartExportBatch,
    pub items: Vec<SmartExportBatchItem>,
}

pub struct ExportService<S> {
    store: Arc<S>,
    formatter: SmartFormatter,
    writer: SmartBatchWriter,
}

impl<S: RecruitmentStore> ExportService<S> {
    pub fn new(store: Arc<S>, writer: SmartBatchWriter) -> Self {
        Self {
            store,
            formatter: SmartFormatter,
            writer,
        }
    }

    /// All-or-nothing batch creation: every target must exist and be
    /// verified; the batch row, the file, the items, and the status flips
    /// land together or not at all.
    pub fn create_batch(
        &self,
        request: CreateBatchRequest,
        actor: &Actor,
    ) -> Result<BatchWithItems, ApiError> {
        if request.applicant_ids.is_empty() {
            return Err(ApiError::validation("There are no applicants to export."));
        }

        let mut rows: Vec<SmartRow> = Vec::with_capacity(request.applicant_ids.len());
        for applicant_id in &request.applicant_ids {
            let applicant = self
                .store
                .fetch_applicant(*applicant_id)?
                .ok_or_else(|| ApiError::validation("Some applicants do not exist."))?;
            if applicant.status != ApplicantStatus::VerifiedOk {
                return Err(ApiError::validation(
                    "Only verified applicants can be exported.",
                ));
            }
            let link = self
                .store
                .fetch_link(applicant.link_id)?
                .ok_or(ApiError::NotFound)?;
            let campaign = self
                .store
                .fetch_campaign(link.campaign_id)?
                .ok_or(ApiError::NotFound)?;
            rows.extend(self.formatter.build_rows([(&applicant, &campaign)]));
        }

        let batch_code = generate_batch_code();
        let file_path = self.writer.save_batch(&batch_code, &rows)?;

        let now = Utc::now();
        let batch = SmartExportBatch {
            id: Uuid::new_v4(),
            batch_code: batch_code.clone(),
            status: BatchStatus::Generated,
            generated_by: actor.id,
            generated_by_name: actor.name.clone(),
            generated_at: now,
            file_path,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };

        let (batch, items) = match self
            .store
            .create_export_batch(batch, &request.applicant_ids)
        {
            Ok(result) => result,
            Err(StoreError::Conflict) => {
                return Err(ApiError::validation(
                    "Only verified applicants can be exported.",
                ))
            }
            Err(StoreError::NotFound) => {
                return Err(ApiError::validation("Some applicants do not exist."))
            }
            Err(err) => return Err(err.into()),
        };

        info!(batch_code = %batch.batch_code, count = items.len(), "export batch generated");
        record_audit(
            self.store.as_ref(),
            AuditEntity::Export,
            batch.id,
            "create_batch",
            actor,
            json!({ "batch_code": batch.batch_code, "count": items.len() }),
            None,
        )?;
        Ok(BatchWithItems { batch, items })
    }

    /// Separate delivery confirmation; repeating it keeps the same state.
    pub fn mark_delivered(&self, batch_id: Uuid, actor: &Actor) -> Result<SmartExportBatch, ApiError> {
        let mut batch = self.get(batch_id)?;
        batch.status = BatchStatus::Delivered;
        batch.updated_at = Utc::now();
        self.store.update_export_batch(batch.clone())?;
        record_audit(
            self.store.as_ref(),
            AuditEntity::Export,
            batch.id,
            "mark_delivered",
            actor,
            json!({}),
            None,
        )?;
        Ok(batch)
    }

    pub fn get(&self, batch_id: Uuid) -> Result<SmartExportBatch, ApiError> {
        self.store
            .fetch_export_batch(batch_id)?
            .ok_or(ApiError::NotFound)
    }

    pub fn get_with_items(&self, batch_id: Uuid) -> Result<BatchWithItems, ApiError> {
        let batch = self.get(batch_id)?;
        let items = self.store.list_batch_items(batch.id)?;
        Ok(BatchWithItems { batch, items })
    }

    pub fn list(&self) -> Result<Vec<SmartExportBatch>, ApiError> {
        Ok(self.store.list_export_batches()?)
    }

    /// Path of the generated file for download, if it still exists.
    pub fn file(&self, batch_id: Uuid) -> Result<PathBuf, ApiError> {
        let batch = self.get(batch_id)?;
        batch_file(&batch.file_path).ok_or(ApiError::NotFound)
    }
}

fn generate_batch_code() -> String {
    let raw = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("BATCH-{}", &raw[..8])
}
