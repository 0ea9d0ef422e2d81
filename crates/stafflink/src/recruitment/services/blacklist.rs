use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::recruitment::domain::{AuditEntity, BlacklistEntry, BlacklistStatus};
use crate::recruitment::store::{RecruitmentStore, StoreError};

use super::{record_audit, uppercase, Actor};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBlacklistRequest {
    pub document_number: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBlacklistRequest {
    pub status: Option<BlacklistStatus>,
    pub reason: Option<String>,
}

pub struct BlacklistService<S> {
    store: Arc<S>,
}

impl<S: RecruitmentStore> BlacklistService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn create(
        &self,
        request: CreateBlacklistRequest,
        actor: &Actor,
    ) -> Result<BlacklistEntry, ApiError> {
        let now = Utc::now();
        let entry = BlacklistEntry {
            id: Uuid::new_v4(),
            document_number: uppercase(&request.document_number),
            status: BlacklistStatus::Active,
            reason: request.reason,
            created_by: actor.id,
            created_at: now,
            updated_at: now,
        };
        let entry = match self.store.insert_blacklist_entry(entry) {
            Ok(entry) => entry,
            Err(StoreError::Conflict) => {
                return Err(ApiError::validation("The document is already blacklisted."))
            }
            Err(err) => return Err(err.into()),
        };
        record_audit(
            self.store.as_ref(),
            AuditEntity::Other,
            entry.id,
            "blacklist_create",
            actor,
            json!({ "document_number": entry.document_number }),
            None,
        )?;
        Ok(entry)
    }

    pub fn update(
        &self,
        id: Uuid,
        request: UpdateBlacklistRequest,
        actor: &Actor,
    ) -> Result<BlacklistEntry, ApiError> {
        let mut entry = self.get(id)?;
        if let Some(status) = request.status {
            entry.status = status;
        }
        if let Some(reason) = request.reason {
            entry.reason = reason;
        }
        entry.updated_at = Utc::now();
        self.store.update_blacklist_entry(entry.clone())?;
        record_audit(
            self.store.as_ref(),
            AuditEntity::Other,
            entry.id,
            "blacklist_update",
            actor,
            json!({}),
            None,
        )?;
        Ok(entry)
    }

    pub fn remove(&self, id: Uuid, actor: &Actor) -> Result<(), ApiError> {
        self.store.remove_blacklist_entry(id)?;
        record_audit(
            self.store.as_ref(),
            AuditEntity::Other,
            id,
            "blacklist_remove",
            actor,
            json!({}),
            None,
        )?;
        Ok(())
    }

    pub fn get(&self, id: Uuid) -> Result<BlacklistEntry, ApiError> {
        self.store
            .fetch_blacklist_entry(id)?
            .ok_or(ApiError::NotFound)
    }

    pub fn list(&self) -> Result<Vec<BlacklistEntry>, ApiError> {
        Ok(self.store.list_blacklist()?)
    }
}
