use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::recruitment::domain::{AuditEntity, Campaign};
use crate::recruitment::store::{RecruitmentStore, StoreError};

use super::{record_audit, Actor};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaignRequest {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub site_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCampaignRequest {
    pub name: Option<String>,
    pub site_name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

pub struct CampaignService<S> {
    store: Arc<S>,
}

impl<S: RecruitmentStore> CampaignService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn create(
        &self,
        request: CreateCampaignRequest,
        actor: &Actor,
    ) -> Result<Campaign, ApiError> {
        let now = Utc::now();
        let campaign = Campaign {
            id: Uuid::new_v4(),
            code: request.code.trim().to_string(),
            name: request.name.trim().to_string(),
            site_name: request.site_name,
            description: request.description,
            is_active: request.is_active,
            created_at: now,
            updated_at: now,
        };
        let campaign = match self.store.insert_campaign(campaign) {
            Ok(campaign) => campaign,
            Err(StoreError::Conflict) => {
                return Err(ApiError::validation("A campaign with this code already exists."))
            }
            Err(err) => return Err(err.into()),
        };
        record_audit(
            self.store.as_ref(),
            AuditEntity::Campaign,
            campaign.id,
            "create",
            actor,
            json!({ "code": campaign.code }),
            None,
        )?;
        Ok(campaign)
    }

    pub fn update(
        &self,
        id: Uuid,
        request: UpdateCampaignRequest,
        actor: &Actor,
    ) -> Result<Campaign, ApiError> {
        let mut campaign = self.get(id)?;
        if let Some(name) = request.name {
            campaign.name = name.trim().to_string();
        }
        if let Some(site_name) = request.site_name {
            campaign.site_name = site_name;
        }
        if let Some(description) = request.description {
            campaign.description = description;
        }
        if let Some(is_active) = request.is_active {
            campaign.is_active = is_active;
        }
        campaign.updated_at = Utc::now();
        self.store.update_campaign(campaign.clone())?;
        record_audit(
            self.store.as_ref(),
            AuditEntity::Campaign,
            campaign.id,
            "update",
            actor,
            json!({}),
            None,
        )?;
        Ok(campaign)
    }

    pub fn get(&self, id: Uuid) -> Result<Campaign, ApiError> {
        self.store.fetch_campaign(id)?.ok_or(ApiError::NotFound)
    }

    pub fn list(&self) -> Result<Vec<Campaign>, ApiError> {
        Ok(self.store.list_campaigns()?)
    }
}
