//! Domain services encapsulating create/update rules, status transitions,
//! and audit emission for each entity group.

pub mod applicants;
pub mod blacklist;
pub mod campaigns;
pub mod exports;
pub mod links;
pub mod verification;

#[cfg(test)]
mod tests;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;

use super::domain::{AuditEntity, AuditRecord};
use super::store::RecruitmentStore;

/// Who performed a state-changing action.
#[derive(Debug, Clone, Default)]
pub struct Actor {
    pub id: Option<Uuid>,
    pub name: String,
}

impl Actor {
    /// Actor stamped on actions taken through the public intake form.
    pub fn public_form() -> Self {
        Self {
            id: None,
            name: "public_form".to_string(),
        }
    }
}

/// Request-level metadata recorded alongside public actions.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

pub(crate) fn record_audit<S: RecruitmentStore>(
    store: &S,
    entity_type: AuditEntity,
    entity_id: Uuid,
    action: &str,
    actor: &Actor,
    payload: Value,
    meta: Option<&RequestMeta>,
) -> Result<(), ApiError> {
    store.append_audit(AuditRecord {
        id: Uuid::new_v4(),
        entity_type,
        entity_id,
        action: action.to_string(),
        actor_id: actor.id,
        actor_name: actor.name.clone(),
        ip_address: meta.and_then(|meta| meta.ip_address.clone()),
        user_agent: meta
            .and_then(|meta| meta.user_agent.clone())
            .unwrap_or_default(),
        payload,
        created_at: Utc::now(),
    })?;
    Ok(())
}

pub(crate) fn uppercase(value: &str) -> String {
    value.trim().to_uppercase()
}
