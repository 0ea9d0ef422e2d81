use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::recruitment::domain::{
    AuditEntity, Campaign, EmploymentCondition, LinkStatus, Modality, RecruitmentLink, Weekday,
};
use crate::recruitment::store::{LinkFilter, RecruitmentStore, StoreError};

use super::{record_audit, Actor};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLinkRequest {
    pub campaign_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub modality: Option<Modality>,
    #[serde(default)]
    pub employment_condition: Option<EmploymentCondition>,
    #[serde(default)]
    pub period_label: String,
    #[serde(default)]
    pub period_start: Option<NaiveDate>,
    #[serde(default)]
    pub period_end: Option<NaiveDate>,
    #[serde(default)]
    pub rest_day: Option<Weekday>,
    #[serde(default)]
    pub work_week: Option<u8>,
    #[serde(default)]
    pub quota: Option<u32>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLinkRequest {
    pub title: Option<String>,
    pub modality: Option<Modality>,
    pub employment_condition: Option<EmploymentCondition>,
    pub period_label: Option<String>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub rest_day: Option<Weekday>,
    pub work_week: Option<u8>,
    pub quota: Option<u32>,
    pub expires_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

pub struct LinkService<S> {
    store: Arc<S>,
}

impl<S: RecruitmentStore> LinkService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn create(
        &self,
        request: CreateLinkRequest,
        actor: &Actor,
    ) -> Result<RecruitmentLink, ApiError> {
        let campaign = self
            .store
            .fetch_campaign(request.campaign_id)?
            .ok_or_else(|| ApiError::validation("Campaign does not exist."))?;

        let owner_id = actor
            .id
            .ok_or_else(|| ApiError::validation("An owner is required to create a link."))?;

        let now = Utc::now();
        let slug = match request.slug {
            Some(slug) if !slug.trim().is_empty() => slug.trim().to_string(),
            _ => generate_slug(&request.title),
        };
        let link = RecruitmentLink {
            id: Uuid::new_v4(),
            campaign_id: campaign.id,
            slug,
            title: request.title.trim().to_string(),
            owner_id,
            owner_name: actor.name.clone(),
            status: LinkStatus::Active,
            modality: request.modality.unwrap_or(Modality::Onsite),
            employment_condition: request
                .employment_condition
                .unwrap_or(EmploymentCondition::Payroll),
            period_label: request.period_label,
            period_start: request.period_start,
            period_end: request.period_end,
            rest_day: request.rest_day,
            work_week: request.work_week,
            quota: request.quota,
            expires_at: request.expires_at,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };

        let link = match self.store.insert_link(link) {
            Ok(link) => link,
            Err(StoreError::Conflict) => {
                return Err(ApiError::validation("A link with this slug already exists."))
            }
            Err(err) => return Err(err.into()),
        };
        record_audit(
            self.store.as_ref(),
            AuditEntity::Link,
            link.id,
            "create",
            actor,
            json!({ "slug": link.slug, "campaign_id": link.campaign_id }),
            None,
        )?;
        Ok(link)
    }

    pub fn update(
        &self,
        id: Uuid,
        request: UpdateLinkRequest,
        actor: &Actor,
    ) -> Result<RecruitmentLink, ApiError> {
        let mut link = self.get(id)?;
        if let Some(title) = request.title {
            link.title = title.trim().to_string();
        }
        if let Some(modality) = request.modality {
            link.modality = modality;
        }
        if let Some(condition) = request.employment_condition {
            link.employment_condition = condition;
        }
        if let Some(period_label) = request.period_label {
            link.period_label = period_label;
        }
        if request.period_start.is_some() {
            link.period_start = request.period_start;
        }
        if request.period_end.is_some() {
            link.period_end = request.period_end;
        }
        if request.rest_day.is_some() {
            link.rest_day = request.rest_day;
        }
        if request.work_week.is_some() {
            link.work_week = request.work_week;
        }
        if request.quota.is_some() {
            link.quota = request.quota;
        }
        if let Some(expires_at) = request.expires_at {
            link.expires_at = expires_at;
        }
        if let Some(notes) = request.notes {
            link.notes = notes;
        }
        link.updated_at = Utc::now();
        self.store.update_link(link.clone())?;
        record_audit(
            self.store.as_ref(),
            AuditEntity::Link,
            link.id,
            "update",
            actor,
            json!({}),
            None,
        )?;
        Ok(link)
    }

    /// Explicit lifecycle transition; re-setting the same status is a no-op.
    pub fn set_status(
        &self,
        id: Uuid,
        status: LinkStatus,
        actor: &Actor,
    ) -> Result<RecruitmentLink, ApiError> {
        let mut link = self.get(id)?;
        if link.status == status {
            return Ok(link);
        }
        link.status = status;
        link.updated_at = Utc::now();
        self.store.update_link(link.clone())?;

        let action = match status {
            LinkStatus::Active => "activate",
            LinkStatus::Expired => "expire",
            LinkStatus::Revoked => "revoke",
        };
        record_audit(
            self.store.as_ref(),
            AuditEntity::Link,
            link.id,
            action,
            actor,
            json!({ "status": status.label() }),
            None,
        )?;
        Ok(link)
    }

    pub fn get(&self, id: Uuid) -> Result<RecruitmentLink, ApiError> {
        self.store.fetch_link(id)?.ok_or(ApiError::NotFound)
    }

    /// Management listing, scoped to the owner unless the caller reads all.
    pub fn list(
        &self,
        owner_scope: Option<Uuid>,
        campaign_id: Option<Uuid>,
    ) -> Result<Vec<RecruitmentLink>, ApiError> {
        let filter = LinkFilter {
            owner_id: owner_scope,
            campaign_id,
        };
        Ok(self.store.list_links(&filter)?)
    }

    /// Public read. Anything but an open link is concealed as not-found.
    pub fn public_by_slug(&self, slug: &str) -> Result<(RecruitmentLink, Campaign), ApiError> {
        let link = self
            .store
            .fetch_link_by_slug(slug)?
            .ok_or(ApiError::NotFound)?;
        if !link.is_open(Utc::now()) {
            return Err(ApiError::NotFound);
        }
        let campaign = self
            .store
            .fetch_campaign(link.campaign_id)?
            .ok_or(ApiError::NotFound)?;
        Ok((link, campaign))
    }

    pub fn campaign_for(&self, link: &RecruitmentLink) -> Result<Campaign, ApiError> {
        self.store
            .fetch_campaign(link.campaign_id)?
            .ok_or(ApiError::NotFound)
    }
}

fn slugify(raw: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch.to_ascii_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    slug
}

fn generate_slug(title: &str) -> String {
    let mut base = slugify(title);
    if base.is_empty() {
        base = "link".to_string();
    }
    base.truncate(40);
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{base}-{}", &suffix[..6])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recruitment::memory::MemoryStore;
    use crate::recruitment::services::campaigns::{CampaignService, CreateCampaignRequest};
    use chrono::Duration;

    fn setup() -> (Arc<MemoryStore>, LinkService<MemoryStore>, Campaign, Actor) {
        let store = Arc::new(MemoryStore::default());
        let campaigns = CampaignService::new(store.clone());
        let actor = Actor {
            id: Some(Uuid::new_v4()),
            name: "Rosa Perez".to_string(),
        };
        let campaign = campaigns
            .create(
                CreateCampaignRequest {
                    code: "LIMA-01".to_string(),
                    name: "Lima North".to_string(),
                    site_name: String::new(),
                    description: String::new(),
                    is_active: true,
                },
                &actor,
            )
            .expect("campaign created");
        (store.clone(), LinkService::new(store), campaign, actor)
    }

    fn create_request(campaign_id: Uuid) -> CreateLinkRequest {
        CreateLinkRequest {
            campaign_id,
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
        }
    }

    #[test]
    fn create_generates_slug_and_stamps_owner() {
        let (_, service, campaign, actor) = setup();
        let link = service
            .create(create_request(campaign.id), &actor)
            .expect("link created");
        assert!(link.slug.starts_with("weekly-intake-"));
        assert_eq!(link.owner_id, actor.id.expect("actor id"));
        assert_eq!(link.status, LinkStatus::Active);
        assert_eq!(link.modality, Modality::Onsite);
    }

    #[test]
    fn set_status_is_idempotent_and_audited() {
        let (store, service, campaign, actor) = setup();
        let link = service
            .create(create_request(campaign.id), &actor)
            .expect("link created");

        let revoked = service
            .set_status(link.id, LinkStatus::Revoked, &actor)
            .expect("revoked");
        assert_eq!(revoked.status, LinkStatus::Revoked);

        // Same transition again: no-op, no extra audit row.
        service
            .set_status(link.id, LinkStatus::Revoked, &actor)
            .expect("idempotent");
        let trail = store
            .audit_trail(AuditEntity::Link, link.id)
            .expect("audit trail");
        let revokes = trail.iter().filter(|rec| rec.action == "revoke").count();
        assert_eq!(revokes, 1);
    }

    #[test]
    fn public_read_conceals_closed_links() {
        let (_, service, campaign, actor) = setup();
        let mut request = create_request(campaign.id);
        request.expires_at = Utc::now() - Duration::minutes(1);
        let link = service.create(request, &actor).expect("link created");

        let err = service.public_by_slug(&link.slug).expect_err("concealed");
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn listing_scopes_to_owner() {
        let (_, service, campaign, actor) = setup();
        let other_actor = Actor {
            id: Some(Uuid::new_v4()),
            name: "Other".to_string(),
        };
        service
            .create(create_request(campaign.id), &actor)
            .expect("first link");
        service
            .create(create_request(campaign.id), &other_actor)
            .expect("second link");

        let all = service.list(None, None).expect("all links");
        assert_eq!(all.len(), 2);
        let own = service.list(actor.id, None).expect("own links");
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].owner_id, actor.id.expect("actor id"));
    }

    #[test]
    fn slugify_compresses_non_alphanumerics() {
        assert_eq!(slugify("Lima North -- Week 12"), "lima-north-week-12");
        assert_eq!(slugify("¡Hola!"), "hola");
    }
}
