//! Mutex-guarded in-memory store shared by the API service and the tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use super::domain::{
    Applicant, ApplicantDocument, ApplicantStatus, AuditEntity, AuditRecord, BatchItemStatus,
    BlacklistEntry, BlacklistStatus, Campaign, ContractAssignment, DocumentChecklist,
    ProcessRecord, RecruitmentLink, SmartExportBatch, SmartExportBatchItem, Verification,
};
use super::store::{
    applicant_matches, ApplicantFilter, LinkFilter, RecruitmentStore, StoreError, QUEUE_STATUSES,
};

#[derive(Default)]
struct StoreInner {
    campaigns: HashMap<Uuid, Campaign>,
    links: HashMap<Uuid, RecruitmentLink>,
    applicants: HashMap<Uuid, Applicant>,
    documents: Vec<ApplicantDocument>,
    checklists: HashMap<Uuid, DocumentChecklist>,
    processes: HashMap<Uuid, ProcessRecord>,
    assignments: HashMap<Uuid, ContractAssignment>,
    verifications: HashMap<Uuid, Verification>,
    blacklist: HashMap<Uuid, BlacklistEntry>,
    batches: HashMap<Uuid, SmartExportBatch>,
    batch_items: Vec<SmartExportBatchItem>,
    audits: Vec<AuditRecord>,
}

/// In-memory [`RecruitmentStore`] implementation. A single mutex stands in
/// for the relational transaction boundary: every multi-row write happens
/// inside one locked section.
#[derive(Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl MemoryStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        self.inner.lock().expect("store mutex poisoned")
    }
}

impl RecruitmentStore for MemoryStore {
    fn insert_campaign(&self, campaign: Campaign) -> Result<Campaign, StoreError> {
        let mut inner = self.lock();
        if inner
            .campaigns
            .values()
            .any(|existing| existing.code == campaign.code)
        {
            return Err(StoreError::Conflict);
        }
        inner.campaigns.insert(campaign.id, campaign.clone());
        Ok(campaign)
    }

    fn update_campaign(&self, campaign: Campaign) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if !inner.campaigns.contains_key(&campaign.id) {
            return Err(StoreError::NotFound);
        }
        inner.campaigns.insert(campaign.id, campaign);
        Ok(())
    }

    fn fetch_campaign(&self, id: Uuid) -> Result<Option<Campaign>, StoreError> {
        Ok(self.lock().campaigns.get(&id).cloned())
    }

    fn list_campaigns(&self) -> Result<Vec<Campaign>, StoreError> {
        let inner = self.lock();
        let mut campaigns: Vec<_> = inner.campaigns.values().cloned().collect();
        campaigns.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(campaigns)
    }

    fn insert_link(&self, link: RecruitmentLink) -> Result<RecruitmentLink, StoreError> {
        let mut inner = self.lock();
        if inner.links.values().any(|existing| existing.slug == link.slug) {
            return Err(StoreError::Conflict);
        }
        inner.links.insert(link.id, link.clone());
        Ok(link)
    }

    fn update_link(&self, link: RecruitmentLink) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if !inner.links.contains_key(&link.id) {
            return Err(StoreError::NotFound);
        }
        inner.links.insert(link.id, link);
        Ok(())
    }

    fn fetch_link(&self, id: Uuid) -> Result<Option<RecruitmentLink>, StoreError> {
        Ok(self.lock().links.get(&id).cloned())
    }

    fn fetch_link_by_slug(&self, slug: &str) -> Result<Option<RecruitmentLink>, StoreError> {
        Ok(self
            .lock()
            .links
            .values()
            .find(|link| link.slug == slug)
            .cloned())
    }

    fn list_links(&self, filter: &LinkFilter) -> Result<Vec<RecruitmentLink>, StoreError> {
        let inner = self.lock();
        let mut links: Vec<_> = inner
            .links
            .values()
            .filter(|link| {
                filter
                    .owner_id
                    .map_or(true, |owner_id| link.owner_id == owner_id)
            })
            .filter(|link| {
                filter
                    .campaign_id
                    .map_or(true, |campaign_id| link.campaign_id == campaign_id)
            })
            .cloned()
            .collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(links)
    }

    fn insert_applicant(
        &self,
        applicant: Applicant,
        checklist: DocumentChecklist,
        process: ProcessRecord,
        assignment: ContractAssignment,
    ) -> Result<Applicant, StoreError> {
        let mut inner = self.lock();
        let duplicate = inner.applicants.values().any(|existing| {
            existing.link_id == applicant.link_id
                && existing.document_type == applicant.document_type
                && existing.document_number == applicant.document_number
        });
        if duplicate {
            return Err(StoreError::Conflict);
        }
        inner.checklists.insert(applicant.id, checklist);
        inner.processes.insert(applicant.id, process);
        inner.assignments.insert(applicant.id, assignment);
        inner.applicants.insert(applicant.id, applicant.clone());
        Ok(applicant)
    }

    fn update_applicant(&self, applicant: Applicant) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if !inner.applicants.contains_key(&applicant.id) {
            return Err(StoreError::NotFound);
        }
        inner.applicants.insert(applicant.id, applicant);
        Ok(())
    }

    fn fetch_applicant(&self, id: Uuid) -> Result<Option<Applicant>, StoreError> {
        Ok(self.lock().applicants.get(&id).cloned())
    }

    fn list_applicants(&self, filter: &ApplicantFilter) -> Result<Vec<Applicant>, StoreError> {
        let inner = self.lock();
        let mut applicants: Vec<_> = inner
            .applicants
            .values()
            .filter(|applicant| {
                inner
                    .links
                    .get(&applicant.link_id)
                    .map_or(false, |link| applicant_matches(applicant, link, filter))
            })
            .cloned()
            .collect();
        applicants.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(applicants)
    }

    fn verification_queue(&self) -> Result<Vec<Applicant>, StoreError> {
        let inner = self.lock();
        let mut queue: Vec<_> = inner
            .applicants
            .values()
            .filter(|applicant| QUEUE_STATUSES.contains(&applicant.status))
            .cloned()
            .collect();
        queue.sort_by(|a, b| {
            a.submitted_at
                .unwrap_or(a.created_at)
                .cmp(&b.submitted_at.unwrap_or(b.created_at))
        });
        Ok(queue)
    }

    fn insert_document(
        &self,
        document: ApplicantDocument,
    ) -> Result<ApplicantDocument, StoreError> {
        let mut inner = self.lock();
        if !inner.applicants.contains_key(&document.applicant_id) {
            return Err(StoreError::NotFound);
        }
        inner.documents.push(document.clone());
        Ok(document)
    }

    fn list_documents(&self, applicant_id: Uuid) -> Result<Vec<ApplicantDocument>, StoreError> {
        let inner = self.lock();
        let mut documents: Vec<_> = inner
            .documents
            .iter()
            .filter(|document| document.applicant_id == applicant_id)
            .cloned()
            .collect();
        documents.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(documents)
    }

    fn document_checklist(&self, applicant_id: Uuid) -> Result<DocumentChecklist, StoreError> {
        let mut inner = self.lock();
        if !inner.applicants.contains_key(&applicant_id) {
            return Err(StoreError::NotFound);
        }
        Ok(inner
            .checklists
            .entry(applicant_id)
            .or_insert_with(|| DocumentChecklist::new(applicant_id, Utc::now()))
            .clone())
    }

    fn save_document_checklist(&self, checklist: DocumentChecklist) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if !inner.applicants.contains_key(&checklist.applicant_id) {
            return Err(StoreError::NotFound);
        }
        inner.checklists.insert(checklist.applicant_id, checklist);
        Ok(())
    }

    fn process_record(
        &self,
        applicant_id: Uuid,
        actor_id: Option<Uuid>,
    ) -> Result<ProcessRecord, StoreError> {
        let mut inner = self.lock();
        if !inner.applicants.contains_key(&applicant_id) {
            return Err(StoreError::NotFound);
        }
        Ok(inner
            .processes
            .entry(applicant_id)
            .or_insert_with(|| ProcessRecord::new(applicant_id, actor_id, Utc::now()))
            .clone())
    }

    fn save_process_record(&self, process: ProcessRecord) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if !inner.applicants.contains_key(&process.applicant_id) {
            return Err(StoreError::NotFound);
        }
        inner.processes.insert(process.applicant_id, process);
        Ok(())
    }

    fn contract_assignment(&self, applicant_id: Uuid) -> Result<ContractAssignment, StoreError> {
        let mut inner = self.lock();
        let link_id = match inner.applicants.get(&applicant_id) {
            Some(applicant) => applicant.link_id,
            None => return Err(StoreError::NotFound),
        };
        if let Some(existing) = inner.assignments.get(&applicant_id) {
            return Ok(existing.clone());
        }
        let link = inner.links.get(&link_id).ok_or(StoreError::NotFound)?;
        let assignment = ContractAssignment::from_link(applicant_id, link, Utc::now());
        inner.assignments.insert(applicant_id, assignment.clone());
        Ok(assignment)
    }

    fn save_contract_assignment(&self, assignment: ContractAssignment) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if !inner.applicants.contains_key(&assignment.applicant_id) {
            return Err(StoreError::NotFound);
        }
        inner.assignments.insert(assignment.applicant_id, assignment);
        Ok(())
    }

    fn ensure_verification(&self, applicant_id: Uuid) -> Result<Verification, StoreError> {
        let mut inner = self.lock();
        if !inner.applicants.contains_key(&applicant_id) {
            return Err(StoreError::NotFound);
        }
        Ok(inner
            .verifications
            .entry(applicant_id)
            .or_insert_with(|| Verification::pending(applicant_id, Utc::now()))
            .clone())
    }

    fn fetch_verification(&self, applicant_id: Uuid) -> Result<Option<Verification>, StoreError> {
        Ok(self.lock().verifications.get(&applicant_id).cloned())
    }

    fn save_verification(&self, verification: Verification) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if !inner.applicants.contains_key(&verification.applicant_id) {
            return Err(StoreError::NotFound);
        }
        inner
            .verifications
            .insert(verification.applicant_id, verification);
        Ok(())
    }

    fn insert_blacklist_entry(&self, entry: BlacklistEntry) -> Result<BlacklistEntry, StoreError> {
        let mut inner = self.lock();
        if inner
            .blacklist
            .values()
            .any(|existing| existing.document_number == entry.document_number)
        {
            return Err(StoreError::Conflict);
        }
        inner.blacklist.insert(entry.id, entry.clone());
        Ok(entry)
    }

    fn update_blacklist_entry(&self, entry: BlacklistEntry) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if !inner.blacklist.contains_key(&entry.id) {
            return Err(StoreError::NotFound);
        }
        inner.blacklist.insert(entry.id, entry);
        Ok(())
    }

    fn remove_blacklist_entry(&self, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner
            .blacklist
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    fn fetch_blacklist_entry(&self, id: Uuid) -> Result<Option<BlacklistEntry>, StoreError> {
        Ok(self.lock().blacklist.get(&id).cloned())
    }

    fn list_blacklist(&self) -> Result<Vec<BlacklistEntry>, StoreError> {
        let inner = self.lock();
        let mut entries: Vec<_> = inner.blacklist.values().cloned().collect();
        entries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(entries)
    }

    fn is_blacklisted(&self, document_number: &str) -> Result<bool, StoreError> {
        let inner = self.lock();
        Ok(inner.blacklist.values().any(|entry| {
            entry.status == BlacklistStatus::Active
                && entry.document_number.eq_ignore_ascii_case(document_number)
        }))
    }

    fn create_export_batch(
        &self,
        batch: SmartExportBatch,
        applicant_ids: &[Uuid],
    ) -> Result<(SmartExportBatch, Vec<SmartExportBatchItem>), StoreError> {
        let mut inner = self.lock();
        if inner
            .batches
            .values()
            .any(|existing| existing.batch_code == batch.batch_code)
        {
            return Err(StoreError::Conflict);
        }
        // Validate the full target set before mutating anything.
        for applicant_id in applicant_ids {
            match inner.applicants.get(applicant_id) {
                None => return Err(StoreError::NotFound),
                Some(applicant) if applicant.status != ApplicantStatus::VerifiedOk => {
                    return Err(StoreError::Conflict)
                }
                Some(_) => {}
            }
        }

        let now = Utc::now();
        let mut items = Vec::with_capacity(applicant_ids.len());
        for applicant_id in applicant_ids {
            if let Some(applicant) = inner.applicants.get_mut(applicant_id) {
                applicant.status = ApplicantStatus::Exported;
                applicant.updated_at = now;
            }
            items.push(SmartExportBatchItem {
                id: Uuid::new_v4(),
                batch_id: batch.id,
                applicant_id: *applicant_id,
                status: BatchItemStatus::Exported,
                exported_at: Some(now),
                error_message: String::new(),
            });
        }
        inner.batch_items.extend(items.iter().cloned());
        inner.batches.insert(batch.id, batch.clone());
        Ok((batch, items))
    }

    fn update_export_batch(&self, batch: SmartExportBatch) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if !inner.batches.contains_key(&batch.id) {
            return Err(StoreError::NotFound);
        }
        inner.batches.insert(batch.id, batch);
        Ok(())
    }

    fn fetch_export_batch(&self, id: Uuid) -> Result<Option<SmartExportBatch>, StoreError> {
        Ok(self.lock().batches.get(&id).cloned())
    }

    fn list_export_batches(&self) -> Result<Vec<SmartExportBatch>, StoreError> {
        let inner = self.lock();
        let mut batches: Vec<_> = inner.batches.values().cloned().collect();
        batches.sort_by(|a, b| b.generated_at.cmp(&a.generated_at));
        Ok(batches)
    }

    fn list_batch_items(&self, batch_id: Uuid) -> Result<Vec<SmartExportBatchItem>, StoreError> {
        Ok(self
            .lock()
            .batch_items
            .iter()
            .filter(|item| item.batch_id == batch_id)
            .cloned()
            .collect())
    }

    fn append_audit(&self, record: AuditRecord) -> Result<(), StoreError> {
        self.lock().audits.push(record);
        Ok(())
    }

    fn audit_trail(
        &self,
        entity_type: AuditEntity,
        entity_id: Uuid,
    ) -> Result<Vec<AuditRecord>, StoreError> {
        Ok(self
            .lock()
            .audits
            .iter()
            .filter(|record| record.entity_type == entity_type && record.entity_id == entity_id)
            .cloned()
            .collect())
    }
}
