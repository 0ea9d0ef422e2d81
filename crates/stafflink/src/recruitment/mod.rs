//! Recruitment intake domain: entities, store, services, and routers.

pub mod domain;
pub mod memory;
pub mod permissions;
pub mod router;
pub mod services;
pub mod store;
pub mod validators;

pub use domain::{
    Applicant, ApplicantDocument, ApplicantStatus, AuditEntity, AuditRecord, BatchItemStatus,
    BatchStatus, BlacklistEntry, BlacklistStatus, Campaign, ContractAssignment, DocumentChecklist,
    DocumentKind, DocumentType, EmploymentCondition, LinkStatus, Modality, ProcessRecord,
    RecruitmentLink, SmartExportBatch, SmartExportBatchItem, Verification, VerificationStatus,
    Weekday,
};
pub use memory::MemoryStore;
pub use permissions::{PermissionMode, PermissionSet, RequiredPermissions};
pub use router::{backoffice_router, public_router, RecruitmentState};
pub use store::{ApplicantFilter, LinkFilter, RecruitmentStore, StoreError};
