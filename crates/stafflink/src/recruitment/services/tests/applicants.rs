use super::common::*;

use chrono::{Duration, Utc};

use crate::error::ApiError;
use crate::recruitment::domain::{
    ApplicantStatus, DocumentKind, DocumentType, LinkStatus, Modality, Weekday,
};
use crate::recruitment::services::applicants::UpdateApplicantRequest;
use crate::recruitment::services::blacklist::{BlacklistService, CreateBlacklistRequest};
use crate::recruitment::services::links::UpdateLinkRequest;
use crate::recruitment::services::RequestMeta;
use crate::recruitment::store::RecruitmentStore;

#[test]
fn duplicate_document_on_same_link_is_rejected_as_domain_error() {
    let harness = harness();
    let campaign = campaign(&harness);
    let link = open_link(&harness, &campaign);

    harness
        .applicants
        .create(&link, applicant_request("87654321"), &harness.actor)
        .expect("first applicant");
    let err = harness
        .applicants
        .create(&link, applicant_request("87654321"), &harness.actor)
        .expect_err("duplicate rejected");
    match err {
        ApiError::Validation { message, .. } => {
            assert!(message.contains("already exists"), "unexpected: {message}")
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn same_document_on_a_different_link_is_allowed() {
    let harness = harness();
    let campaign = campaign(&harness);
    let first = open_link(&harness, &campaign);
    let second = open_link(&harness, &campaign);

    harness
        .applicants
        .create(&first, applicant_request("87654321"), &harness.actor)
        .expect("first applicant");
    harness
        .applicants
        .create(&second, applicant_request("87654321"), &harness.actor)
        .expect("second link accepts the same document");
}

#[test]
fn creation_defaults_modality_and_rest_day_from_the_link() {
    let harness = harness();
    let campaign = campaign(&harness);
    let mut link = open_link(&harness, &campaign);
    link = harness
        .links
        .update(
            link.id,
            UpdateLinkRequest {
                modality: Some(Modality::Hybrid),
                rest_day: Some(Weekday::Sunday),
                ..Default::default()
            },
            &harness.actor,
        )
        .expect("link updated");

    let applicant = harness
        .applicants
        .create(&link, applicant_request("87654321"), &harness.actor)
        .expect("applicant created");
    assert_eq!(applicant.modality, Modality::Hybrid);
    assert_eq!(applicant.rest_day, Some(Weekday::Sunday));
    assert_eq!(applicant.first_name, "MARIA");
    assert_eq!(applicant.status, ApplicantStatus::Draft);

    // Dependent 1:1 records are created atomically with the applicant.
    let checklist = harness.applicants.checklist(applicant.id).expect("checklist");
    assert!(!checklist.identity_front_verified);
    let assignment = harness.applicants.assignment(applicant.id).expect("assignment");
    assert_eq!(assignment.employment_condition, link.employment_condition);
}

#[test]
fn closed_links_reject_new_applicants() {
    let harness = harness();
    let campaign = campaign(&harness);
    let link = open_link(&harness, &campaign);
    let revoked = harness
        .links
        .set_status(link.id, LinkStatus::Revoked, &harness.actor)
        .expect("revoked");

    let err = harness
        .applicants
        .create(&revoked, applicant_request("87654321"), &harness.actor)
        .expect_err("closed link rejected");
    assert!(matches!(err, ApiError::Validation { .. }));
}

#[test]
fn blacklisted_dni_cannot_apply_on_any_link() {
    let harness = harness();
    let campaign = campaign(&harness);
    let blacklist = BlacklistService::new(harness.store.clone());
    blacklist
        .create(
            CreateBlacklistRequest {
                document_number: "87654321".to_string(),
                reason: "fraud".to_string(),
            },
            &harness.actor,
        )
        .expect("blacklisted");

    for _ in 0..2 {
        let link = open_link(&harness, &campaign);
        let err = harness
            .applicants
            .create(&link, applicant_request("87654321"), &harness.actor)
            .expect_err("blacklist hit");
        match err {
            ApiError::Validation { field, .. } => assert_eq!(field, Some("document_number")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}

#[test]
fn ce_documents_skip_the_blacklist_check() {
    let harness = harness();
    let campaign = campaign(&harness);
    let link = open_link(&harness, &campaign);
    let blacklist = BlacklistService::new(harness.store.clone());
    blacklist
        .create(
            CreateBlacklistRequest {
                document_number: "CE8812733".to_string(),
                reason: String::new(),
            },
            &harness.actor,
        )
        .expect("blacklisted");

    let mut request = applicant_request("ce8812733");
    request.document_type = DocumentType::Ce;
    harness
        .applicants
        .create(&link, request, &harness.actor)
        .expect("ce applicant accepted");
}

#[test]
fn submit_requires_consent_and_all_documents() {
    let harness = harness();
    let campaign = campaign(&harness);
    let link = open_link(&harness, &campaign);
    let applicant = harness
        .applicants
        .create(&link, applicant_request("87654321"), &harness.actor)
        .expect("applicant created");
    let meta = RequestMeta {
        ip_address: Some("10.0.0.9".to_string()),
        user_agent: Some("intake-test".to_string()),
    };

    let err = harness
        .applicants
        .submit(applicant.id, false, &meta)
        .expect_err("consent required");
    assert!(matches!(err, ApiError::Validation { .. }));

    upload_required_documents(&harness, applicant.id, &[DocumentKind::DniFront]);
    let err = harness
        .applicants
        .submit(applicant.id, true, &meta)
        .expect_err("missing back side");
    assert!(matches!(err, ApiError::Validation { .. }));

    upload_required_documents(&harness, applicant.id, &[DocumentKind::DniBack]);
    let submitted = harness
        .applicants
        .submit(applicant.id, true, &meta)
        .expect("submission accepted");
    assert_eq!(submitted.status, ApplicantStatus::Submitted);
    assert!(submitted.lpdp_consent);
    assert!(submitted.submitted_at.is_some());
    assert_eq!(submitted.origin_ip.as_deref(), Some("10.0.0.9"));

    let verification = harness
        .store
        .fetch_verification(applicant.id)
        .expect("lookup")
        .expect("verification created");

    // Submitting again keeps a single verification record.
    harness
        .applicants
        .submit(applicant.id, true, &meta)
        .expect("resubmission");
    let again = harness
        .store
        .fetch_verification(applicant.id)
        .expect("lookup")
        .expect("verification still present");
    assert_eq!(verification.id, again.id);
}

#[test]
fn updates_are_blocked_after_review_starts() {
    let harness = harness();
    let campaign = campaign(&harness);
    let link = open_link(&harness, &campaign);
    let applicant = harness
        .applicants
        .create(&link, applicant_request("87654321"), &harness.actor)
        .expect("applicant created");

    let mut reviewed = applicant.clone();
    reviewed.status = ApplicantStatus::UnderReview;
    reviewed.updated_at = Utc::now() + Duration::seconds(1);
    harness
        .store
        .update_applicant(reviewed)
        .expect("status forced");

    let err = harness
        .applicants
        .update(
            applicant.id,
            UpdateApplicantRequest {
                phone: Some("555".to_string()),
                ..Default::default()
            },
            &harness.actor,
        )
        .expect_err("locked after review starts");
    assert!(matches!(err, ApiError::Validation { .. }));
}

#[test]
fn update_revalidates_a_changed_document_number() {
    let harness = harness();
    let campaign = campaign(&harness);
    let link = open_link(&harness, &campaign);
    let applicant = harness
        .applicants
        .create(&link, applicant_request("87654321"), &harness.actor)
        .expect("applicant created");

    let err = harness
        .applicants
        .update(
            applicant.id,
            UpdateApplicantRequest {
                document_number: Some("12ab".to_string()),
                ..Default::default()
            },
            &harness.actor,
        )
        .expect_err("bad number rejected");
    assert!(matches!(err, ApiError::Validation { .. }));

    let updated = harness
        .applicants
        .update(
            applicant.id,
            UpdateApplicantRequest {
                document_number: Some("11223344".to_string()),
                ..Default::default()
            },
            &harness.actor,
        )
        .expect("valid number accepted");
    assert_eq!(updated.document_number, "11223344");
}

#[test]
fn oversized_uploads_are_rejected() {
    let harness = harness();
    let campaign = campaign(&harness);
    let link = open_link(&harness, &campaign);
    let applicant = harness
        .applicants
        .create(&link, applicant_request("87654321"), &harness.actor)
        .expect("applicant created");

    let oversized = vec![0u8; 2 * 1024 * 1024];
    let err = harness
        .applicants
        .upload_document(
            applicant.id,
            DocumentKind::DniFront,
            "front.jpg",
            Some("image/jpeg"),
            &oversized,
            None,
        )
        .expect_err("oversize rejected");
    assert!(matches!(err, ApiError::Validation { .. }));
}
