use super::common::*;

use crate::error::ApiError;
use crate::recruitment::domain::{
    ApplicantStatus, BatchItemStatus, BatchStatus, DocumentKind, VerificationStatus,
};
use crate::recruitment::services::exports::CreateBatchRequest;
use crate::recruitment::services::verification::DecisionRequest;
use crate::recruitment::services::RequestMeta;

fn verified_applicant(harness: &Harness, document_number: &str) -> uuid::Uuid {
    let campaign = campaign(harness);
    let link = open_link(harness, &campaign);
    let applicant = harness
        .applicants
        .create(&link, applicant_request(document_number), &harness.actor)
        .expect("applicant created");
    upload_required_documents(
        harness,
        applicant.id,
        &[DocumentKind::DniFront, DocumentKind::DniBack],
    );
    harness
        .applicants
        .submit(applicant.id, true, &RequestMeta::default())
        .expect("submitted");
    harness
        .verification
        .decide(
            applicant.id,
            DecisionRequest {
                status: VerificationStatus::Approved,
                reason: String::new(),
            },
            &harness.actor,
        )
        .expect("approved");
    applicant.id
}

#[test]
fn batch_creation_exports_every_verified_applicant() {
    let harness = harness();
    let first = verified_applicant(&harness, "11111111");
    let second = verified_applicant(&harness, "22222222");

    let result = harness
        .exports
        .create_batch(
            CreateBatchRequest {
                applicant_ids: vec![first, second],
                notes: "Week 1".to_string(),
            },
            &harness.actor,
        )
        .expect("batch created");

    assert_eq!(result.batch.status, BatchStatus::Generated);
    assert_eq!(result.items.len(), 2);
    assert!(result
        .items
        .iter()
        .all(|item| item.status == BatchItemStatus::Exported));

    for id in [first, second] {
        let applicant = harness.applicants.get(id).expect("applicant");
        assert_eq!(applicant.status, ApplicantStatus::Exported);
    }

    let contents = std::fs::read_to_string(&result.batch.file_path).expect("batch file");
    assert_eq!(contents.lines().count(), 2);
    assert!(contents.contains("11111111,MARIA LOPEZ RAMIREZ,Lima North"));
}

#[test]
fn batch_creation_is_all_or_nothing() {
    let harness = harness();
    let verified = verified_applicant(&harness, "11111111");

    let campaign = campaign(&harness);
    let link = open_link(&harness, &campaign);
    let draft = harness
        .applicants
        .create(&link, applicant_request("33333333"), &harness.actor)
        .expect("draft applicant");

    let err = harness
        .exports
        .create_batch(
            CreateBatchRequest {
                applicant_ids: vec![verified, draft.id],
                notes: String::new(),
            },
            &harness.actor,
        )
        .expect_err("mixed statuses rejected");
    assert!(matches!(err, ApiError::Validation { .. }));

    // Nothing was flipped and no batch row persists.
    let applicant = harness.applicants.get(verified).expect("applicant");
    assert_eq!(applicant.status, ApplicantStatus::VerifiedOk);
    assert!(harness.exports.list().expect("batches").is_empty());
}

#[test]
fn empty_batches_are_rejected() {
    let harness = harness();
    let err = harness
        .exports
        .create_batch(
            CreateBatchRequest {
                applicant_ids: Vec::new(),
                notes: String::new(),
            },
            &harness.actor,
        )
        .expect_err("empty request rejected");
    assert!(matches!(err, ApiError::Validation { .. }));
}

#[test]
fn mark_delivered_flips_the_batch_status() {
    let harness = harness();
    let applicant = verified_applicant(&harness, "11111111");
    let result = harness
        .exports
        .create_batch(
            CreateBatchRequest {
                applicant_ids: vec![applicant],
                notes: String::new(),
            },
            &harness.actor,
        )
        .expect("batch created");

    let delivered = harness
        .exports
        .mark_delivered(result.batch.id, &harness.actor)
        .expect("delivered");
    assert_eq!(delivered.status, BatchStatus::Delivered);

    // Repeating the confirmation keeps the same state.
    let again = harness
        .exports
        .mark_delivered(result.batch.id, &harness.actor)
        .expect("idempotent in intent");
    assert_eq!(again.status, BatchStatus::Delivered);
}

#[test]
fn batch_file_is_downloadable_until_removed() {
    let harness = harness();
    let applicant = verified_applicant(&harness, "11111111");
    let result = harness
        .exports
        .create_batch(
            CreateBatchRequest {
                applicant_ids: vec![applicant],
                notes: String::new(),
            },
            &harness.actor,
        )
        .expect("batch created");

    let path = harness.exports.file(result.batch.id).expect("file resolves");
    std::fs::remove_file(path).expect("file removed");
    let err = harness
        .exports
        .file(result.batch.id)
        .expect_err("missing file is 404");
    assert!(matches!(err, ApiError::NotFound));
}
