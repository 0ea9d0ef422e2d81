use super::common::*;

use crate::recruitment::domain::{ApplicantStatus, DocumentKind, VerificationStatus};
use crate::recruitment::services::verification::{
    ControlledUpdateRequest, CorrectionRequest, DecisionRequest,
};
use crate::recruitment::services::RequestMeta;
use crate::recruitment::store::RecruitmentStore;

fn submitted_applicant(harness: &Harness) -> uuid::Uuid {
    let campaign = campaign(harness);
    let link = open_link(harness, &campaign);
    let applicant = harness
        .applicants
        .create(&link, applicant_request("87654321"), &harness.actor)
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
    applicant.id
}

#[test]
fn queue_orders_by_submission_time_oldest_first() {
    let harness = harness();
    let first = submitted_applicant(&harness);
    let second = submitted_applicant(&harness);

    let queue = harness.verification.queue().expect("queue");
    assert_eq!(queue.len(), 2);
    assert_eq!(queue[0].applicant.id, first);
    assert_eq!(queue[1].applicant.id, second);
    assert_eq!(queue[0].campaign_name, "Lima North");
    assert!(queue[0].verification.is_some());
}

#[test]
fn decision_outcomes_map_deterministically() {
    let cases = [
        (VerificationStatus::Approved, ApplicantStatus::VerifiedOk),
        (VerificationStatus::Observed, ApplicantStatus::Observed),
        (VerificationStatus::Rejected, ApplicantStatus::Rejected),
        // Anything outside the approved/observed pair collapses to rejected.
        (VerificationStatus::Pending, ApplicantStatus::Rejected),
    ];

    for (decision, expected) in cases {
        let harness = harness();
        let applicant_id = submitted_applicant(&harness);
        let applicant = harness
            .verification
            .decide(
                applicant_id,
                DecisionRequest {
                    status: decision,
                    reason: "reviewed".to_string(),
                },
                &harness.actor,
            )
            .expect("decision registered");
        assert_eq!(applicant.status, expected, "decision {decision:?}");
        assert!(applicant.last_reviewed_at.is_some());

        let verification = harness
            .store
            .fetch_verification(applicant_id)
            .expect("lookup")
            .expect("verification");
        assert_eq!(verification.status, decision);
        assert_eq!(verification.reviewed_by, harness.actor.id);
        assert!(verification.decided_at.is_some());
    }
}

#[test]
fn request_correction_forces_observed_regardless_of_prior_state() {
    let harness = harness();
    let applicant_id = submitted_applicant(&harness);

    harness
        .verification
        .decide(
            applicant_id,
            DecisionRequest {
                status: VerificationStatus::Approved,
                reason: String::new(),
            },
            &harness.actor,
        )
        .expect("approved first");

    let applicant = harness
        .verification
        .request_correction(
            applicant_id,
            CorrectionRequest {
                message: "Photo is blurry".to_string(),
            },
            &harness.actor,
        )
        .expect("correction requested");
    assert_eq!(applicant.status, ApplicantStatus::Observed);

    let verification = harness
        .store
        .fetch_verification(applicant_id)
        .expect("lookup")
        .expect("verification");
    assert_eq!(verification.status, VerificationStatus::Observed);
    assert_eq!(verification.requested_correction_by, harness.actor.id);
    assert_eq!(verification.decision_reason, "Photo is blurry");
}

#[test]
fn controlled_update_touches_only_contact_fields() {
    let harness = harness();
    let applicant_id = submitted_applicant(&harness);

    let updated = harness
        .verification
        .controlled_update(
            applicant_id,
            ControlledUpdateRequest {
                phone: Some("555444333".to_string()),
                email: Some("fixed@example.com".to_string()),
                ..Default::default()
            },
            &harness.actor,
        )
        .expect("controlled update");
    assert_eq!(updated.phone, "555444333");
    assert_eq!(updated.email, "fixed@example.com");
    // Workflow state is untouched by the controlled path.
    assert_eq!(updated.status, ApplicantStatus::Submitted);
    assert_eq!(updated.document_number, "87654321");
}

#[test]
fn empty_controlled_update_is_a_no_op() {
    let harness = harness();
    let applicant_id = submitted_applicant(&harness);
    let before = harness.applicants.get(applicant_id).expect("applicant");

    let after = harness
        .verification
        .controlled_update(
            applicant_id,
            ControlledUpdateRequest::default(),
            &harness.actor,
        )
        .expect("no-op");
    assert_eq!(before.updated_at, after.updated_at);
}
