//! AI validation request lifecycle: stake-gated creation, oracle-exclusive
//! claim and fulfillment, and the claim-expiry takeover path.

use align_protocol::{AlignmentLedger, ProtocolError, ProtocolParams};
use align_types::{
    AiValidationStatus, LinkId, PublicKey, TokenAmount, TopicId, VoteChoice,
};

fn authority() -> PublicKey {
    PublicKey::from_bytes([0xAA; 32])
}

fn oracle() -> PublicKey {
    PublicKey::from_bytes([0xBB; 32])
}

struct Harness {
    ledger: AlignmentLedger,
    contributor: PublicKey,
    topic: TopicId,
    link: LinkId,
}

/// Contributor with 100 tempRep staked in the topic and one linked
/// submission.
async fn setup_with_params(params: ProtocolParams) -> Harness {
    let ledger = AlignmentLedger::new(authority(), oracle(), params);
    let topic = ledger
        .create_topic(authority(), "rust-corpus".into(), "desc".into(), None, None)
        .await
        .unwrap();

    let contributor = PublicKey::from_bytes([1; 32]);
    ledger.register_user(contributor).await.unwrap();
    ledger
        .initialize_user_topic_balance(contributor, topic)
        .await
        .unwrap();
    let submission = ledger
        .submit_data_to_topic(contributor, topic, "ipfs://QmData".into(), 0)
        .await
        .unwrap();
    let link = ledger
        .link_submission_to_topic(submission, topic)
        .await
        .unwrap();
    ledger
        .stake_topic_specific_tokens(contributor, topic, TokenAmount::new(100))
        .await
        .unwrap();

    Harness {
        ledger,
        contributor,
        topic,
        link,
    }
}

async fn setup() -> Harness {
    setup_with_params(ProtocolParams::default()).await
}

#[tokio::test]
async fn scenario_c_index_gate_and_immediate_deduction() {
    let h = setup().await;

    // Wrong predicted index: creation fails, balance untouched.
    let err = h
        .ledger
        .request_ai_validation(h.contributor, h.link, TokenAmount::new(50), 3)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::AiRequestIndexMismatch { expected: 0, provided: 3 }
    ));
    let balance = h
        .ledger
        .topic_balance(&h.contributor, h.topic)
        .await
        .unwrap();
    assert_eq!(balance.temp_rep, TokenAmount::new(100));

    // Correct index: tempRep drops by 50 immediately, not just locked.
    let request = h
        .ledger
        .request_ai_validation(h.contributor, h.link, TokenAmount::new(50), 0)
        .await
        .unwrap();
    let balance = h
        .ledger
        .topic_balance(&h.contributor, h.topic)
        .await
        .unwrap();
    assert_eq!(balance.temp_rep, TokenAmount::new(50));
    assert_eq!(balance.locked_temp_rep, TokenAmount::ZERO);

    let req = h.ledger.ai_request(request).await.unwrap();
    assert_eq!(req.status, AiValidationStatus::Pending);
    assert_eq!(req.temp_rep_staked, TokenAmount::new(50));
    assert_eq!(req.request_index, 0);

    // The link counter advanced, so the next request needs index 1.
    assert_eq!(h.ledger.link(h.link).await.unwrap().ai_request_count, 1);
}

#[tokio::test]
async fn test_only_contributor_may_request() {
    let h = setup().await;
    let outsider = PublicKey::from_bytes([2; 32]);
    h.ledger.register_user(outsider).await.unwrap();
    h.ledger
        .initialize_user_topic_balance(outsider, h.topic)
        .await
        .unwrap();

    let err = h
        .ledger
        .request_ai_validation(outsider, h.link, TokenAmount::new(10), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, ProtocolError::NotSubmissionContributor));
}

#[tokio::test]
async fn test_request_cannot_exceed_free_temp_rep() {
    let h = setup().await;
    let err = h
        .ledger
        .request_ai_validation(h.contributor, h.link, TokenAmount::new(101), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, ProtocolError::Economics(_)));

    // Nothing was created.
    assert_eq!(h.ledger.list_ai_requests().await.len(), 0);
    assert_eq!(h.ledger.link(h.link).await.unwrap().ai_request_count, 0);
}

#[tokio::test]
async fn test_claim_is_single_winner_cas() {
    let h = setup().await;
    let request = h
        .ledger
        .request_ai_validation(h.contributor, h.link, TokenAmount::new(50), 0)
        .await
        .unwrap();

    // Only the configured oracle may claim.
    let stranger = PublicKey::from_bytes([9; 32]);
    assert!(matches!(
        h.ledger.claim_ai_validation(stranger, request).await,
        Err(ProtocolError::UnauthorizedOracle)
    ));

    h.ledger.claim_ai_validation(oracle(), request).await.unwrap();
    assert_eq!(
        h.ledger.ai_request(request).await.unwrap().status,
        AiValidationStatus::Processing
    );

    // A second claim loses while the first one is live.
    assert!(matches!(
        h.ledger.claim_ai_validation(oracle(), request).await,
        Err(ProtocolError::AiRequestAlreadyClaimed)
    ));
}

#[tokio::test]
async fn test_stale_claim_is_reclaimable() {
    let params = ProtocolParams {
        ai_claim_expiry: 0,
        ..ProtocolParams::default()
    };
    let h = setup_with_params(params).await;
    let request = h
        .ledger
        .request_ai_validation(h.contributor, h.link, TokenAmount::new(50), 0)
        .await
        .unwrap();

    h.ledger.claim_ai_validation(oracle(), request).await.unwrap();
    // With zero expiry the claim is immediately stale; a restarted agent
    // may take it over.
    h.ledger.claim_ai_validation(oracle(), request).await.unwrap();
    assert_eq!(
        h.ledger.ai_request(request).await.unwrap().status,
        AiValidationStatus::Processing
    );
}

#[tokio::test]
async fn test_ai_vote_adds_power_like_a_revealed_vote() {
    let h = setup().await;
    let request = h
        .ledger
        .request_ai_validation(h.contributor, h.link, TokenAmount::new(50), 0)
        .await
        .unwrap();
    h.ledger.claim_ai_validation(oracle(), request).await.unwrap();
    h.ledger
        .submit_ai_vote(oracle(), request, 0, VoteChoice::Yes)
        .await
        .unwrap();

    let link = h.ledger.link(h.link).await.unwrap();
    assert_eq!(link.yes_voting_power, TokenAmount::new(50));
    assert_eq!(link.no_voting_power, TokenAmount::ZERO);

    let req = h.ledger.ai_request(request).await.unwrap();
    assert_eq!(req.status, AiValidationStatus::Completed);
    assert_eq!(req.ai_decision, Some(VoteChoice::Yes));
    assert_eq!(req.ai_voting_power, TokenAmount::new(50));
}

#[tokio::test]
async fn scenario_d_fulfilling_a_completed_request_fails() {
    let h = setup().await;
    let request = h
        .ledger
        .request_ai_validation(h.contributor, h.link, TokenAmount::new(50), 0)
        .await
        .unwrap();
    h.ledger.claim_ai_validation(oracle(), request).await.unwrap();
    h.ledger
        .submit_ai_vote(oracle(), request, 0, VoteChoice::Yes)
        .await
        .unwrap();

    // Second submission attempt: status guard rejects it.
    let err = h
        .ledger
        .submit_ai_vote(oracle(), request, 0, VoteChoice::No)
        .await
        .unwrap_err();
    assert!(matches!(err, ProtocolError::InvalidAiRequestStatus));

    // Claiming a completed request fails too.
    assert!(matches!(
        h.ledger.claim_ai_validation(oracle(), request).await,
        Err(ProtocolError::InvalidAiRequestStatus)
    ));

    // Status and tallies unchanged.
    let req = h.ledger.ai_request(request).await.unwrap();
    assert_eq!(req.status, AiValidationStatus::Completed);
    assert_eq!(req.ai_decision, Some(VoteChoice::Yes));
    let link = h.ledger.link(h.link).await.unwrap();
    assert_eq!(link.yes_voting_power, TokenAmount::new(50));
    assert_eq!(link.no_voting_power, TokenAmount::ZERO);
}

#[tokio::test]
async fn test_unclaimed_request_cannot_be_fulfilled() {
    let h = setup().await;
    let request = h
        .ledger
        .request_ai_validation(h.contributor, h.link, TokenAmount::new(50), 0)
        .await
        .unwrap();

    // The claim transition is the gate: fulfilling straight from Pending
    // is rejected.
    let err = h
        .ledger
        .submit_ai_vote(oracle(), request, 0, VoteChoice::Yes)
        .await
        .unwrap_err();
    assert!(matches!(err, ProtocolError::InvalidAiRequestStatus));
}

#[tokio::test]
async fn test_fulfillment_index_gate() {
    let h = setup().await;
    let request = h
        .ledger
        .request_ai_validation(h.contributor, h.link, TokenAmount::new(50), 0)
        .await
        .unwrap();
    h.ledger.claim_ai_validation(oracle(), request).await.unwrap();

    let err = h
        .ledger
        .submit_ai_vote(oracle(), request, 7, VoteChoice::Yes)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::AiRequestIndexMismatch { expected: 0, provided: 7 }
    ));
}
