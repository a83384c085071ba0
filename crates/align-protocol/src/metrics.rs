//! Prometheus metrics for the voting and AI-validation state machine.

use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec,
};

pub static SUBMISSIONS_CREATED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "align_protocol_submissions_created_total",
        "Total submissions created"
    )
    .unwrap()
});

pub static VOTES_COMMITTED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "align_protocol_votes_committed_total",
        "Total vote commitments created"
    )
    .unwrap()
});

pub static VOTES_REVEALED: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "align_protocol_votes_revealed_total",
        "Total votes revealed",
        &["choice"]
    )
    .unwrap()
});

pub static SUBMISSIONS_FINALIZED: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "align_protocol_submissions_finalized_total",
        "Total submission finalizations",
        &["outcome"]
    )
    .unwrap()
});

pub static VOTES_FINALIZED: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "align_protocol_votes_finalized_total",
        "Total per-validator vote finalizations",
        &["result"]
    )
    .unwrap()
});

pub static AI_REQUESTS_CREATED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "align_protocol_ai_requests_created_total",
        "Total AI validation requests created"
    )
    .unwrap()
});

pub static AI_CLAIMS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "align_protocol_ai_claims_total",
        "AI validation request claim attempts",
        &["result"]
    )
    .unwrap()
});

pub static AI_VOTES_SUBMITTED: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "align_protocol_ai_votes_submitted_total",
        "AI votes recorded on the ledger",
        &["decision"]
    )
    .unwrap()
});
