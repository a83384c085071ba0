//! Prometheus metrics for the oracle agent pipeline.

use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

pub static REQUESTS_DISPATCHED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "align_oracle_requests_dispatched_total",
        "Pending AI requests dispatched to the worker pool"
    )
    .unwrap()
});

pub static CLAIMS_LOST: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "align_oracle_claims_lost_total",
        "Claim attempts lost to another claimant"
    )
    .unwrap()
});

pub static VOTES_SUBMITTED: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "align_oracle_votes_submitted_total",
        "AI votes submitted to the ledger",
        &["decision"]
    )
    .unwrap()
});

pub static JUDGE_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "align_oracle_judge_failures_total",
        "AI judge calls that failed and defaulted to rejection"
    )
    .unwrap()
});

pub static FULFILLMENT_ERRORS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "align_oracle_fulfillment_errors_total",
        "Request fulfillments that errored and were left for a later poll"
    )
    .unwrap()
});

pub static POLL_ERRORS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "align_oracle_poll_errors_total",
        "Poll ticks that failed to list requests"
    )
    .unwrap()
});
