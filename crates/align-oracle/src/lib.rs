//! Oracle agent for the alignment voting protocol.
//!
//! A single logical writer holding the oracle signing capability. On a
//! fixed interval it discovers pending AI validation requests, wins each
//! one with the ledger's atomic claim transition, asks the external AI
//! judge for an accept/reject decision, and submits the decision as an
//! additional weighted vote. Judge failures fail safe toward rejection;
//! every other failure leaves the request on the ledger for a later tick.

pub mod agent;
pub mod client;
pub mod config;
pub mod judge;
pub mod logging;
pub mod metrics;

pub use agent::{AgentConfig, OracleAgent};
pub use client::{ClaimOutcome, InProcessLedgerClient, LedgerClient};
pub use config::OracleConfig;
pub use judge::{AiJudge, HttpJudge};
