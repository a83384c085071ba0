use crate::client::{ClaimOutcome, LedgerClient};
use crate::judge::AiJudge;
use crate::metrics;
use align_protocol::AiValidationRequest;
use align_types::{AiValidationStatus, VoteChoice};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

/// Runtime knobs for the agent loop.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// How often the agent polls for pending requests.
    pub poll_interval: Duration,
    /// Maximum concurrent in-flight fulfillments. When the pool is
    /// saturated the remainder of a tick's batch stays on the ledger as
    /// `Pending` and is picked up by a later tick.
    pub worker_limit: usize,
    /// How long to wait for in-flight fulfillments at shutdown before
    /// aborting them.
    pub shutdown_grace: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(10_000),
            worker_limit: 8,
            shutdown_grace: Duration::from_secs(30),
        }
    }
}

/// The oracle agent: a single logical writer that discovers pending AI
/// validation requests, wins them with the ledger's claim
/// compare-and-swap, obtains a judgment and submits the decision.
///
/// Duplicate suppression lives entirely on the ledger: the claim
/// transition is the mutual exclusion primitive, so a restarted agent or a
/// second replica never double-processes a request.
pub struct OracleAgent {
    client: Arc<dyn LedgerClient>,
    judge: Arc<dyn AiJudge>,
    config: AgentConfig,
    workers: Arc<Semaphore>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl OracleAgent {
    pub fn new(client: Arc<dyn LedgerClient>, judge: Arc<dyn AiJudge>, config: AgentConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            client,
            judge,
            workers: Arc::new(Semaphore::new(config.worker_limit)),
            config,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Signal the run loop to stop. In-flight fulfillments get the
    /// configured grace period to finish.
    pub fn shutdown_handle(&self) -> watch::Sender<bool> {
        self.shutdown_tx.clone()
    }

    /// Run the poll loop until shutdown is signalled.
    pub async fn run(&self) -> Result<()> {
        info!(
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            worker_limit = self.config.worker_limit,
            "🚀 Oracle agent started"
        );

        let mut tasks: JoinSet<()> = JoinSet::new();
        let mut ticker = interval(self.config.poll_interval);
        let mut shutdown_rx = self.shutdown_rx.clone();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.dispatch_pending(&mut tasks).await {
                        metrics::POLL_ERRORS.inc();
                        warn!(error = %e, "⚠️ Poll tick failed");
                    }
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "❌ Fulfillment task panicked");
                    }
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        info!(in_flight = tasks.len(), "🛑 Oracle agent stopping");
        let drain = async {
            while tasks.join_next().await.is_some() {}
        };
        if tokio::time::timeout(self.config.shutdown_grace, drain)
            .await
            .is_err()
        {
            warn!("⚠️ Shutdown grace expired, aborting in-flight fulfillments");
            tasks.abort_all();
        }
        Ok(())
    }

    /// One poll: list requests, keep the pending ones, dispatch each into
    /// the bounded worker pool. Returns how many were dispatched.
    pub(crate) async fn dispatch_pending(&self, tasks: &mut JoinSet<()>) -> Result<usize> {
        let requests = self.client.list_ai_requests().await?;
        let pending: Vec<AiValidationRequest> = requests
            .into_iter()
            .filter(|request| request.status == AiValidationStatus::Pending)
            .collect();

        if !pending.is_empty() {
            info!(count = pending.len(), "🔍 Found pending AI validation requests");
        }

        let mut dispatched = 0;
        for request in pending {
            let permit = match self.workers.clone().try_acquire_owned() {
                Ok(permit) => permit,
                Err(_) => {
                    debug!("Worker pool saturated, leaving remainder for next tick");
                    break;
                }
            };

            let client = Arc::clone(&self.client);
            let judge = Arc::clone(&self.judge);
            metrics::REQUESTS_DISPATCHED.inc();
            dispatched += 1;
            tasks.spawn(async move {
                let _permit = permit;
                let id = request.id;
                if let Err(e) = process_request(client, judge, request).await {
                    metrics::FULFILLMENT_ERRORS.inc();
                    // The request stays on the ledger; a later tick will
                    // retry once the claim goes stale.
                    warn!(request = %id, error = %e, "⚠️ Fulfillment failed");
                }
            });
        }
        Ok(dispatched)
    }

    /// Dispatch one poll's worth of work and wait for all of it to finish.
    /// Used by tests and one-shot invocations.
    pub async fn drain_one_tick(&self) -> Result<usize> {
        let mut tasks = JoinSet::new();
        let dispatched = self.dispatch_pending(&mut tasks).await?;
        while tasks.join_next().await.is_some() {}
        Ok(dispatched)
    }
}

/// Fulfill a single request: claim, resolve context, judge, submit.
async fn process_request(
    client: Arc<dyn LedgerClient>,
    judge: Arc<dyn AiJudge>,
    request: AiValidationRequest,
) -> Result<()> {
    // Win the claim first; losing it means another agent (or an earlier
    // incarnation of this one) owns the request.
    match client.claim_ai_validation(request.id).await? {
        ClaimOutcome::Won => {}
        ClaimOutcome::Lost => {
            metrics::CLAIMS_LOST.inc();
            debug!(request = %request.id, "Claim lost, skipping");
            return Ok(());
        }
    }

    let link = client.link(request.link).await?;
    let topic = client.topic(link.topic).await?;
    let submission = client.submission(link.submission).await?;

    // Fail safe toward rejection: any judge failure becomes a No vote
    // rather than blocking the pipeline.
    let accept = match judge
        .evaluate(&topic.name, &topic.description, &submission.data_reference)
        .await
    {
        Ok(accept) => accept,
        Err(e) => {
            metrics::JUDGE_FAILURES.inc();
            warn!(request = %request.id, error = %e, "⚠️ AI judge failed, defaulting to rejection");
            false
        }
    };
    let decision = VoteChoice::from_accept(accept);

    client
        .submit_ai_vote(request.id, request.request_index, decision)
        .await?;

    metrics::VOTES_SUBMITTED
        .with_label_values(&[&decision.to_string()])
        .inc();
    info!(
        request = %request.id,
        link = %request.link,
        decision = %decision,
        "✅ AI vote submitted"
    );
    Ok(())
}
