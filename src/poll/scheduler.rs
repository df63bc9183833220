// src/poll/scheduler.rs
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::poll::{PollEngine, TickOutcome};
use crate::sink::SignalSink;
use crate::transport::Transport;

#[derive(Clone, Copy, Debug)]
pub struct SchedulerCfg {
    pub polling_interval_secs: u64,
    pub retry_interval_secs: u64,
    /// Transient retries attempted within one tick before handing the cycle
    /// back to the polling interval. The parked request survives the burst
    /// and resumes unchanged on the next tick.
    pub retry_burst: u32,
}

/// Spawn the polling loop: one cycle per interval tick, with a bounded
/// retry burst on transient failures. The engine lives on this task, which
/// is what guarantees at most one in-flight cycle per query.
pub fn spawn_poller<T, S>(mut engine: PollEngine<T, S>, cfg: SchedulerCfg) -> JoinHandle<()>
where
    T: Transport + 'static,
    S: SignalSink + 'static,
{
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(Duration::from_secs(cfg.polling_interval_secs.max(1)));
        loop {
            ticker.tick().await;
            run_tick_burst(&mut engine, cfg).await;
        }
    })
}

/// Drive one scheduled tick to a terminal outcome or retry-budget exhaustion.
pub async fn run_tick_burst<T, S>(engine: &mut PollEngine<T, S>, cfg: SchedulerCfg)
where
    T: Transport,
    S: SignalSink,
{
    let mut retries = 0u32;
    loop {
        match engine.tick().await {
            TickOutcome::Completed { fresh, pages } => {
                tracing::info!(
                    target: "poller",
                    fresh,
                    pages,
                    "poll cycle complete"
                );
                break;
            }
            TickOutcome::Skipped => break,
            TickOutcome::Retry => {
                if retries >= cfg.retry_burst {
                    tracing::warn!(
                        target: "poller",
                        retries,
                        "retry budget exhausted; cycle resumes on the next poll tick"
                    );
                    break;
                }
                retries += 1;
                tokio::time::sleep(Duration::from_secs(cfg.retry_interval_secs)).await;
            }
        }
    }
}
