use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::log_worker;

use super::task::{PeriodicTask, TaskState};

/// Drives one task until `cancel_token` fires, then runs its shutdown hook.
///
/// The first tick of a tokio interval completes immediately, which gives the
/// initial cycle. Cancellation is only observed between cycles. A cycle that
/// panics counts as a failed cycle, so the shutdown hook still runs.
pub async fn task_loop(
    mut task: Box<dyn PeriodicTask>,
    cancel_token: CancellationToken,
    state_tx: watch::Sender<TaskState>,
) {
    let name = task.name().to_string();
    let mut ticker = tokio::time::interval(task.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    state_tx.send_replace(TaskState::Running);
    log_worker!(info, name, "started, interval {:?}", task.interval());

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                break;
            }
            _ = ticker.tick() => {
                match AssertUnwindSafe(task.run_cycle()).catch_unwind().await {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => log_worker!(error, name, "cycle failed: {:#}", err),
                    Err(_) => log_worker!(error, name, "cycle panicked"),
                }
            }
        }
    }

    state_tx.send_replace(TaskState::Draining);
    log_worker!(info, name, "draining");
    task.shutdown().await;
    state_tx.send_replace(TaskState::Stopped);
    log_worker!(info, name, "stopped");
}
