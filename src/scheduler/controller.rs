use anyhow::{bail, Result};
use log::{error, info};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::loop_worker::task_loop;
use super::task::{PeriodicTask, TaskState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
    Stopped,
}

struct TaskSlot {
    name: String,
    state_rx: watch::Receiver<TaskState>,
}

/// Runs a fixed set of independent periodic tasks under one start/stop lifecycle.
///
/// Each task gets its own tokio task; they share nothing but the cancellation
/// token. A scheduler is single-use: once stopped it cannot be started again.
pub struct Scheduler {
    pending: Vec<(Box<dyn PeriodicTask>, watch::Sender<TaskState>)>,
    slots: Vec<TaskSlot>,
    handles: Vec<(String, JoinHandle<()>)>,
    cancel_token: CancellationToken,
    phase: Phase,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            slots: Vec::new(),
            handles: Vec::new(),
            cancel_token: CancellationToken::new(),
            phase: Phase::Idle,
        }
    }

    pub fn register(&mut self, task: Box<dyn PeriodicTask>) -> Result<()> {
        if self.phase != Phase::Idle {
            bail!("tasks can only be registered before the scheduler starts");
        }
        if task.interval().is_zero() {
            bail!("task {} has a zero interval", task.name());
        }

        let (state_tx, state_rx) = watch::channel(TaskState::NotStarted);
        self.slots.push(TaskSlot {
            name: task.name().to_string(),
            state_rx,
        });
        self.pending.push((task, state_tx));
        Ok(())
    }

    /// Spawns every registered task. Must be called from within a tokio runtime.
    pub fn start(&mut self) -> Result<()> {
        match self.phase {
            Phase::Running => bail!("scheduler already running"),
            Phase::Stopped => bail!("scheduler was stopped; create a new one to run again"),
            Phase::Idle => {}
        }

        for (task, state_tx) in self.pending.drain(..) {
            let name = task.name().to_string();
            info!("Starting task: {name}");
            let handle = tokio::spawn(task_loop(task, self.cancel_token.clone(), state_tx));
            self.handles.push((name, handle));
        }

        self.phase = Phase::Running;
        info!("Started {} tasks", self.handles.len());
        Ok(())
    }

    /// Cancels every task and waits until each one has drained and stopped.
    ///
    /// Every task is joined even if another one panicked in its shutdown hook;
    /// those panics are reported in the returned error afterwards. Calling `stop`
    /// again is a no-op.
    pub async fn stop(&mut self) -> Result<()> {
        if self.phase == Phase::Stopped {
            return Ok(());
        }

        info!("Stopping tasks...");
        self.cancel_token.cancel();

        for (_, state_tx) in self.pending.drain(..) {
            state_tx.send_replace(TaskState::Stopped);
        }

        let mut failed = Vec::new();
        for (name, handle) in self.handles.drain(..) {
            match handle.await {
                Ok(()) => info!("Task stopped: {name}"),
                Err(join_err) => {
                    error!("Task {name} did not stop cleanly: {join_err}");
                    failed.push(name);
                }
            }
        }

        self.phase = Phase::Stopped;

        if !failed.is_empty() {
            bail!("tasks failed during shutdown: {}", failed.join(", "));
        }
        info!("All tasks stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn task_states(&self) -> Vec<(String, TaskState)> {
        self.slots
            .iter()
            .map(|slot| (slot.name.clone(), *slot.state_rx.borrow()))
            .collect()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if self.phase == Phase::Running {
            error!("Scheduler dropped while running; cancelling tasks without waiting");
            self.cancel_token.cancel();
        }
    }
}
