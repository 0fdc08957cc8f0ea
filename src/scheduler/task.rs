use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

/// A long-lived job driven by the [`Scheduler`](super::Scheduler).
///
/// `run_cycle` is called once right after start and then once per `interval`.
/// A cycle error is logged and the task carries on with its next tick.
#[async_trait]
pub trait PeriodicTask: Send + 'static {
    fn name(&self) -> &str;

    fn interval(&self) -> Duration;

    async fn run_cycle(&mut self) -> Result<()>;

    /// Runs once after cancellation is observed, before the task reports `Stopped`.
    async fn shutdown(&mut self) {}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskState {
    #[default]
    NotStarted,
    Running,
    Draining,
    Stopped,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::NotStarted => "not_started",
            TaskState::Running => "running",
            TaskState::Draining => "draining",
            TaskState::Stopped => "stopped",
        }
    }
}
