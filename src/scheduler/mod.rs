pub mod controller;
pub mod loop_worker;
pub mod task;

pub use controller::Scheduler;
pub use task::{PeriodicTask, TaskState};
