//! Turns successive online rosters into stored presence sessions.

pub mod poller;

pub use poller::{PollSummary, PresencePoller, TASK_NAME};
