pub mod actor;
pub mod session;

pub use actor::{Actor, ActorHistory};
pub use session::Session;
