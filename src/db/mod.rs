pub mod connection;
pub mod helpers;
mod migrations;
pub mod models;
pub mod repositories;
pub mod store;

pub use connection::Database;
pub use models::{Actor, ActorHistory, Session};
pub use store::SessionStore;
