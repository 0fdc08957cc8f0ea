pub mod actors;
pub mod sessions;
