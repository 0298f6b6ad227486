pub mod message;
pub mod session;
pub mod stage;
pub mod submission;
