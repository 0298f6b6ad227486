pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use backend::TrainerBackend;
pub use client::TrainerClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{ApiError, Result};
pub use types::*;
