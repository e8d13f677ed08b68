pub mod advisor;
pub mod config;
pub mod error;
pub mod providers;
pub mod sample;

pub use advisor::{ResponseGenerator, fallback_response};
pub use error::AdvisorError;
