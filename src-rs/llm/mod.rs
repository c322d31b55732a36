pub mod credentials;
pub mod dispatcher;
pub mod models;
pub mod prompts;
pub mod utils;

// Re-export config from crate root
pub use crate::config;
