pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod installer;
pub mod manifest;
pub mod pipeline;
pub mod progress;

pub use config::Config;
pub use error::ModPrepError;
