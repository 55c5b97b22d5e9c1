mod orchestrator;

pub use orchestrator::{SetupPipeline, SyncReport};
