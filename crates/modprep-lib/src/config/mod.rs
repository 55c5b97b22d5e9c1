mod loader;
mod model;

pub use loader::{ENV_PREFIX, load_config};
pub use model::{Config, ExtraFile, NetworkConfig, default_game_dir};

#[cfg(test)]
mod tests;
