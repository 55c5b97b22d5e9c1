mod args;
mod params;
mod resolved_command;
mod setup;

pub use args::{Args, Command, Overrides, Step, parse_args};
pub use params::SetupParams;
pub use resolved_command::{ResolvedCommand, resolve_command};
pub use setup::run_setup;
