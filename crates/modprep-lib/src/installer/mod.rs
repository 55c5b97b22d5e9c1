mod launcher;
mod runner;
mod state;

pub use launcher::{CommandLauncher, InstallerLauncher};
pub use runner::{InstallerError, InstallerRunner};
pub use state::{InstallPhase, InstallState, MarkerDirectory};
