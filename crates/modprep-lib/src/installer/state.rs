use std::fmt;
use std::path::{Path, PathBuf};

/// Answers "is the runtime patch installed?".
pub trait InstallState {
    fn is_installed(&self) -> bool;
}

impl<F> InstallState for F
where
    F: Fn() -> bool,
{
    fn is_installed(&self) -> bool {
        self()
    }
}

/// Installed iff a version directory created by the installer exists.
#[derive(Clone, Debug)]
pub struct MarkerDirectory {
    path: PathBuf,
}

impl MarkerDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl InstallState for MarkerDirectory {
    fn is_installed(&self) -> bool {
        self.path.is_dir()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstallPhase {
    NotInstalled,
    InstallerRunning,
    Installed,
}

impl fmt::Display for InstallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstallPhase::NotInstalled => "not-installed",
            InstallPhase::InstallerRunning => "installer-running",
            InstallPhase::Installed => "installed",
        };
        f.write_str(name)
    }
}
