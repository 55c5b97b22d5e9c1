use super::launcher::InstallerLauncher;
use super::state::{InstallPhase, InstallState};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum InstallerError {
    #[error("Failed to launch installer with {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed while waiting for installer {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Installer run was cancelled")]
    Cancelled,

    #[error("Runtime patch is still not installed after {attempts} installer runs")]
    AttemptsExhausted { attempts: u32 },
}

/// Re-runs the installer until the install state reports success.
///
/// Unbounded by default, since every run waits on the user. The loop stops
/// early on cancellation or once `max_attempts` runs have failed.
pub struct InstallerRunner<S, L> {
    state: S,
    launcher: L,
    max_attempts: Option<u32>,
    cancel: CancellationToken,
}

impl<S: InstallState, L: InstallerLauncher> InstallerRunner<S, L> {
    pub fn new(state: S, launcher: L) -> Self {
        Self {
            state,
            launcher,
            max_attempts: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns the number of installer runs it took.
    pub async fn run_until_installed(&self) -> Result<u32, InstallerError> {
        let mut phase = InstallPhase::NotInstalled;
        let mut attempts = 0u32;

        loop {
            if let Some(max_attempts) = self.max_attempts {
                if attempts >= max_attempts {
                    return Err(InstallerError::AttemptsExhausted { attempts });
                }
            }

            phase = transition(phase, InstallPhase::InstallerRunning);
            attempts += 1;

            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    info!(attempt = attempts, "Installer cancelled");
                    return Err(InstallerError::Cancelled);
                }

                result = self.launcher.launch() => result?,
            }

            if self.state.is_installed() {
                transition(phase, InstallPhase::Installed);
                info!(attempts, "Finished installing runtime patch");
                return Ok(attempts);
            }

            phase = transition(phase, InstallPhase::NotInstalled);
            warn!(
                attempt = attempts,
                "Something went wrong installing the runtime patch, running installer again"
            );
        }
    }
}

fn transition(from: InstallPhase, to: InstallPhase) -> InstallPhase {
    debug!(%from, %to, "Installer state change");
    to
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct CountingLauncher {
        launches: AtomicU32,
    }

    impl InstallerLauncher for CountingLauncher {
        async fn launch(&self) -> Result<(), InstallerError> {
            self.launches.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct HangingLauncher;

    impl InstallerLauncher for HangingLauncher {
        async fn launch(&self) -> Result<(), InstallerError> {
            std::future::pending().await
        }
    }

    struct BrokenLauncher;

    impl InstallerLauncher for BrokenLauncher {
        async fn launch(&self) -> Result<(), InstallerError> {
            Err(InstallerError::Spawn {
                program: "java".to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }
    }

    /// Reports "not installed" for the first `failures` checks.
    fn installed_after(failures: u32) -> (Arc<AtomicU32>, impl Fn() -> bool) {
        let checks = Arc::new(AtomicU32::new(0));
        let counter = checks.clone();
        (checks, move || counter.fetch_add(1, Ordering::SeqCst) >= failures)
    }

    #[tokio::test]
    async fn test_runs_until_predicate_holds() {
        let (checks, state) = installed_after(2);
        let runner = InstallerRunner::new(state, CountingLauncher::default());

        let attempts = runner.run_until_installed().await.unwrap();

        assert_eq!(attempts, 3);
        assert_eq!(runner.launcher.launches.load(Ordering::SeqCst), 3);
        assert_eq!(checks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_single_successful_run() {
        let (_, state) = installed_after(0);
        let runner = InstallerRunner::new(state, CountingLauncher::default());

        assert_eq!(runner.run_until_installed().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_attempt_bound() {
        let (_, state) = installed_after(u32::MAX);
        let runner = InstallerRunner::new(state, CountingLauncher::default())
            .with_max_attempts(Some(4));

        let err = runner.run_until_installed().await.unwrap_err();

        assert!(matches!(err, InstallerError::AttemptsExhausted { attempts: 4 }));
        assert_eq!(runner.launcher.launches.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_running_installer() {
        let (_, state) = installed_after(u32::MAX);
        let cancel = CancellationToken::new();
        let runner = InstallerRunner::new(state, HangingLauncher).with_cancellation(cancel.clone());

        let trigger = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel.cancel();
        });

        let err = runner.run_until_installed().await.unwrap_err();
        trigger.await.unwrap();
        assert!(matches!(err, InstallerError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancelled_before_start_launches_nothing() {
        let (_, state) = installed_after(0);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let runner =
            InstallerRunner::new(state, CountingLauncher::default()).with_cancellation(cancel);

        let err = runner.run_until_installed().await.unwrap_err();

        assert!(matches!(err, InstallerError::Cancelled));
        assert_eq!(runner.launcher.launches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_spawn_failure_stops_the_loop() {
        let (checks, state) = installed_after(u32::MAX);
        let runner = InstallerRunner::new(state, BrokenLauncher);

        let err = runner.run_until_installed().await.unwrap_err();

        assert!(matches!(err, InstallerError::Spawn { .. }));
        assert_eq!(checks.load(Ordering::SeqCst), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_creating_marker_installs() {
        use crate::installer::{CommandLauncher, MarkerDirectory};

        let temp_dir = tempfile::tempdir().unwrap();
        let marker = temp_dir.path().join("versions").join("1.16.5-forge-36.2.39");
        let launcher = CommandLauncher::new(
            "mkdir",
            vec!["-p".to_string(), marker.to_string_lossy().into_owned()],
            "Forge Installer",
        );
        let runner = InstallerRunner::new(MarkerDirectory::new(&marker), launcher);

        assert_eq!(runner.run_until_installed().await.unwrap(), 1);
        assert!(marker.is_dir());
    }
}
