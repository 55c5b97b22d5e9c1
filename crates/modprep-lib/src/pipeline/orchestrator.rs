use crate::config::Config;
use crate::download::{DownloadJob, Fetcher, partial_path};
use crate::error::ModPrepError;
use crate::installer::{
    CommandLauncher, InstallState, InstallerLauncher, InstallerRunner, MarkerDirectory,
};
use crate::manifest::load_manifest;
use crate::progress::{ProgressReporter, ProgressSink};
use reqwest::Url;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Outcome of the mods step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// File names fetched during this run, in manifest order
    pub downloaded: Vec<String>,
    /// File names that were already present
    pub skipped: Vec<String>,
}

/// Sequences the provisioning steps. Every transfer completes before the next
/// one starts.
pub struct SetupPipeline<L> {
    config: Config,
    fetcher: Fetcher,
    launcher: L,
    cancel: CancellationToken,
}

impl SetupPipeline<CommandLauncher> {
    pub fn from_config(config: Config) -> Result<Self, ModPrepError> {
        let fetcher = Fetcher::new(&config.network)?;
        let launcher = CommandLauncher::java_jar(
            config.runtime.clone(),
            &config.installer_path(),
            config.installer_tag.clone(),
        );
        Ok(Self::new(config, fetcher, launcher))
    }
}

impl<L: InstallerLauncher> SetupPipeline<L> {
    pub fn new(config: Config, fetcher: Fetcher, launcher: L) -> Self {
        Self {
            config,
            fetcher,
            launcher,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn run(&self) -> Result<SyncReport, ModPrepError> {
        self.ensure_runtime_installed().await?;
        let report = self.sync_mods().await?;
        self.download_extra_files().await?;

        info!("Finished setting up modpack!");
        Ok(report)
    }

    pub async fn ensure_runtime_installed(&self) -> Result<(), ModPrepError> {
        info!("Checking runtime patch installation");
        let state = MarkerDirectory::new(self.config.install_marker());
        if state.is_installed() {
            info!(marker = %state.path().display(), "Runtime patch is already installed");
            return Ok(());
        }

        let installer_path = self.config.installer_path();
        if installer_path.exists() {
            info!(path = %installer_path.display(), "Using previously downloaded installer");
        } else {
            let url = parse_url("installer_url", &self.config.installer_url)?;
            self.fetch_with_retry(|| {
                DownloadJob::new(
                    url.clone(),
                    &self.config.installer_cache_dir,
                    &self.config.installer_name,
                )
                .with_start_message("Downloading installer . . .")
                .with_finish_message("Finished downloading installer!")
                .with_boxed_progress(self.progress_sink())
            })
            .await?;
        }

        info!("Running installer . . . make sure \"Install Client\" is selected, then click \"OK\"");
        InstallerRunner::new(state, &self.launcher)
            .with_max_attempts(self.config.installer_max_attempts)
            .with_cancellation(self.cancel.clone())
            .run_until_installed()
            .await?;

        Ok(())
    }

    pub async fn sync_mods(&self) -> Result<SyncReport, ModPrepError> {
        let manifest_url = parse_url("manifest_url", &self.config.manifest_url)?;
        let entries = load_manifest(self.fetcher.client(), &manifest_url).await?;
        info!("Got mod list with {} entries", entries.len());

        let mods_dir = self.config.mods_dir();
        let count = entries.len();
        let mut report = SyncReport::default();

        for (index, entry) in entries.into_iter().enumerate() {
            if mods_dir.join(&entry.file_name).exists() {
                info!(
                    "{} already exists in mods folder, continuing to next mod",
                    entry.file_name
                );
                report.skipped.push(entry.file_name);
                continue;
            }

            self.fetch_with_retry(|| {
                DownloadJob::new(entry.locator.clone(), &mods_dir, &entry.file_name)
                    .with_start_message(format!("Downloading: {} . . .", entry.file_name))
                    .with_finish_message(format!(
                        "({}/{}) Finished downloading {}!",
                        index + 1,
                        count,
                        entry.file_name
                    ))
                    .with_boxed_progress(self.progress_sink())
            })
            .await?;
            report.downloaded.push(entry.file_name);
        }

        info!(
            downloaded = report.downloaded.len(),
            skipped = report.skipped.len(),
            "Finished downloading mods"
        );
        Ok(report)
    }

    pub async fn download_extra_files(&self) -> Result<(), ModPrepError> {
        for extra in &self.config.extra_files {
            let url = parse_url("extra_files", &extra.url)?;
            self.fetch_with_retry(|| {
                DownloadJob::new(
                    url.clone(),
                    &self.config.target_base_dir,
                    &extra.file_name,
                )
                .with_start_message(format!("Downloading {} . . .", extra.label))
                .with_finish_message(format!("Finished downloading {}!", extra.label))
                .with_boxed_progress(self.progress_sink())
            })
            .await?;
        }

        info!("Finished downloading all options files!");
        Ok(())
    }

    fn progress_sink(&self) -> Option<Box<dyn ProgressSink>> {
        if self.config.show_progress {
            Some(Box::new(ProgressReporter::stdout()))
        } else {
            None
        }
    }

    /// Runs a job on its own task and waits for it. Failed transfers are
    /// retried with a fresh job built by `make_job`; cancellation aborts the
    /// task.
    async fn fetch_with_retry(
        &self,
        make_job: impl Fn() -> DownloadJob,
    ) -> Result<(), ModPrepError> {
        let network = &self.config.network;
        let mut retry = 0;

        loop {
            let job = make_job();
            let partial = partial_path(&job.destination());
            let fetcher = self.fetcher.clone();
            let mut task = tokio::spawn(async move { fetcher.fetch(job).await });

            let result = tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    task.abort();
                    // Wait for the task to drop its file handle before cleaning up.
                    let _ = task.await;
                    remove_partial(&partial).await;
                    return Err(ModPrepError::Cancelled);
                }

                joined = &mut task => joined?,
            };

            match result {
                Ok(()) => return Ok(()),
                Err(err) if retry < network.max_retries => {
                    retry += 1;
                    let backoff = network.retry_backoff(retry);
                    warn!(
                        url = err.url(),
                        retry,
                        "Download failed, retrying in {:?}: {}",
                        backoff,
                        err
                    );
                    tokio::select! {
                        biased;

                        _ = self.cancel.cancelled() => return Err(ModPrepError::Cancelled),
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "Removed partial download"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => warn!(path = %path.display(), "Could not remove partial download: {}", err),
    }
}

fn parse_url(field: &'static str, url: &str) -> Result<Url, ModPrepError> {
    Url::parse(url).map_err(|e| ModPrepError::InvalidUrl {
        field,
        url: url.to_string(),
        reason: e.to_string(),
    })
}
