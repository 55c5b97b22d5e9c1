use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const REPOSITORY_RAW_URL: &str = "https://github.com/InsomniaWins/ModDownloader2/raw/master";
const FORGE_VERSION: &str = "1.16.5-36.2.39";

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ExtraFile {
    pub url: String,
    /// Name of the file inside `target_base_dir`
    pub file_name: String,
    /// Human readable name used in start/finish messages
    pub label: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    pub connect_timeout_secs: u64,
    /// Maximum time between two reads of a response body
    pub read_timeout_secs: u64,
    /// Extra attempts per file after the first failure; 0 aborts immediately
    pub max_retries: u32,
    /// Delay before the first retry, doubled for every subsequent one
    pub retry_backoff_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            read_timeout_secs: 60,
            max_retries: 0,
            retry_backoff_ms: 500,
        }
    }
}

impl NetworkConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Backoff to wait before retry number `retry` (1-based).
    pub fn retry_backoff(&self, retry: u32) -> Duration {
        let factor = 1u64 << retry.saturating_sub(1).min(16);
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(factor))
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Newline-delimited list of mod download URLs
    pub manifest_url: String,
    pub installer_url: String,
    /// Directory the downloaded installer is cached in
    pub installer_cache_dir: PathBuf,
    pub installer_name: String,
    /// Game data directory, e.g. `~/.minecraft`
    pub target_base_dir: PathBuf,
    /// Mods directory, relative to `target_base_dir`
    pub mods_subdir: PathBuf,
    /// Directory name under `versions/` created by a successful install
    pub version_marker: String,
    /// Runtime used to launch the installer jar
    pub runtime: String,
    /// Prefix for installer output lines
    pub installer_tag: String,
    /// Unset means the installer is re-run until it succeeds
    pub installer_max_attempts: Option<u32>,
    pub extra_files: Vec<ExtraFile>,
    pub show_progress: bool,
    pub network: NetworkConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manifest_url: format!("{REPOSITORY_RAW_URL}/modlist.txt"),
            installer_url: format!(
                "https://maven.minecraftforge.net/net/minecraftforge/forge/{FORGE_VERSION}/forge-{FORGE_VERSION}-installer.jar"
            ),
            installer_cache_dir: PathBuf::from("forge-installer"),
            installer_name: "ForgeInstaller.jar".to_string(),
            target_base_dir: default_game_dir(),
            mods_subdir: PathBuf::from("mods"),
            version_marker: "1.16.5-forge-36.2.39".to_string(),
            runtime: "java".to_string(),
            installer_tag: "Forge Installer".to_string(),
            installer_max_attempts: None,
            extra_files: vec![
                ExtraFile {
                    url: format!("{REPOSITORY_RAW_URL}/options.txt"),
                    file_name: "options.txt".to_string(),
                    label: "Minecraft options".to_string(),
                },
                ExtraFile {
                    url: format!("{REPOSITORY_RAW_URL}/optionsof.txt"),
                    file_name: "optionsof.txt".to_string(),
                    label: "Optifine options".to_string(),
                },
            ],
            show_progress: true,
            network: NetworkConfig::default(),
        }
    }
}

impl Config {
    pub fn mods_dir(&self) -> PathBuf {
        self.target_base_dir.join(&self.mods_subdir)
    }

    pub fn installer_path(&self) -> PathBuf {
        self.installer_cache_dir.join(&self.installer_name)
    }

    /// Directory whose existence means the runtime patch is installed.
    pub fn install_marker(&self) -> PathBuf {
        self.target_base_dir
            .join("versions")
            .join(&self.version_marker)
    }
}

/// The launcher's data directory for the current platform.
pub fn default_game_dir() -> PathBuf {
    let base = if cfg!(windows) {
        std::env::var_os("APPDATA")
    } else {
        std::env::var_os("HOME")
    };

    match base {
        Some(base) => PathBuf::from(base).join(".minecraft"),
        None => PathBuf::from(".minecraft"),
    }
}
