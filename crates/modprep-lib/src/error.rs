use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModPrepError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Fetch(#[from] crate::download::FetchError),

    #[error(transparent)]
    Manifest(#[from] crate::manifest::ManifestError),

    #[error(transparent)]
    Installer(#[from] crate::installer::InstallerError),

    #[error("Invalid URL in {field}: {url} ({reason})")]
    InvalidUrl {
        field: &'static str,
        url: String,
        reason: String,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download task failed to complete: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Setup was cancelled")]
    Cancelled,

    #[error("Invalid command-line arguments: {details}")]
    CliArgumentValidation { details: String },

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] eyre::Report),
}
