use super::types::DownloadJob;
use crate::config::NetworkConfig;
use crate::progress::ProgressSink;
use futures::StreamExt;
use reqwest::header::{CONTENT_LENGTH, HeaderMap};
use reqwest::{Client, Response, Url};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to download {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to write {path} while downloading {url}: {source}")]
    Io {
        url: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to download {url}: expected {expected} bytes, received {received}")]
    LengthMismatch {
        url: String,
        expected: u64,
        received: u64,
    },
}

impl FetchError {
    /// The locator of the resource that failed.
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. }
            | FetchError::Io { url, .. }
            | FetchError::LengthMismatch { url, .. } => url,
        }
    }

    fn transport(url: &Url) -> impl FnOnce(reqwest::Error) -> Self + '_ {
        move |source| FetchError::Transport {
            url: url.to_string(),
            source,
        }
    }

    fn io<'a>(url: &'a Url, path: &'a Path) -> impl FnOnce(std::io::Error) -> Self + 'a {
        move |source| FetchError::Io {
            url: url.to_string(),
            path: path.to_path_buf(),
            source,
        }
    }
}

/// File the body is streamed into before it is moved onto `destination`.
pub fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

fn report(progress: &mut Option<Box<dyn ProgressSink>>, current: u64, total: Option<u64>) {
    if let Some(sink) = progress.as_mut() {
        sink.on_progress(current, total);
    }
}

/// Performs single-resource transfers over a shared HTTP client.
#[derive(Clone, Debug)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(network: &NetworkConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("modprep/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(network.connect_timeout())
            .read_timeout(network.read_timeout())
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn fetch(&self, job: DownloadJob) -> Result<(), FetchError> {
        let DownloadJob {
            source,
            destination_dir,
            destination_name,
            start_message,
            finish_message,
            mut progress,
            on_complete,
        } = job;

        tokio::fs::create_dir_all(&destination_dir)
            .await
            .map_err(FetchError::io(&source, &destination_dir))?;

        if let Some(message) = &start_message {
            info!("{}", message);
        }

        let probed_total = self.probe_size(&source).await?;

        let response = self
            .client
            .get(source.clone())
            .send()
            .await
            .and_then(Response::error_for_status)
            .map_err(FetchError::transport(&source))?;

        // The body's own length wins over the probe when both are present.
        let total = content_length(response.headers()).or(probed_total);

        let destination = destination_dir.join(&destination_name);
        let partial = partial_path(&destination);
        debug!(url = %source, output = %destination.display(), total = ?total, "Streaming");

        let transferred = match stream_to_file(&source, response, &partial, total, &mut progress).await
        {
            Ok(transferred) => transferred,
            Err(err) => {
                if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                    debug!(path = %partial.display(), "Could not remove partial file: {}", cleanup);
                }
                return Err(err);
            }
        };

        tokio::fs::rename(&partial, &destination)
            .await
            .map_err(FetchError::io(&source, &destination))?;
        debug!(url = %source, output = %destination.display(), bytes = transferred, "Downloaded");

        if let Some(message) = &finish_message {
            info!("{}", message);
        }
        if let Some(on_complete) = on_complete {
            on_complete();
        }

        Ok(())
    }

    /// Asks for the resource size without transferring the body.
    ///
    /// A non-successful answer leaves the size unknown; the GET decides
    /// whether the resource is actually reachable.
    async fn probe_size(&self, url: &Url) -> Result<Option<u64>, FetchError> {
        let response = self
            .client
            .head(url.clone())
            .send()
            .await
            .map_err(FetchError::transport(url))?;

        if !response.status().is_success() {
            debug!(url = %url, status = %response.status(), "Size probe rejected");
            return Ok(None);
        }

        Ok(content_length(response.headers()))
    }
}

async fn stream_to_file(
    url: &Url,
    response: Response,
    path: &Path,
    total: Option<u64>,
    progress: &mut Option<Box<dyn ProgressSink>>,
) -> Result<u64, FetchError> {
    let file = tokio::fs::File::create(path)
        .await
        .map_err(FetchError::io(url, path))?;
    let mut writer = BufWriter::new(file);
    let mut transferred = 0u64;

    report(progress, transferred, total);

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::transport(url))?;
        let received = transferred + chunk.len() as u64;

        if let Some(expected) = total {
            if received > expected {
                return Err(FetchError::LengthMismatch {
                    url: url.to_string(),
                    expected,
                    received,
                });
            }
        }

        writer
            .write_all(&chunk)
            .await
            .map_err(FetchError::io(url, path))?;
        transferred = received;
        report(progress, transferred, total);
    }

    writer.flush().await.map_err(FetchError::io(url, path))?;

    match total {
        Some(expected) if expected != transferred => Err(FetchError::LengthMismatch {
            url: url.to_string(),
            expected,
            received: transferred,
        }),
        Some(_) => Ok(transferred),
        None => {
            // The size is only known now; let the sink draw completion.
            report(progress, transferred, Some(transferred));
            Ok(transferred)
        }
    }
}
