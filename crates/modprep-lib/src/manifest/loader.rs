use super::types::ManifestEntry;
use reqwest::{Client, Response};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to fetch manifest from {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid manifest entry on line {line}: {entry:?} ({reason})")]
    InvalidEntry {
        line: usize,
        entry: String,
        reason: String,
    },
}

/// Splits a manifest body into entries, keeping file order.
///
/// Blank lines and lines starting with `#` are ignored.
pub fn parse_manifest(body: &str) -> Result<Vec<ManifestEntry>, ManifestError> {
    let mut entries = Vec::new();

    for (index, raw) in body.lines().enumerate() {
        let entry = raw.trim();
        if entry.is_empty() || entry.starts_with('#') {
            continue;
        }

        let invalid = |reason: String| ManifestError::InvalidEntry {
            line: index + 1,
            entry: entry.to_string(),
            reason,
        };

        let locator = Url::parse(entry).map_err(|e| invalid(e.to_string()))?;
        let file_name = ManifestEntry::file_name_of(entry);
        if matches!(file_name, "" | "." | "..") {
            return Err(invalid("no file name after the final '/'".to_string()));
        }
        if !ManifestEntry::is_plain_file_name(file_name) {
            return Err(invalid(format!("{file_name:?} is not a plain file name")));
        }

        entries.push(ManifestEntry {
            locator,
            file_name: file_name.to_string(),
        });
    }

    Ok(entries)
}

pub async fn load_manifest(client: &Client, url: &Url) -> Result<Vec<ManifestEntry>, ManifestError> {
    let transport = |source| ManifestError::Transport {
        url: url.to_string(),
        source,
    };

    info!("Getting mod list from {}", url);
    let body = client
        .get(url.clone())
        .send()
        .await
        .and_then(Response::error_for_status)
        .map_err(transport)?
        .text()
        .await
        .map_err(transport)?;

    let entries = parse_manifest(&body)?;
    debug!(url = %url, entries = entries.len(), "Parsed manifest");
    Ok(entries)
}
