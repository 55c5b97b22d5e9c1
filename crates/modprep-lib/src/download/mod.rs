mod fetcher;
mod types;

pub use fetcher::{FetchError, Fetcher, partial_path};
pub use types::{CompletionCallback, DownloadJob};
