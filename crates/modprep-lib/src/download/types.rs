use crate::progress::ProgressSink;
use reqwest::Url;
use std::fmt;
use std::path::{Path, PathBuf};

pub type CompletionCallback = Box<dyn FnOnce() + Send>;

/// Everything needed to transfer one remote resource into a local file.
///
/// A job is consumed by [`Fetcher::fetch`](super::Fetcher::fetch); its progress
/// sink therefore never outlives a single transfer.
pub struct DownloadJob {
    pub(crate) source: Url,
    pub(crate) destination_dir: PathBuf,
    pub(crate) destination_name: String,
    pub(crate) start_message: Option<String>,
    pub(crate) finish_message: Option<String>,
    pub(crate) progress: Option<Box<dyn ProgressSink>>,
    pub(crate) on_complete: Option<CompletionCallback>,
}

impl DownloadJob {
    pub fn new(
        source: Url,
        destination_dir: impl Into<PathBuf>,
        destination_name: impl Into<String>,
    ) -> Self {
        Self {
            source,
            destination_dir: destination_dir.into(),
            destination_name: destination_name.into(),
            start_message: None,
            finish_message: None,
            progress: None,
            on_complete: None,
        }
    }

    pub fn with_start_message(mut self, message: impl Into<String>) -> Self {
        self.start_message = Some(message.into());
        self
    }

    pub fn with_finish_message(mut self, message: impl Into<String>) -> Self {
        self.finish_message = Some(message.into());
        self
    }

    pub fn with_progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Some(Box::new(sink));
        self
    }

    pub fn with_boxed_progress(mut self, sink: Option<Box<dyn ProgressSink>>) -> Self {
        self.progress = sink;
        self
    }

    pub fn on_complete(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn source(&self) -> &Url {
        &self.source
    }

    pub fn destination_dir(&self) -> &Path {
        &self.destination_dir
    }

    pub fn destination(&self) -> PathBuf {
        self.destination_dir.join(&self.destination_name)
    }
}

impl fmt::Debug for DownloadJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadJob")
            .field("source", &self.source.as_str())
            .field("destination_dir", &self.destination_dir)
            .field("destination_name", &self.destination_name)
            .field("start_message", &self.start_message)
            .field("finish_message", &self.finish_message)
            .field("progress", &self.progress.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}
