use super::ProgressSink;
use std::io::{self, Stdout, Write};

pub const DEFAULT_BUCKETS: u32 = 20;

/// Console progress bar that only redraws when the bucketed level changes.
///
/// One instance tracks one transfer; create a fresh reporter per job.
pub struct ProgressReporter<W: Write + Send = Stdout> {
    writer: W,
    buckets: u32,
    last_bucket: u32,
    last_percent: Option<u64>,
}

impl ProgressReporter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ProgressReporter<W> {
    pub fn new(writer: W) -> Self {
        Self::with_buckets(writer, DEFAULT_BUCKETS)
    }

    pub fn with_buckets(writer: W, buckets: u32) -> Self {
        Self {
            writer,
            buckets: buckets.max(1),
            last_bucket: 0,
            last_percent: None,
        }
    }

    pub fn last_bucket(&self) -> u32 {
        self.last_bucket
    }

    /// Percentage of the most recent report, if anything was drawn yet.
    pub fn last_percent(&self) -> Option<u64> {
        self.last_percent
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn level(&self, current: u64, total: u64) -> (u32, u64) {
        if total == 0 || current >= total {
            return (self.buckets, 100);
        }
        let bucket = (u128::from(self.buckets) * u128::from(current) / u128::from(total)) as u32;
        let percent = (100 * u128::from(current) / u128::from(total)) as u64;
        (bucket, percent)
    }

    fn render(&mut self, bucket: u32, percent: u64, finished: bool) -> io::Result<()> {
        let filled = bucket as usize;
        let empty = (self.buckets - bucket) as usize;
        write!(
            self.writer,
            "\rTotal Progress: |{}{}|  {}%",
            "#".repeat(filled),
            "_".repeat(empty),
            percent
        )?;
        if finished {
            writeln!(self.writer)?;
        }
        self.writer.flush()
    }
}

impl<W: Write + Send> ProgressSink for ProgressReporter<W> {
    fn on_progress(&mut self, current: u64, total: Option<u64>) {
        // Nothing to draw until the size is known.
        let Some(total) = total else {
            return;
        };

        let (bucket, percent) = self.level(current, total);
        if bucket <= self.last_bucket {
            return;
        }

        self.last_bucket = bucket;
        self.last_percent = Some(percent);
        tracing::trace!(current, total, bucket, "Progress bucket changed");

        if let Err(err) = self.render(bucket, percent, current >= total) {
            tracing::debug!("Failed to draw progress bar: {}", err);
        }
    }
}
