mod reporter;

pub use reporter::{DEFAULT_BUCKETS, ProgressReporter};

/// Receives the cumulative byte count of a single transfer.
///
/// `total` is `None` while the size of the resource is unknown. Calls for one
/// transfer always carry a non-decreasing `current`.
pub trait ProgressSink: Send {
    fn on_progress(&mut self, current: u64, total: Option<u64>);
}

impl<F> ProgressSink for F
where
    F: FnMut(u64, Option<u64>) + Send,
{
    fn on_progress(&mut self, current: u64, total: Option<u64>) {
        self(current, total)
    }
}
