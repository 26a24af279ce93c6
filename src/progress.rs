//! For observing search and encode progress
//!
//! Reporting is purely observational; nothing a reporter does can change
//! which attempts run or which result is returned.

/// Emitted after every completed encode attempt of the search.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// 1-based index of the attempt that just finished.
    pub attempt: usize,
    /// Total surviving grid cells across the primary and fallback passes.
    pub total_attempts: usize,
    pub scale: f64,
    pub colors: u16,
    /// `None` during the primary pass, the reduced rate during fallback.
    pub frame_rate: Option<u32>,
    pub size_bytes: usize,
    /// Human-readable summary for display.
    pub message: String,
}

/// A trait that is used to report progress to some consumer.
pub trait ProgressReporter {
    /// Percent (0-100) of the encode attempt currently running.
    ///
    /// The first 5% covers palette sampling, the rest is per-frame encoding.
    fn encode_percent(&mut self, _percent: f32) {}

    /// Called once per finished attempt with its measured output size.
    fn attempt_done(&mut self, _event: &ProgressEvent) {}
}

/// No-op progress reporter
pub struct NoProgress {}

impl ProgressReporter for NoProgress {}

/// Implement the progress reporter trait for a progress bar,
/// advancing it one tick per finished attempt.
#[cfg(feature = "pbr")]
impl<T> ProgressReporter for pbr::ProgressBar<T> where T: std::io::Write {
    fn attempt_done(&mut self, event: &ProgressEvent) {
        self.message(&format!("{} ", event.message));
        self.inc();
    }
}
