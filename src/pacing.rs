//! Cooperative yielding during long per-frame loops
//!
//! Encoding and scaling run on a single logical worker. Hosts that need to
//! stay responsive (a UI thread, an event loop) can inject a [`Pacer`] that
//! cedes control between small batches of frames. This is advisory pacing,
//! not concurrency: the worker resumes exactly where it left off, with no
//! observable state change.

/// Called between batches of frames to let the host environment run.
pub trait Pacer {
    fn yield_now(&mut self);
}

/// No-op pacer for batch use, e.g. a CLI that owns the whole thread.
pub struct NoPacing;

impl Pacer for NoPacing {
    fn yield_now(&mut self) {}
}

/// Lets other OS threads run between frame batches.
pub struct ThreadYield;

impl Pacer for ThreadYield {
    fn yield_now(&mut self) {
        std::thread::yield_now();
    }
}

/// Encode loops yield after this many frames.
pub(crate) const ENCODE_YIELD_EVERY: usize = 5;
/// Scaling loops yield after this many frames.
pub(crate) const SCALE_YIELD_EVERY: usize = 3;
