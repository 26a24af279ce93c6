//! Dropping frames to hit a lower playback rate

use crate::frames::{Frame, FrameSequence};

/// Drop frames to approximate `target_rate` fps while preserving the total
/// playback duration.
///
/// This walks the sequence with a fractional accumulator rather than a
/// fixed stride, so the drop cadence never drifts over long animations.
/// Kept frames get a constant `round(1000 / target_rate)`ms duration.
/// Returns a copy of the input when the target is at or above the source
/// rate (or zero).
#[must_use]
pub fn reduce_frame_rate(seq: &FrameSequence, target_rate: u32) -> FrameSequence {
    let source_rate = seq.frame_rate();
    if target_rate == 0 || f64::from(target_rate) >= source_rate {
        return seq.clone();
    }

    let ratio = source_rate / f64::from(target_rate);
    let duration_ms = (1000. / f64::from(target_rate)).round() as u32;
    let mut kept = Vec::with_capacity((seq.frame_count() as f64 / ratio).ceil() as usize + 1);
    // Seeded so that frame 0 is always kept
    let mut acc = ratio;
    for frame in seq.frames() {
        if acc >= ratio {
            acc -= ratio;
            kept.push(Frame { image: frame.image.clone(), duration_ms });
        }
        acc += 1.;
    }
    FrameSequence::from_parts(kept, seq.width(), seq.height())
}
