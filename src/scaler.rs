//! Resampling a whole sequence to a new resolution

use crate::error::GifResult;
use crate::frames::{binarize_alpha, Frame, FrameSequence};
use crate::pacing::{Pacer, SCALE_YIELD_EVERY};
use imgref::ImgVec;
use rgb::RGBA8;

/// Lanczos3-resample every frame to `target_width`×`target_height`.
///
/// Timing is untouched. Returns a copy of the input when the target equals
/// the current resolution. Note that aspect ratio is not preserved; callers
/// scale both axes by the same factor to keep it.
pub fn scale_frame_sequence(seq: &FrameSequence, target_width: usize, target_height: usize, pacer: &mut dyn Pacer) -> GifResult<FrameSequence> {
    if target_width == seq.width() && target_height == seq.height() {
        return Ok(seq.clone());
    }

    let mut resizer = resize::new(seq.width(), seq.height(), target_width, target_height,
        resize::Pixel::RGBA8, resize::Type::Lanczos3)?;

    let mut scaled = Vec::with_capacity(seq.frame_count());
    for (done, frame) in seq.frames().iter().enumerate() {
        debug_assert_eq!(frame.image.buf().len(), seq.width() * seq.height());
        let mut dst = vec![RGBA8::new(0, 0, 0, 0); target_width * target_height];
        resizer.resize(frame.image.buf(), &mut dst)?;
        let mut image = ImgVec::new(dst, target_width, target_height);
        // Lanczos reintroduces partial alpha
        binarize_alpha(&mut image);
        scaled.push(Frame { image, duration_ms: frame.duration_ms });
        if (done + 1) % SCALE_YIELD_EVERY == 0 {
            pacer.yield_now();
        }
    }
    Ok(FrameSequence::from_parts(scaled, target_width, target_height))
}
