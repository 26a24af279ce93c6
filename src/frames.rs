//! The shared animation data model
//!
//! A [`FrameSequence`] is an ordered list of timed RGBA frames with one
//! width/height for the whole animation. Sequences are read-only once
//! built; scaling, frame dropping and palette application all return new
//! sequences instead of mutating in place.

use crate::error::{Error, GifResult};
use imgref::ImgVec;
use rgb::RGBA8;

/// One timed pixel buffer of an animation.
#[derive(Clone)]
pub struct Frame {
    /// Contiguous RGBA pixels.
    pub image: ImgVec<RGBA8>,
    /// Display duration, at least 1ms. The encoder clamps to a 10ms
    /// minimum to avoid pathological playback rates.
    pub duration_ms: u32,
}

/// An ordered list of frames sharing one width and height.
#[derive(Clone)]
pub struct FrameSequence {
    frames: Vec<Frame>,
    width: usize,
    height: usize,
}

impl FrameSequence {
    /// Validates dimensions and durations, and snaps partial alpha to
    /// fully opaque or fully transparent (GIF has 1-bit transparency).
    pub fn new(mut frames: Vec<Frame>) -> GifResult<Self> {
        let first = frames.first().ok_or(Error::NoFrames)?;
        let (width, height) = (first.image.width(), first.image.height());
        for (i, f) in frames.iter().enumerate() {
            if f.image.width() != width || f.image.height() != height {
                return Err(Error::WrongSize(format!(
                    "Frame {} has wrong size ({}×{}, expected {}×{})",
                    i + 1, f.image.width(), f.image.height(), width, height)));
            }
            if f.duration_ms == 0 {
                return Err(Error::BadDuration);
            }
        }
        for f in &mut frames {
            binarize_alpha(&mut f.image);
        }
        Ok(Self { frames, width, height })
    }

    /// For sequences derived from an already-validated one.
    pub(crate) fn from_parts(frames: Vec<Frame>, width: usize, height: usize) -> Self {
        debug_assert!(!frames.is_empty());
        debug_assert!(frames.iter().all(|f| f.image.width() == width && f.image.height() == height));
        Self { frames, width, height }
    }

    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn total_duration_ms(&self) -> u64 {
        self.frames.iter().map(|f| u64::from(f.duration_ms)).sum()
    }

    /// Source playback rate in frames per second, from the average duration.
    #[must_use]
    pub fn frame_rate(&self) -> f64 {
        1000. * self.frame_count() as f64 / self.total_duration_ms() as f64
    }
}

const DITHER: [u8; 64] = [
 0*2+8,48*2+8,12*2+8,60*2+8, 3*2+8,51*2+8,15*2+8,63*2+8,
32*2+8,16*2+8,44*2+8,28*2+8,35*2+8,19*2+8,47*2+8,31*2+8,
 8*2+8,56*2+8, 4*2+8,52*2+8,11*2+8,59*2+8, 7*2+8,55*2+8,
40*2+8,24*2+8,36*2+8,20*2+8,43*2+8,27*2+8,39*2+8,23*2+8,
 2*2+8,50*2+8,14*2+8,62*2+8, 1*2+8,49*2+8,13*2+8,61*2+8,
34*2+8,18*2+8,46*2+8,30*2+8,33*2+8,17*2+8,45*2+8,29*2+8,
10*2+8,58*2+8, 6*2+8,54*2+8, 9*2+8,57*2+8, 5*2+8,53*2+8,
42*2+8,26*2+8,38*2+8,22*2+8,41*2+8,25*2+8,37*2+8,21*2+8];

/// Make transparency binary with an 8×8 ordered dither.
pub(crate) fn binarize_alpha(image: &mut ImgVec<RGBA8>) {
    for (y, row) in image.rows_mut().enumerate() {
        for (x, px) in row.iter_mut().enumerate() {
            if px.a < 255 {
                px.a = if px.a < DITHER[(y & 7) * 8 + (x & 7)] { 0 } else { 255 };
            }
        }
    }
}
