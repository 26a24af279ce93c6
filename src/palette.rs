//! Global palette sampling and application
//!
//! The defining optimization of this encoder: colors are quantized once
//! per encode attempt from a representative sample of the whole animation,
//! instead of once per frame. Frames are then only *remapped* to the
//! shared palette, which is much cheaper than re-quantizing each one.

use crate::error::{Error, GifResult};
use crate::frames::FrameSequence;
use crate::{MAX_COLORS, MIN_COLORS};
use imagequant::Attributes;
use imgref::ImgRef;
use rgb::RGBA8;

/// Per-frame cap on sampled pixels.
const MAX_SAMPLED_PIXELS: usize = 10_000;
/// At least this many frames contribute to the sample.
const MIN_SAMPLED_FRAMES: usize = 3;
/// Fraction of frames sampled at a uniform stride.
const SAMPLED_FRAME_FRACTION: f64 = 0.10;

/// One shared color table for a whole animation, plus the quantizer state
/// needed to map frames onto it.
pub struct GlobalPalette {
    attrs: Attributes,
    remap: imagequant::QuantizationResult,
    entries: Vec<RGBA8>,
}

impl GlobalPalette {
    /// The palette entries, at most the requested color count.
    #[must_use]
    pub fn entries(&self) -> &[RGBA8] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Map every pixel to its nearest palette index. No re-quantization
    /// happens here; the palette is fixed for the lifetime of this value.
    ///
    /// Returns the (dither-stable) palette to serialize with the frame and
    /// one index byte per pixel.
    pub(crate) fn remap_frame(&mut self, image: ImgRef<'_, RGBA8>) -> GifResult<(Vec<RGBA8>, Vec<u8>)> {
        debug_assert_eq!(image.width(), image.stride());
        let mut img = self.attrs.new_image(*image.buf(), image.width(), image.height(), 0.)?;
        let (pal, indexed) = self.remap.remapped(&mut img)?;
        debug_assert_eq!(indexed.len(), image.width() * image.height());
        Ok((pal, indexed))
    }
}

/// Build one palette representative of the whole sequence.
///
/// Samples `max(3, ceil(frame_count × 0.10))` frames at a uniform stride
/// (all of them if the sequence is shorter), takes every Nth pixel of each
/// so that no frame contributes more than ~10k pixels, and quantizes the
/// concatenated sample once. Sampling is strictly index-based, so the same
/// input always yields the same palette.
pub fn sample_global_palette(seq: &FrameSequence, colors: u16, fast: bool) -> GifResult<GlobalPalette> {
    if !(MIN_COLORS..=MAX_COLORS).contains(&colors) {
        return Err(Error::BadColorCount(colors));
    }

    let mut sample = Vec::new();
    for index in sampled_frame_indices(seq.frame_count()) {
        let image = &seq.frames()[index].image;
        let stride = pixel_stride(image.width() * image.height());
        sample.extend(image.buf().iter().copied().step_by(stride));
    }

    let mut attrs = Attributes::new();
    if fast {
        attrs.set_speed(10)?;
    }
    attrs.set_max_colors(u32::from(colors))?;
    let width = sample.len();
    let mut img = attrs.new_image(sample, width, 1, 0.)?;
    let mut remap = attrs.quantize(&mut img)?;
    remap.set_dithering_level(0.5)?;
    let entries = remap.palette_vec();
    Ok(GlobalPalette { attrs, remap, entries })
}

/// Uniform-stride frame selection for sampling.
pub(crate) fn sampled_frame_indices(frame_count: usize) -> impl Iterator<Item = usize> {
    let wanted = ((frame_count as f64 * SAMPLED_FRAME_FRACTION).ceil() as usize)
        .max(MIN_SAMPLED_FRAMES)
        .min(frame_count);
    (0..wanted).map(move |i| i * frame_count / wanted)
}

/// Every Nth pixel so at most ~10k pixels are taken per frame.
pub(crate) fn pixel_stride(pixel_count: usize) -> usize {
    (pixel_count / MAX_SAMPLED_PIXELS).max(1)
}
