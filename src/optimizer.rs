//! Byte-budget search over scale, color count and frame rate
//!
//! A greedy, quality-first linear scan: the grid is ordered from the best
//! looking combination down, and the first attempt that fits the budget
//! wins outright. This relies on smaller scale / fewer colors / lower
//! frame rate never producing a *larger* file, which holds in practice for
//! palette GIFs but is not formally guaranteed, hence a scan rather than a
//! binary search.

use crate::encoder::encode_with_palette;
use crate::error::GifResult;
use crate::frames::FrameSequence;
use crate::pacing::Pacer;
use crate::palette::sample_global_palette;
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::reducer::reduce_frame_rate;
use crate::scaler::scale_frame_sequence;
use crate::Settings;
use std::borrow::Cow;

/// Outer loop, highest quality first.
const SCALE_STEPS: [f64; 5] = [1., 0.75, 0.5, 0.375, 0.25];
/// Inner loop, highest quality first.
const COLOR_STEPS: [u16; 4] = [256, 128, 64, 32];
/// Second-pass rates once the scale×colors grid is exhausted.
const FALLBACK_FRAME_RATES: [u32; 3] = [15, 10, 8];
/// Downscales that would drop either side below this are skipped.
const MIN_SCALED_DIMENSION: usize = 50;

/// The winning configuration of a budget search, with its output bytes.
#[derive(Clone)]
pub struct EncodeAttempt {
    pub scale: f64,
    pub colors: u16,
    /// `None` when no frame-rate reduction was needed.
    pub frame_rate: Option<u32>,
    pub bytes: Vec<u8>,
}

impl EncodeAttempt {
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Find the highest-quality encode of `seq` that fits
/// `settings.budget_bytes`, or `None` when even the lowest grid point is
/// too big.
///
/// Tries the scale×colors grid at the source frame rate first, then once
/// per fallback frame rate below the source rate. Search stops at the
/// first attempt within budget; an over-budget result is never returned,
/// and exhaustion is a distinguished no-result, not an error — callers
/// should suggest raising the budget.
pub fn optimize_for_budget(seq: &FrameSequence, settings: &Settings, pacer: &mut dyn Pacer, reporter: &mut dyn ProgressReporter) -> GifResult<Option<EncodeAttempt>> {
    settings.validate()?;

    let total_attempts = planned_attempts(seq, settings);
    let colors_grid = color_steps(settings.colors);
    let mut attempt = 0;

    for frame_rate in pass_rates(seq) {
        let working: Cow<'_, FrameSequence> = match frame_rate {
            None => Cow::Borrowed(seq),
            Some(rate) => Cow::Owned(reduce_frame_rate(seq, rate)),
        };
        for &scale in &SCALE_STEPS {
            let (target_width, target_height) = scaled_dimensions(seq, scale);
            if below_quality_floor(scale, target_width, target_height) {
                continue;
            }
            // The scaled sequence is shared by the color loop and dropped
            // before the next scale is tried
            let scaled: Cow<'_, FrameSequence> = if scale >= 1. {
                Cow::Borrowed(working.as_ref())
            } else {
                Cow::Owned(scale_frame_sequence(working.as_ref(), target_width, target_height, pacer)?)
            };
            for &colors in &colors_grid {
                let mut palette = sample_global_palette(scaled.as_ref(), colors, settings.fast)?;
                reporter.encode_percent(5.);
                let bytes = encode_with_palette(scaled.as_ref(), &mut palette, settings.repeat, pacer, reporter)?;

                attempt += 1;
                let size_bytes = bytes.len();
                let fits = size_bytes as u64 <= settings.budget_bytes;
                reporter.attempt_done(&ProgressEvent {
                    attempt,
                    total_attempts,
                    scale,
                    colors,
                    frame_rate,
                    size_bytes,
                    message: attempt_message(target_width, target_height, colors, frame_rate, size_bytes, fits),
                });
                if fits {
                    return Ok(Some(EncodeAttempt { scale, colors, frame_rate, bytes }));
                }
            }
        }
    }
    Ok(None)
}

/// How many attempts a full (unsuccessful) search would run, for sizing
/// progress bars. The per-pass grid is identical in every pass, since the
/// quality floor depends only on the source resolution.
#[must_use]
pub fn planned_attempts(seq: &FrameSequence, settings: &Settings) -> usize {
    let colors_per_scale = color_steps(settings.colors).len();
    let per_pass: usize = SCALE_STEPS.iter().map(|&scale| {
        let (w, h) = scaled_dimensions(seq, scale);
        if below_quality_floor(scale, w, h) {
            0
        } else {
            colors_per_scale
        }
    }).sum();
    per_pass * pass_rates(seq).count()
}

/// Grid cells above the cap collapse onto it, so a 16-color cap still
/// tries one 16-color cell rather than emptying the inner loop.
fn color_steps(cap: u16) -> Vec<u16> {
    let mut steps: Vec<u16> = COLOR_STEPS.iter().map(|&c| c.min(cap)).collect();
    steps.dedup();
    steps
}

/// The primary pass plus one fallback pass per rate below the source rate.
fn pass_rates(seq: &FrameSequence) -> impl Iterator<Item = Option<u32>> {
    let source_rate = seq.frame_rate();
    std::iter::once(None).chain(
        FALLBACK_FRAME_RATES.iter()
            .filter(move |&&rate| f64::from(rate) < source_rate)
            .map(|&rate| Some(rate)),
    )
}

fn scaled_dimensions(seq: &FrameSequence, scale: f64) -> (usize, usize) {
    (
        ((seq.width() as f64 * scale).round() as usize).max(1),
        ((seq.height() as f64 * scale).round() as usize).max(1),
    )
}

/// The floor only applies to actual downscales; a source that is already
/// tiny still gets its full-size attempts.
fn below_quality_floor(scale: f64, width: usize, height: usize) -> bool {
    scale < 1. && (width < MIN_SCALED_DIMENSION || height < MIN_SCALED_DIMENSION)
}

fn attempt_message(width: usize, height: usize, colors: u16, frame_rate: Option<u32>, size_bytes: usize, fits: bool) -> String {
    let rate = frame_rate.map(|r| format!(" @{r}fps")).unwrap_or_default();
    let verdict = if fits { "fits" } else { "too big" };
    format!("{width}×{height}, {colors} colors{rate}: {size_bytes} bytes ({verdict})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::Frame;
    use imgref::ImgVec;
    use rgb::RGBA8;

    fn seq(frame_count: usize, w: usize, h: usize, duration_ms: u32) -> FrameSequence {
        let frames = (0..frame_count).map(|t| {
            let px = (0..w * h).map(|i| RGBA8::new(
                (i % w) as u8,
                (i / w) as u8,
                (t * 16) as u8,
                255,
            )).collect();
            Frame { image: ImgVec::new(px, w, h), duration_ms }
        }).collect();
        FrameSequence::new(frames).unwrap()
    }

    #[test]
    fn floor_skips_downscales_but_not_full_size() {
        assert!(!below_quality_floor(1., 40, 40));
        assert!(below_quality_floor(0.75, 45, 60));
        assert!(!below_quality_floor(0.5, 50, 50));
        assert!(below_quality_floor(0.25, 49, 100));
    }

    #[test]
    fn scaled_dimensions_round() {
        let s = seq(1, 401, 399, 100);
        assert_eq!(scaled_dimensions(&s, 0.5), (201, 200));
        assert_eq!(scaled_dimensions(&s, 1.), (401, 399));
    }

    #[test]
    fn fallback_rates_below_source_only() {
        let ten_fps = seq(4, 8, 8, 100);
        let rates: Vec<_> = pass_rates(&ten_fps).collect();
        assert_eq!(rates, [None, Some(8)]);

        let thirty_fps = seq(4, 8, 8, 33);
        let rates: Vec<_> = pass_rates(&thirty_fps).collect();
        assert_eq!(rates, [None, Some(15), Some(10), Some(8)]);
    }

    #[test]
    fn planned_attempts_counts_surviving_cells() {
        // 60×60 at 10fps: only scale 1.0 survives the floor, and the
        // fallback pass runs at 8fps only
        let s = seq(4, 60, 60, 100);
        let settings = Settings { budget_bytes: 1, ..Settings::default() };
        assert_eq!(planned_attempts(&s, &settings), 2 * 4);

        // Capping colors shrinks the grid
        let capped = Settings { budget_bytes: 1, colors: 64, ..Settings::default() };
        assert_eq!(planned_attempts(&s, &capped), 2 * 2);

        // A cap below the smallest cell still leaves one cell per scale
        let tiny_cap = Settings { budget_bytes: 1, colors: 16, ..Settings::default() };
        assert_eq!(planned_attempts(&s, &tiny_cap), 2 * 1);

        // 400×400 at 30fps: every scale survives, four passes
        let big = seq(4, 400, 400, 33);
        assert_eq!(planned_attempts(&big, &settings), 4 * 5 * 4);
    }

    #[test]
    fn color_grid_collapses_onto_the_cap() {
        assert_eq!(color_steps(256), [256, 128, 64, 32]);
        assert_eq!(color_steps(100), [100, 64, 32]);
        assert_eq!(color_steps(64), [64, 32]);
        assert_eq!(color_steps(32), [32]);
        assert_eq!(color_steps(16), [16]);
        assert_eq!(color_steps(8), [8]);
    }

    #[test]
    fn rejects_bad_configuration() {
        use crate::error::Error;
        use crate::pacing::NoPacing;
        use crate::progress::NoProgress;

        let s = seq(2, 16, 16, 100);
        let no_budget = Settings { budget_bytes: 0, ..Settings::default() };
        assert!(matches!(
            optimize_for_budget(&s, &no_budget, &mut NoPacing, &mut NoProgress {}),
            Err(Error::BadBudget)
        ));

        let bad_colors = Settings { budget_bytes: 1000, colors: 4, ..Settings::default() };
        assert!(matches!(
            optimize_for_budget(&s, &bad_colors, &mut NoPacing, &mut NoProgress {}),
            Err(Error::BadColorCount(4))
        ));
    }
}
