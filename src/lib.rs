/*
 giffit — size-targeted animated GIF encoder

 This program is free software: you can redistribute it and/or modify
 it under the terms of the GNU Affero General Public License as
 published by the Free Software Foundation, either version 3 of the
 License, or (at your option) any later version.

 This program is distributed in the hope that it will be useful,
 but WITHOUT ANY WARRANTY; without even the implied warranty of
 MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 GNU Affero General Public License for more details.

 You should have received a copy of the GNU Affero General Public License
 along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

//! Encodes timed RGBA frames into an animated GIF no larger than a byte
//! budget, without the caller hand-tuning resolution, palette size or
//! frame rate.
//!
//! [`optimize_for_budget`] walks an ordered quality grid — scale, then
//! color count, then (as a fallback) frame rate — re-encoding until an
//! attempt fits the budget. Each attempt quantizes one palette from a
//! sample of the whole animation and only remaps frames onto it, which is
//! what makes the search affordable.
//!
//! ```no_run
//! use giffit::{optimize_for_budget, FrameSequence, Settings};
//! use giffit::pacing::NoPacing;
//! use giffit::progress::NoProgress;
//!
//! # fn demo(frames: Vec<giffit::Frame>) -> giffit::GifResult<()> {
//! let seq = FrameSequence::new(frames)?;
//! let settings = Settings { budget_bytes: 512 * 1024, ..Settings::default() };
//! match optimize_for_budget(&seq, &settings, &mut NoPacing, &mut NoProgress {})? {
//!     Some(attempt) => std::fs::write("out.gif", attempt.bytes)?,
//!     None => eprintln!("no configuration fits; raise the budget"),
//! }
//! # Ok(())
//! # }
//! ```

mod encoder;
mod error;
mod frames;
mod optimizer;
mod palette;
mod reducer;
mod scaler;
pub mod pacing;
pub mod progress;

pub use crate::encoder::encode_with_palette;
pub use crate::error::{Error, GifResult};
pub use crate::frames::{Frame, FrameSequence};
pub use crate::optimizer::{optimize_for_budget, planned_attempts, EncodeAttempt};
pub use crate::palette::{sample_global_palette, GlobalPalette};
pub use crate::reducer::reduce_frame_rate;
pub use crate::scaler::scale_frame_sequence;

pub use imgref::ImgVec;
pub use rgb::RGBA8;

/// Smallest accepted palette request.
pub const MIN_COLORS: u16 = 8;
/// Largest palette a GIF color table can hold.
pub const MAX_COLORS: u16 = 256;

/// How the encoded animation loops.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Repeat {
    #[default]
    Infinite,
    /// Play once plus this many repeats.
    Finite(u16),
}

impl From<Repeat> for gif::Repeat {
    fn from(r: Repeat) -> Self {
        match r {
            Repeat::Infinite => gif::Repeat::Infinite,
            Repeat::Finite(n) => gif::Repeat::Finite(n),
        }
    }
}

/// Knobs for the budget search.
#[derive(Copy, Clone)]
pub struct Settings {
    /// Largest acceptable output size in bytes. Required, > 0.
    pub budget_bytes: u64,
    /// Cap on palette size, 8-256. Search grid cells above the cap
    /// collapse onto it, so a 16-color cap searches 16-color encodes.
    pub colors: u16,
    /// Loop behavior written into the output.
    pub repeat: Repeat,
    /// Lower quality, but faster quantization.
    pub fast: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            budget_bytes: 0,
            colors: MAX_COLORS,
            repeat: Repeat::Infinite,
            fast: false,
        }
    }
}

impl Settings {
    /// Fails fast before any encode attempt runs.
    pub fn validate(&self) -> GifResult<()> {
        if self.budget_bytes == 0 {
            return Err(Error::BadBudget);
        }
        if !(MIN_COLORS..=MAX_COLORS).contains(&self.colors) {
            return Err(Error::BadColorCount(self.colors));
        }
        Ok(())
    }
}
