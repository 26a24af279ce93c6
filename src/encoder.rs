//! Serializing palette-mapped frames into the GIF bitstream

use crate::error::GifResult;
use crate::frames::FrameSequence;
use crate::pacing::{Pacer, ENCODE_YIELD_EVERY};
use crate::palette::GlobalPalette;
use crate::progress::ProgressReporter;
use crate::Repeat;
use rgb::RGBA8;

/// GIF delays are in 10ms units; anything shorter is clamped up.
const MIN_DELAY_CS: u32 = 1;
/// Matches the longest delay browsers honor.
const MAX_DELAY_CS: u32 = 10_000;

/// Encode the whole sequence against one shared palette.
///
/// Each frame is remapped to its nearest palette indices (no
/// re-quantization), LZW pre-encoded and appended with its delay; the loop
/// count is written once before the first frame. The input sequence is not
/// mutated, and the same sequence and palette always produce byte-identical
/// output.
///
/// Progress is reported after each frame as `5 + done/total × 95` percent;
/// the first 5% is accounted to palette sampling.
pub fn encode_with_palette(seq: &FrameSequence, palette: &mut GlobalPalette, repeat: Repeat, pacer: &mut dyn Pacer, reporter: &mut dyn ProgressReporter) -> GifResult<Vec<u8>> {
    let width = u16::try_from(seq.width())?;
    let height = u16::try_from(seq.height())?;
    let total = seq.frame_count();

    let mut out = Vec::new();
    {
        let mut enc = gif::Encoder::new(&mut out, width, height, &[])?;
        enc.write_extension(gif::ExtensionData::Repetitions(repeat.into()))?;
        for (done, frame) in seq.frames().iter().enumerate() {
            let (pal, indexed) = palette.remap_frame(frame.image.as_ref())?;
            let gif_frame = indexed_frame(indexed, &pal, width, height, frame.duration_ms);
            enc.write_lzw_pre_encoded_frame(&gif_frame)?;
            reporter.encode_percent(5. + (done + 1) as f32 / total as f32 * 95.);
            if (done + 1) % ENCODE_YIELD_EVERY == 0 {
                pacer.yield_now();
            }
        }
    }
    Ok(out)
}

fn indexed_frame(buffer: Vec<u8>, pal: &[RGBA8], width: u16, height: u16, duration_ms: u32) -> gif::Frame<'static> {
    let transparent = pal.iter().position(|p| p.a == 0).map(|i| i as u8);

    let pal3: Vec<rgb::RGB8> = pal.iter().map(|p| p.rgb()).collect();
    let mut pal_bytes: Vec<u8> = rgb::bytemuck::cast_slice(&pal3).to_vec();
    // Color tables must be power-of-two sized
    if pal3.len() != 256 {
        let needed_size = 3 * pal3.len().max(2).next_power_of_two();
        pal_bytes.resize(needed_size, 0);
    }

    let mut frame = gif::Frame {
        delay: (((duration_ms + 5) / 10).clamp(MIN_DELAY_CS, MAX_DELAY_CS)) as u16,
        // Frames always cover the whole screen, but transparent pixels
        // must not show the previous frame through
        dispose: if transparent.is_some() { gif::DisposalMethod::Background } else { gif::DisposalMethod::Keep },
        transparent,
        needs_user_input: false,
        top: 0,
        left: 0,
        width,
        height,
        interlaced: false,
        palette: Some(pal_bytes),
        buffer: buffer.into(),
    };
    frame.make_lzw_pre_encoded();
    frame
}
