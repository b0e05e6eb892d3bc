//! RMS level metering for the live input meter.
//!
//! [`level_db`] converts one block of interleaved `f32` samples into a single
//! decibel reading.  It runs inside the real-time audio callback, so it is
//! O(block size), allocation-free and never blocks.
//!
//! # Example
//!
//! ```rust
//! use earbridge::audio::level_db;
//!
//! // A constant 0.5 signal has RMS 0.5 → 20·log10(0.5) ≈ −6.02 dB.
//! let block = vec![0.5_f32; 1024];
//! let db = level_db(&block, 1).unwrap();
//! assert!((db - 20.0 * 0.5_f32.log10()).abs() < 1e-4);
//! ```

/// Floor fed to `log10` so silence yields a finite reading instead of −∞.
///
/// `f32::EPSILON` matches the `ulpOfOne` floor used by the original engine;
/// all-zero blocks therefore read `20·log10(ε) ≈ −138.5 dB`.
pub const LEVEL_EPSILON: f32 = f32::EPSILON;

/// Decibel reading for an all-silent block — the meter's floor.
pub fn silence_floor_db() -> f32 {
    20.0 * LEVEL_EPSILON.log10()
}

/// Compute the RMS level of an interleaved block and convert it to decibels.
///
/// Per channel the mean of squared samples is taken over the block's frames;
/// the per-channel means are averaged and square-rooted to get the RMS, then
/// converted via `20·log10(max(rms, ε))`.  For interleaved data with equal
/// frame counts per channel this collapses to the mean square over the whole
/// slice, which is what is computed here.
///
/// Returns `None` for an empty block (zero frames) — no reading is produced,
/// matching the meter contract that silence-of-length-zero is skipped, not
/// reported as zero.  `channels == 0` is treated the same way.
pub fn level_db(samples: &[f32], channels: u16) -> Option<f32> {
    if samples.is_empty() || channels == 0 {
        return None;
    }

    let mean_sq = samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32;
    let rms = mean_sq.sqrt();

    Some(20.0 * rms.max(LEVEL_EPSILON).log10())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
