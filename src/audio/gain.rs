//! Lock-free amplification cell shared between the control path and the
//! real-time audio callback.
//!
//! The gain is a single `f32` stored as its bit pattern in an [`AtomicU32`].
//! The audio callback loads it once per block with `Ordering::Relaxed`; the
//! control path stores a new value the same way.  There is no invariant
//! spanning other state, so a block rendered with a one-block-stale gain is
//! acceptable.
//!
//! # Example
//!
//! ```rust
//! use earbridge::audio::GainCell;
//!
//! let gain = GainCell::new(1.0);
//! gain.set(3.5);                 // clamped to the 2x ceiling
//! assert_eq!(gain.get(), 2.0);
//! ```

use std::sync::atomic::{AtomicU32, Ordering};

/// Minimum amplification — full attenuation.
pub const MIN_AMPLIFICATION: f32 = 0.0;
/// Maximum amplification — 2x boost.
pub const MAX_AMPLIFICATION: f32 = 2.0;
/// Unity gain — the signal passes through unchanged.
pub const UNITY_AMPLIFICATION: f32 = 1.0;

/// Clamp a requested amplification into the supported `[0.0, 2.0]` range.
///
/// NaN maps to the minimum (silence) rather than propagating into the
/// signal path.
pub fn clamp_amplification(value: f32) -> f32 {
    if value.is_nan() {
        return MIN_AMPLIFICATION;
    }
    value.clamp(MIN_AMPLIFICATION, MAX_AMPLIFICATION)
}

// ---------------------------------------------------------------------------
// GainCell
// ---------------------------------------------------------------------------

/// Shared amplification scalar, clamped to `[0.0, 2.0]` on every write.
///
/// Stored as `f32` bits in an `AtomicU32` so the real-time callback can read
/// it without taking a lock.
#[derive(Debug)]
pub struct GainCell {
    bits: AtomicU32,
}

impl GainCell {
    /// Create a cell holding the clamped `initial` value.
    pub fn new(initial: f32) -> Self {
        Self {
            bits: AtomicU32::new(clamp_amplification(initial).to_bits()),
        }
    }

    /// Store a new amplification, clamped into `[0.0, 2.0]`.
    ///
    /// Returns the value actually applied.
    pub fn set(&self, value: f32) -> f32 {
        let clamped = clamp_amplification(value);
        self.bits.store(clamped.to_bits(), Ordering::Relaxed);
        clamped
    }

    /// Current amplification.
    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

impl Default for GainCell {
    fn default() -> Self {
        Self::new(UNITY_AMPLIFICATION)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    // ---- clamp_amplification ----------------------------------------------

    #[test]
    fn negative_clamps_to_zero() {
        assert_eq!(clamp_amplification(-1.0), 0.0);
    }

    #[test]
    fn above_ceiling_clamps_to_two() {
        assert_eq!(clamp_amplification(3.5), 2.0);
    }

    #[test]
    fn unity_passes_through() {
        assert_eq!(clamp_amplification(1.0), 1.0);
    }

    #[test]
    fn boundaries_are_inclusive() {
        assert_eq!(clamp_amplification(0.0), 0.0);
        assert_eq!(clamp_amplification(2.0), 2.0);
    }

    #[test]
    fn nan_maps_to_silence() {
        assert_eq!(clamp_amplification(f32::NAN), 0.0);
    }

    // ---- GainCell ----------------------------------------------------------

    #[test]
    fn new_clamps_initial_value() {
        let cell = GainCell::new(10.0);
        assert_eq!(cell.get(), 2.0);
    }

    #[test]
    fn set_returns_applied_value() {
        let cell = GainCell::default();
        assert_eq!(cell.set(-0.5), 0.0);
        assert_eq!(cell.set(1.25), 1.25);
        assert_eq!(cell.get(), 1.25);
    }

    #[test]
    fn default_is_unity() {
        assert_eq!(GainCell::default().get(), 1.0);
    }

    #[test]
    fn visible_across_threads() {
        let cell = Arc::new(GainCell::default());
        let writer = Arc::clone(&cell);

        std::thread::spawn(move || writer.set(0.5))
            .join()
            .unwrap();

        assert_eq!(cell.get(), 0.5);
    }
}
