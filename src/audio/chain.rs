//! The capture→gain→output signal chain and its metering tap.
//!
//! [`SignalChain`] is the portable piece of the audio graph: one gain stage
//! plus a non-destructive tap on the gain stage's output.  A backend calls
//! [`process`](SignalChain::process) from its real-time input callback; the
//! controller mutates the gain and toggles the tap from the control path.
//! The chain is shared as an `Arc` and persists across stream stop/start —
//! only the hardware stream toggles.
//!
//! Real-time constraints: one relaxed atomic load for the gain, no
//! allocation, and `try_lock` on the tap so the callback can never block on
//! a concurrent install/remove (a block's reading is skipped instead).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, TryLockError};

use super::gain::GainCell;
use super::level::level_db;

/// Observer invoked with one decibel reading per processed block.
///
/// Runs on the real-time audio thread — implementations must hand the value
/// off (channel send, atomic store) rather than doing UI work.
pub type LevelObserver = Box<dyn Fn(f32) + Send + Sync>;

// ---------------------------------------------------------------------------
// SignalChain
// ---------------------------------------------------------------------------

/// One gain stage and an optional metering tap on its output.
pub struct SignalChain {
    gain: Arc<GainCell>,
    /// Single-consumer level observer, present while the tap is installed.
    tap: Mutex<Option<LevelObserver>>,
    /// Fast-path flag so `process` skips the mutex entirely when no tap is
    /// installed.
    tap_installed: AtomicBool,
}

impl SignalChain {
    /// Wire a chain around the shared gain cell.
    pub fn new(gain: Arc<GainCell>) -> Self {
        Self {
            gain,
            tap: Mutex::new(None),
            tap_installed: AtomicBool::new(false),
        }
    }

    /// Apply the current gain to `input`, writing the result to `output`,
    /// then feed the post-gain block to the tap if one is installed.
    ///
    /// `input` and `output` must have equal length; `channels` is the
    /// interleave factor of both.  Empty blocks produce no level reading.
    pub fn process(&self, input: &[f32], output: &mut [f32], channels: u16) {
        debug_assert_eq!(input.len(), output.len());

        let gain = self.gain.get();
        for (out, sample) in output.iter_mut().zip(input) {
            *out = sample * gain;
        }

        if self.tap_installed.load(Ordering::Relaxed) {
            self.meter(output, channels);
        }
    }

    /// Convenience for backends that process in place.
    pub fn process_in_place(&self, block: &mut [f32], channels: u16) {
        let gain = self.gain.get();
        for sample in block.iter_mut() {
            *sample *= gain;
        }

        if self.tap_installed.load(Ordering::Relaxed) {
            self.meter(block, channels);
        }
    }

    fn meter(&self, block: &[f32], channels: u16) {
        // try_lock: an install/remove racing with the callback costs one
        // skipped reading, never a blocked audio thread.
        let tap = match self.tap.try_lock() {
            Ok(guard) => guard,
            // A panicking observer poisons the lock; metering keeps going.
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return,
        };
        if let (Some(observer), Some(db)) = (tap.as_ref(), level_db(block, channels)) {
            observer(db);
        }
    }

    /// Install the metering tap.
    ///
    /// Returns `false` (leaving the existing observer in place) when a tap is
    /// already installed — there is exactly one tap per chain.
    pub fn install_tap(&self, observer: LevelObserver) -> bool {
        let mut tap = self.tap.lock().unwrap_or_else(PoisonError::into_inner);
        if tap.is_some() {
            return false;
        }
        *tap = Some(observer);
        self.tap_installed.store(true, Ordering::Relaxed);
        true
    }

    /// Remove the metering tap.  No-op when none is installed.
    pub fn remove_tap(&self) {
        let mut tap = self.tap.lock().unwrap_or_else(PoisonError::into_inner);
        self.tap_installed.store(false, Ordering::Relaxed);
        *tap = None;
    }

    /// Whether the metering tap is currently installed.
    pub fn is_tap_installed(&self) -> bool {
        self.tap_installed.load(Ordering::Relaxed)
    }

    /// Set the amplification, clamped to `[0.0, 2.0]`; returns the applied
    /// value.
    pub fn set_gain(&self, value: f32) -> f32 {
        self.gain.set(value)
    }

    /// Current amplification.
    pub fn gain(&self) -> f32 {
        self.gain.get()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn chain_with_gain(gain: f32) -> SignalChain {
        SignalChain::new(Arc::new(GainCell::new(gain)))
    }

    /// Tap that forwards readings over a channel, like the controller's.
    fn channel_tap(chain: &SignalChain) -> mpsc::Receiver<f32> {
        let (tx, rx) = mpsc::channel();
        assert!(chain.install_tap(Box::new(move |db| {
            let _ = tx.send(db);
        })));
        rx
    }

    #[test]
    fn process_applies_gain() {
        let chain = chain_with_gain(2.0);
        let input = [0.1_f32, -0.2, 0.3];
        let mut output = [0.0_f32; 3];

        chain.process(&input, &mut output, 1);

        for (o, i) in output.iter().zip(&input) {
            assert!((o - i * 2.0).abs() < 1e-6);
        }
    }

    #[test]
    fn zero_gain_silences_output() {
        let chain = chain_with_gain(0.0);
        let input = [0.5_f32; 8];
        let mut output = [1.0_f32; 8];

        chain.process(&input, &mut output, 1);
        assert!(output.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn gain_change_is_picked_up_by_next_block() {
        let chain = chain_with_gain(1.0);
        let input = [0.25_f32; 4];
        let mut output = [0.0_f32; 4];

        chain.set_gain(0.5);
        chain.process(&input, &mut output, 1);
        assert!((output[0] - 0.125).abs() < 1e-6);
    }

    #[test]
    fn set_gain_clamps() {
        let chain = chain_with_gain(1.0);
        assert_eq!(chain.set_gain(3.5), 2.0);
        assert_eq!(chain.set_gain(-1.0), 0.0);
        assert_eq!(chain.gain(), 0.0);
    }

    #[test]
    fn tap_receives_post_gain_level() {
        let chain = chain_with_gain(2.0);
        let rx = channel_tap(&chain);

        // 0.25 input at 2x gain → post-gain amplitude 0.5 → −6.02 dB.
        let input = [0.25_f32; 256];
        let mut output = [0.0_f32; 256];
        chain.process(&input, &mut output, 1);

        let db = rx.try_recv().expect("tap should have fired");
        assert!((db - 20.0 * 0.5_f32.log10()).abs() < 1e-3, "got {db}");
    }

    #[test]
    fn empty_block_fires_no_reading() {
        let chain = chain_with_gain(1.0);
        let rx = channel_tap(&chain);

        chain.process(&[], &mut [], 1);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn no_tap_no_reading() {
        let chain = chain_with_gain(1.0);
        let mut output = [0.0_f32; 16];
        // Just must not panic with no observer present.
        chain.process(&[0.1; 16], &mut output, 1);
        assert!(!chain.is_tap_installed());
    }

    #[test]
    fn second_install_is_rejected() {
        let chain = chain_with_gain(1.0);
        let rx = channel_tap(&chain);

        // A second tap must not displace the first.
        assert!(!chain.install_tap(Box::new(|_| {})));

        let mut output = [0.0_f32; 8];
        chain.process(&[0.5; 8], &mut output, 1);
        assert!(rx.try_recv().is_ok(), "original tap must still fire");
    }

    #[test]
    fn remove_tap_stops_readings() {
        let chain = chain_with_gain(1.0);
        let rx = channel_tap(&chain);
        chain.remove_tap();
        assert!(!chain.is_tap_installed());

        let mut output = [0.0_f32; 8];
        chain.process(&[0.5; 8], &mut output, 1);
        assert!(rx.try_recv().is_err());

        // And can be re-installed afterwards.
        assert!(chain.install_tap(Box::new(|_| {})));
    }

    #[test]
    fn panicking_observer_does_not_poison_the_tap() {
        let chain = chain_with_gain(1.0);
        assert!(chain.install_tap(Box::new(|_| panic!("observer failure"))));

        let mut out = [0.0_f32; 8];
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            chain.process(&[0.5; 8], &mut out, 1);
        }));
        assert!(result.is_err(), "observer panic must propagate");

        // The control path keeps working on the poisoned lock.
        chain.remove_tap();
        let rx = channel_tap(&chain);

        // And so does metering.
        chain.process(&[0.5; 8], &mut out, 1);
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn process_in_place_matches_process() {
        let chain = chain_with_gain(1.5);
        let input = [0.2_f32, -0.4, 0.6];

        let mut out = [0.0_f32; 3];
        chain.process(&input, &mut out, 1);

        let mut in_place = input;
        chain.process_in_place(&mut in_place, 1);

        assert_eq!(out, in_place);
    }
}
