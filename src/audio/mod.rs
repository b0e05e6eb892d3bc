//! Audio DSP primitives — gain, metering, the signal chain and the
//! passthrough buffer.
//!
//! # Signal path
//!
//! ```text
//! Microphone → input callback → SignalChain::process (gain × sample)
//!           → RingBuffer → output callback → Speaker
//!                       └→ metering tap → level_db → observer
//! ```
//!
//! Everything in this module is real-time safe at the point it is called
//! from the hardware callback: O(block size), no blocking locks, no
//! allocation.

pub mod buffer;
pub mod chain;
pub mod gain;
pub mod level;

pub use buffer::RingBuffer;
pub use chain::{LevelObserver, SignalChain};
pub use gain::{
    clamp_amplification, GainCell, MAX_AMPLIFICATION, MIN_AMPLIFICATION, UNITY_AMPLIFICATION,
};
pub use level::{level_db, silence_floor_db, LEVEL_EPSILON};
