//! earbridge — real-time hearing assistance.
//!
//! Captures microphone input, applies adjustable linear amplification
//! (clamped to `[0.0, 2.0]`, 1.0 = unity) and routes the result to the
//! output device with low latency, while a non-destructive tap on the gain
//! stage's output feeds a live RMS→dB level meter.
//!
//! # Layout
//!
//! - [`audio`] — DSP primitives: gain cell, level meter, signal chain,
//!   passthrough ring buffer.
//! - [`session`] — route policy: 48 kHz / 5 ms session configuration,
//!   input-device selection, interruption semantics.
//! - [`engine`] — the graph controller, the [`AudioBackend`](engine::AudioBackend)
//!   platform seam and its `cpal` implementation, and the event surface.
//! - [`config`] — TOML settings read once at startup.
//!
//! The presentation layer (widgets, dialogs, permission prompts) is a
//! collaborator, not part of this crate: it drives the controller and drains
//! [`EngineEvent`](engine::EngineEvent)s from an `mpsc` receiver on the main
//! context.

pub mod audio;
pub mod config;
pub mod engine;
pub mod session;
