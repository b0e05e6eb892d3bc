//! The audio engine — graph controller, platform backends and the event
//! surface the presentation layer consumes.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │             AudioGraphController                        │
//! │   start / stop / set_amplification / set_preferred_input│
//! │                                                        │
//! │   SessionPolicy ──decides──▶ AudioBackend (trait)      │
//! │   SignalChain   ◀──driven by real-time callback──┐     │
//! │                                                  │     │
//! └───────────────┬──────────────────────────────────┼─────┘
//!                 │ EngineEvent (mpsc)               │
//!                 ▼                                  │
//!        presentation layer                    CpalBackend
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::mpsc;
//! use earbridge::engine::{AudioGraphController, CpalBackend, EngineEvent};
//! use earbridge::session::SessionConfig;
//!
//! let (tx, rx) = mpsc::channel();
//! let backend = CpalBackend::new(tx.clone());
//! let mut controller = AudioGraphController::new(backend, SessionConfig::default(), tx);
//! controller.start(1.0)?;
//!
//! for event in rx.iter() {
//!     match event {
//!         EngineEvent::Level(db) => println!("{db:.1} dB"),
//!         EngineEvent::Error(e) => eprintln!("stream fault: {e}"),
//!         _ => {}
//!     }
//! }
//! # Ok::<(), earbridge::engine::EngineError>(())
//! ```

pub mod backend;
pub mod controller;
pub mod cpal_backend;
pub mod events;

pub use backend::AudioBackend;
pub use controller::{AudioGraphController, GraphState};
pub use cpal_backend::CpalBackend;
pub use events::{EngineError, EngineEvent};

// test-only re-export so controller tests can import the double without the
// full path.
#[cfg(test)]
pub use backend::MockBackend;
