//! Audio session policy — route configuration, input-device selection and
//! interruption semantics.
//!
//! The policy decides *what* to ask the platform for (48 kHz, 5 ms buffers,
//! simultaneous record+playback, which microphone); the
//! [`engine`](crate::engine) module owns *applying* those decisions to a
//! backend.

pub mod devices;
pub mod policy;

pub use devices::{classify_input, InputDevice, InputKind};
pub use policy::{
    InputSource, InterruptionEvent, SessionConfig, SessionError, SessionPolicy,
    DEFAULT_BUFFER_DURATION, DEFAULT_SAMPLE_RATE,
};
