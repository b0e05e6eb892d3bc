//! Events and errors crossing the engine → presentation boundary.
//!
//! The engine never touches UI; everything the presentation layer needs
//! arrives as an [`EngineEvent`] over an `std::sync::mpsc` channel drained on
//! the main context.  Fallible control-path operations additionally return a
//! typed [`EngineError`] directly to the caller.

use thiserror::Error;

use crate::session::SessionError;

// ---------------------------------------------------------------------------
// EngineError
// ---------------------------------------------------------------------------

/// All errors the engine can surface.
///
/// Every variant is recoverable from the caller's point of view — the engine
/// never treats a platform failure as fatal.  Session-level failures keep
/// their own taxonomy (see [`SessionError`]) and are matchable through the
/// `Session` variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Microphone access has not been granted.  Requesting it is the
    /// collaborator's job; the engine never auto-retries.
    #[error("microphone permission has not been granted")]
    PermissionDenied,

    /// Route configuration or preferred-input failure from the session layer.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The hardware stream could not be started.
    #[error("failed to start the audio stream: {0}")]
    StreamStart(String),

    /// Asynchronous fault reported by a running stream (device unplugged,
    /// driver error).  Delivered as [`EngineEvent::Error`], never panicked.
    #[error("audio stream fault: {0}")]
    Stream(String),
}

// ---------------------------------------------------------------------------
// EngineEvent
// ---------------------------------------------------------------------------

/// Events delivered from the engine to the presentation layer.
///
/// Sent from whatever thread produced them (level readings come from the
/// real-time callback) but intended to be drained on the main/UI context —
/// the channel is the marshalling point.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The stream is running; audio is flowing.
    Started,

    /// The stream was halted by [`stop`](crate::engine::AudioGraphController::stop).
    Stopped,

    /// One post-gain level reading in decibels, produced per audio block
    /// while running with the tap installed.
    Level(f32),

    /// An asynchronous failure.  Synchronous failures are returned as
    /// `Result`s instead.
    Error(EngineError),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
