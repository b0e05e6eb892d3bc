//! The audio graph controller — owns the capture→gain→output chain and
//! drives it through its lifecycle.
//!
//! # State machine
//!
//! ```text
//! Idle ──start()──▶ Configured ──stream up──▶ Running
//!                       ▲                        │
//!                       └────────stop()──────────┘
//! ```
//!
//! The signal chain is wired exactly once per controller; `stop`/`start`
//! only toggle the hardware stream (and the metering tap).  All methods are
//! intended to be called from the main/UI context by a single writer — the
//! controller has no internal locking of its own and relies on that
//! discipline.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use crate::audio::{GainCell, SignalChain};
use crate::session::{InterruptionEvent, InputSource, SessionConfig, SessionPolicy};

use super::backend::AudioBackend;
use super::events::{EngineError, EngineEvent};

// ---------------------------------------------------------------------------
// GraphState
// ---------------------------------------------------------------------------

/// Lifecycle of the audio pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphState {
    /// Chain not wired yet.
    #[default]
    Idle,
    /// Chain wired, hardware stream not running.
    Configured,
    /// Hardware callbacks are active (or paused by an interruption).
    Running,
}

// ---------------------------------------------------------------------------
// AudioGraphController
// ---------------------------------------------------------------------------

/// Owns the signal chain, the session policy and the platform backend, and
/// exposes the start/stop/amplify/select-input surface the presentation
/// layer drives.
///
/// Events (level readings, lifecycle, asynchronous faults) flow to the
/// presentation layer over the `std::sync::mpsc` channel whose sender is
/// given to [`new`](Self::new); drain the receiver on the main context.
///
/// ```rust,no_run
/// use std::sync::mpsc;
/// use earbridge::engine::{AudioGraphController, CpalBackend, EngineEvent};
/// use earbridge::session::SessionConfig;
///
/// let (tx, rx) = mpsc::channel();
/// let backend = CpalBackend::new(tx.clone());
/// let mut controller = AudioGraphController::new(backend, SessionConfig::default(), tx);
///
/// controller.start(1.0).expect("engine failed to start");
/// while let Ok(event) = rx.recv() {
///     if let EngineEvent::Level(db) = event {
///         println!("input level: {db:.1} dB");
///     }
/// }
/// ```
pub struct AudioGraphController<B: AudioBackend> {
    backend: B,
    policy: SessionPolicy,
    /// The gain node — exists for the controller's whole lifetime so
    /// amplification can be set in any state.
    gain: Arc<GainCell>,
    /// Wired on first `start`, then reused for every restart.
    chain: Option<Arc<SignalChain>>,
    events: Sender<EngineEvent>,
    state: GraphState,
    /// Set while an interruption holds the stream paused.
    interrupted: bool,
}

impl<B: AudioBackend> AudioGraphController<B> {
    /// Controller in the `Idle` state with unity gain and an `Auto` input
    /// selection.
    pub fn new(backend: B, config: SessionConfig, events: Sender<EngineEvent>) -> Self {
        Self {
            backend,
            policy: SessionPolicy::new(config),
            gain: Arc::new(GainCell::default()),
            chain: None,
            events,
            state: GraphState::Idle,
            interrupted: false,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> GraphState {
        self.state
    }

    /// `true` while audio is flowing (running and not interrupted).
    pub fn is_running(&self) -> bool {
        self.state == GraphState::Running && !self.interrupted
    }

    /// Currently applied amplification.
    pub fn amplification(&self) -> f32 {
        self.gain.get()
    }

    /// Active input-source selection.
    pub fn input_source(&self) -> InputSource {
        self.policy.selection()
    }

    // -----------------------------------------------------------------------
    // Control surface
    // -----------------------------------------------------------------------

    /// Configure the session, wire the graph if needed and start the
    /// hardware stream.
    ///
    /// Calling `start` while already running restarts the hardware stream
    /// but never rewires the chain or installs a second tap.  On any failure
    /// the stream is left stopped.
    ///
    /// # Errors
    ///
    /// [`EngineError::PermissionDenied`] without microphone access,
    /// [`EngineError::Session`] when the route configuration or the selected
    /// input is rejected, [`EngineError::StreamStart`] when the hardware
    /// stream cannot be opened.
    pub fn start(&mut self, initial_amplification: f32) -> Result<(), EngineError> {
        if !self.backend.microphone_permission() {
            return Err(EngineError::PermissionDenied);
        }

        // Idempotent restart: never configure underneath a live stream, and
        // never leave one running behind a failure below.
        if self.backend.is_stream_running() {
            self.backend.stop_stream();
        }
        self.interrupted = false;
        if self.state == GraphState::Running {
            self.state = GraphState::Configured;
        }

        self.backend.activate(self.policy.config())?;

        let chain = self.wire_chain_if_needed();
        // Past this point the chain exists, so the controller is never Idle
        // again even when a step below fails.
        self.state = GraphState::Configured;
        chain.set_gain(initial_amplification);
        self.apply_selected_input()?;
        self.install_tap_if_needed(&chain);

        self.backend.start_stream(Arc::clone(&chain))?;
        self.state = GraphState::Running;
        log::info!(
            "engine started (amplification {:.2}, input {:?})",
            chain.gain(),
            self.policy.selection()
        );
        self.emit(EngineEvent::Started);
        Ok(())
    }

    /// Halt the hardware stream, remove the metering tap and deactivate the
    /// session.
    ///
    /// No-op when not running — no events are emitted.  Session deactivation
    /// failure is logged, never surfaced; from the caller's perspective
    /// `stop` always leaves the controller non-running.
    pub fn stop(&mut self) {
        if self.state != GraphState::Running {
            return;
        }

        self.backend.stop_stream();
        if let Some(chain) = &self.chain {
            chain.remove_tap();
        }
        if let Err(e) = self.backend.deactivate() {
            log::warn!("audio session deactivation failed: {e}");
        }

        self.state = GraphState::Configured;
        self.interrupted = false;
        log::info!("engine stopped");
        self.emit(EngineEvent::Stopped);
    }

    /// Set the amplification, clamped to `[0.0, 2.0]`, effective for the
    /// next processed block regardless of state.  Returns the applied value.
    pub fn set_amplification(&self, value: f32) -> f32 {
        let applied = self.gain.set(value);
        log::debug!("amplification set to {applied:.2}");
        applied
    }

    /// Change the preferred input source.
    ///
    /// Availability is checked first; while running the preference is also
    /// applied to the session immediately.  On failure the previous
    /// selection stays active.
    ///
    /// # Errors
    ///
    /// [`SessionError::PreferredInputUnavailable`](crate::session::SessionError::PreferredInputUnavailable)
    /// when no connected device matches `source`.
    pub fn set_preferred_input(&mut self, source: InputSource) -> Result<(), EngineError> {
        let device = self
            .policy
            .resolve_input(&self.backend.available_inputs(), source)?;

        if self.state == GraphState::Running {
            self.backend.set_preferred_input(device.as_ref())?;
        }

        self.policy.select(source);
        log::debug!("input source set to {source:?}");
        Ok(())
    }

    /// React to a platform interruption (incoming call, another app taking
    /// the hardware).
    ///
    /// `Began` pauses a running stream, keeping the chain and tap intact.
    /// `Ended` reactivates the session and, when the platform signals it,
    /// resumes the stream without requiring another [`start`](Self::start).
    /// Resume failures are logged only — the user can restart manually.
    pub fn handle_interruption(&mut self, event: InterruptionEvent) {
        match event {
            InterruptionEvent::Began => {
                if self.state != GraphState::Running || self.interrupted {
                    return;
                }
                log::info!("audio interruption began, pausing stream");
                self.backend.pause_stream();
                self.interrupted = true;
            }
            InterruptionEvent::Ended { should_resume } => {
                if !self.interrupted {
                    return;
                }
                if let Err(e) = self.backend.activate(self.policy.config()) {
                    log::warn!("failed to reactivate session after interruption: {e}");
                    return;
                }
                if should_resume {
                    match self.backend.resume_stream() {
                        Ok(()) => {
                            self.interrupted = false;
                            log::info!("stream resumed after interruption");
                        }
                        Err(e) => {
                            log::warn!("failed to resume stream after interruption: {e}");
                        }
                    }
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn wire_chain_if_needed(&mut self) -> Arc<SignalChain> {
        let gain = &self.gain;
        let chain = self.chain.get_or_insert_with(|| {
            log::debug!("wiring signal chain: capture → gain → output");
            Arc::new(SignalChain::new(Arc::clone(gain)))
        });
        Arc::clone(chain)
    }

    fn install_tap_if_needed(&self, chain: &SignalChain) {
        if chain.is_tap_installed() {
            return;
        }
        let tx = self.events.clone();
        chain.install_tap(Box::new(move |db| {
            // Receiver gone just means nobody is watching the meter.
            let _ = tx.send(EngineEvent::Level(db));
        }));
    }

    fn apply_selected_input(&mut self) -> Result<(), EngineError> {
        let source = self.policy.selection();
        let device = self
            .policy
            .resolve_input(&self.backend.available_inputs(), source)?;
        self.backend.set_preferred_input(device.as_ref())?;
        Ok(())
    }

    fn emit(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }
}

impl<B: AudioBackend> Drop for AudioGraphController<B> {
    /// The stream and tap are released even when the caller forgets to call
    /// [`stop`](Self::stop).
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
