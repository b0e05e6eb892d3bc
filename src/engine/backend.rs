//! Platform audio backend seam.
//!
//! [`AudioBackend`] abstracts everything the graph controller needs from the
//! host audio API: permission state, device enumeration, session
//! activate/deactivate, preferred-input pinning and the duplex hardware
//! stream.  [`CpalBackend`](super::CpalBackend) is the production
//! implementation; [`MockBackend`] (available under `#[cfg(test)]`) records
//! every call so controller behaviour can be tested without hardware.

use std::sync::Arc;

use crate::audio::SignalChain;
use crate::session::{InputDevice, SessionConfig, SessionError};

use super::events::EngineError;

// ---------------------------------------------------------------------------
// AudioBackend
// ---------------------------------------------------------------------------

/// Host-platform audio interface.
///
/// # Contract
///
/// - [`activate`](Self::activate) with a configuration identical to the one
///   already applied on an active session is a no-op.
/// - [`start_stream`](Self::start_stream) drives the given [`SignalChain`]
///   from the real-time callback until [`stop_stream`](Self::stop_stream).
/// - [`stop_stream`](Self::stop_stream) also discards any internally
///   buffered audio.
/// - [`pause_stream`](Self::pause_stream) suspends callbacks without
///   releasing the stream; [`resume_stream`](Self::resume_stream) undoes it.
pub trait AudioBackend {
    /// Whether the OS has granted microphone access.
    fn microphone_permission(&self) -> bool;

    /// Input devices currently connected, with their classification.
    fn available_inputs(&self) -> Vec<InputDevice>;

    /// Apply `config` and activate the audio route.
    fn activate(&mut self, config: &SessionConfig) -> Result<(), SessionError>;

    /// Release the audio route.
    fn deactivate(&mut self) -> Result<(), SessionError>;

    /// Pin capture to `device`; `None` clears the preference.
    fn set_preferred_input(&mut self, device: Option<&InputDevice>) -> Result<(), SessionError>;

    /// Open the duplex hardware stream, processing every captured block
    /// through `chain` on the real-time thread.
    fn start_stream(&mut self, chain: Arc<SignalChain>) -> Result<(), EngineError>;

    /// Halt the hardware stream and discard buffered audio.  No-op when not
    /// running.
    fn stop_stream(&mut self);

    /// Suspend callbacks without tearing the stream down (interruption).
    fn pause_stream(&mut self);

    /// Resume a paused stream.
    fn resume_stream(&mut self) -> Result<(), EngineError>;

    /// `true` while the hardware stream exists (paused or not).
    fn is_stream_running(&self) -> bool;
}

// Compile-time assertion: the trait must stay object-safe.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn AudioBackend>) {}
};

// ---------------------------------------------------------------------------
// MockBackend (test double)
// ---------------------------------------------------------------------------

#[cfg(test)]
pub use mock::MockBackend;

#[cfg(test)]
mod mock {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockState {
        permission: bool,
        inputs: Vec<InputDevice>,

        active: bool,
        applied_config: Option<SessionConfig>,
        activate_calls: u32,
        /// Times a configuration was actually (re)applied, as opposed to the
        /// identical-while-active no-op.
        configs_applied: u32,
        deactivate_calls: u32,

        preferred: Option<InputDevice>,
        preferred_calls: u32,

        chains: Vec<Arc<SignalChain>>,
        running: bool,
        paused: bool,
        start_calls: u32,
        stop_calls: u32,
        pause_calls: u32,
        resume_calls: u32,

        fail_activate: bool,
        fail_deactivate: bool,
        fail_start: bool,
        fail_resume: bool,
    }

    /// Recording [`AudioBackend`] double.
    ///
    /// Clones share state, so tests can keep a probe handle while the
    /// controller owns the other clone — including across the controller
    /// being dropped.
    #[derive(Clone)]
    pub struct MockBackend {
        state: Arc<Mutex<MockState>>,
    }

    impl MockBackend {
        /// Backend with permission granted and no devices connected.
        pub fn new() -> Self {
            Self {
                state: Arc::new(Mutex::new(MockState {
                    permission: true,
                    ..MockState::default()
                })),
            }
        }

        pub fn set_permission(&self, granted: bool) {
            self.state.lock().unwrap().permission = granted;
        }

        pub fn set_inputs(&self, inputs: Vec<InputDevice>) {
            self.state.lock().unwrap().inputs = inputs;
        }

        pub fn fail_activate(&self, fail: bool) {
            self.state.lock().unwrap().fail_activate = fail;
        }

        pub fn fail_deactivate(&self, fail: bool) {
            self.state.lock().unwrap().fail_deactivate = fail;
        }

        pub fn fail_start(&self, fail: bool) {
            self.state.lock().unwrap().fail_start = fail;
        }

        pub fn fail_resume(&self, fail: bool) {
            self.state.lock().unwrap().fail_resume = fail;
        }

        // ---- probes -------------------------------------------------------

        pub fn is_active(&self) -> bool {
            self.state.lock().unwrap().active
        }

        pub fn activate_calls(&self) -> u32 {
            self.state.lock().unwrap().activate_calls
        }

        pub fn configs_applied(&self) -> u32 {
            self.state.lock().unwrap().configs_applied
        }

        pub fn deactivate_calls(&self) -> u32 {
            self.state.lock().unwrap().deactivate_calls
        }

        pub fn applied_config(&self) -> Option<SessionConfig> {
            self.state.lock().unwrap().applied_config.clone()
        }

        pub fn preferred(&self) -> Option<InputDevice> {
            self.state.lock().unwrap().preferred.clone()
        }

        pub fn preferred_calls(&self) -> u32 {
            self.state.lock().unwrap().preferred_calls
        }

        /// Every chain ever passed to `start_stream`, in order.
        pub fn chains(&self) -> Vec<Arc<SignalChain>> {
            self.state.lock().unwrap().chains.clone()
        }

        pub fn is_running(&self) -> bool {
            self.state.lock().unwrap().running
        }

        pub fn is_paused(&self) -> bool {
            self.state.lock().unwrap().paused
        }

        pub fn start_calls(&self) -> u32 {
            self.state.lock().unwrap().start_calls
        }

        pub fn stop_calls(&self) -> u32 {
            self.state.lock().unwrap().stop_calls
        }

        pub fn pause_calls(&self) -> u32 {
            self.state.lock().unwrap().pause_calls
        }

        pub fn resume_calls(&self) -> u32 {
            self.state.lock().unwrap().resume_calls
        }
    }

    impl Default for MockBackend {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioBackend for MockBackend {
        fn microphone_permission(&self) -> bool {
            self.state.lock().unwrap().permission
        }

        fn available_inputs(&self) -> Vec<InputDevice> {
            self.state.lock().unwrap().inputs.clone()
        }

        fn activate(&mut self, config: &SessionConfig) -> Result<(), SessionError> {
            let mut st = self.state.lock().unwrap();
            st.activate_calls += 1;
            if st.fail_activate {
                return Err(SessionError::Configuration("mock activation failure".into()));
            }
            // Identical re-application while active is a no-op.
            if !(st.active && st.applied_config.as_ref() == Some(config)) {
                st.applied_config = Some(config.clone());
                st.active = true;
                st.configs_applied += 1;
            }
            Ok(())
        }

        fn deactivate(&mut self) -> Result<(), SessionError> {
            let mut st = self.state.lock().unwrap();
            st.deactivate_calls += 1;
            if st.fail_deactivate {
                return Err(SessionError::Configuration(
                    "mock deactivation failure".into(),
                ));
            }
            st.active = false;
            Ok(())
        }

        fn set_preferred_input(
            &mut self,
            device: Option<&InputDevice>,
        ) -> Result<(), SessionError> {
            let mut st = self.state.lock().unwrap();
            st.preferred_calls += 1;
            st.preferred = device.cloned();
            Ok(())
        }

        fn start_stream(&mut self, chain: Arc<SignalChain>) -> Result<(), EngineError> {
            let mut st = self.state.lock().unwrap();
            st.start_calls += 1;
            if st.fail_start {
                return Err(EngineError::StreamStart("mock start failure".into()));
            }
            st.chains.push(chain);
            st.running = true;
            st.paused = false;
            Ok(())
        }

        fn stop_stream(&mut self) {
            let mut st = self.state.lock().unwrap();
            st.stop_calls += 1;
            st.running = false;
            st.paused = false;
        }

        fn pause_stream(&mut self) {
            let mut st = self.state.lock().unwrap();
            st.pause_calls += 1;
            if st.running {
                st.paused = true;
            }
        }

        fn resume_stream(&mut self) -> Result<(), EngineError> {
            let mut st = self.state.lock().unwrap();
            st.resume_calls += 1;
            if st.fail_resume {
                return Err(EngineError::Stream("mock resume failure".into()));
            }
            st.paused = false;
            Ok(())
        }

        fn is_stream_running(&self) -> bool {
            self.state.lock().unwrap().running
        }
    }
}
