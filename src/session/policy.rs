//! Audio session policy — the hardware route the engine asks the platform for.
//!
//! [`SessionConfig`] captures the route parameters (simultaneous
//! record+playback at 48 kHz with a 5 ms hardware buffer, speaker by default,
//! Bluetooth allowed).  [`SessionPolicy`] owns the active configuration plus
//! the user's [`InputSource`] selection and decides which physical device a
//! selection maps to.  Interruption events (another process taking the audio
//! hardware) are modelled by [`InterruptionEvent`]; the graph controller
//! reacts to them.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::devices::{InputDevice, InputKind};

/// Default session sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;
/// Default hardware buffer duration — 5 ms for low-latency monitoring.
pub const DEFAULT_BUFFER_DURATION: Duration = Duration::from_millis(5);

// ---------------------------------------------------------------------------
// SessionError
// ---------------------------------------------------------------------------

/// Errors raised while configuring the audio route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The platform rejected the requested category/sample-rate/buffer
    /// combination.  The caller must not start the stream.
    #[error("audio session rejected the requested configuration: {0}")]
    Configuration(String),

    /// No currently connected input device matches the requested source.
    /// The active selection must be left unchanged.
    #[error("no connected input device matches {0:?}")]
    PreferredInputUnavailable(InputSource),
}

// ---------------------------------------------------------------------------
// InputSource
// ---------------------------------------------------------------------------

/// Which physical input the session should prefer.
///
/// Serialized in kebab-case for the config file (`"auto"`,
/// `"built-in-mic"`, `"headset-mic"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputSource {
    /// Let the platform pick — always succeeds.
    #[default]
    Auto,
    /// Pin to the internal microphone.
    BuiltInMic,
    /// Pin to a wired headset or Bluetooth hands-free microphone.
    HeadsetMic,
}

impl InputSource {
    /// The device classification this source matches, `None` for `Auto`.
    fn wanted_kind(self) -> Option<InputKind> {
        match self {
            InputSource::Auto => None,
            InputSource::BuiltInMic => Some(InputKind::BuiltIn),
            InputSource::HeadsetMic => Some(InputKind::Headset),
        }
    }
}

// ---------------------------------------------------------------------------
// InterruptionEvent
// ---------------------------------------------------------------------------

/// A platform-signalled interruption of the audio hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptionEvent {
    /// Another process took the hardware (e.g. an incoming call).  A running
    /// stream is paused without tearing down the graph or tap.
    Began,
    /// The interruption is over.  When `should_resume` is set the platform
    /// considers it appropriate to restart the stream without user action.
    Ended {
        /// Whether the stream should be restarted automatically.
        should_resume: bool,
    },
}

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Hardware route configuration applied before the stream starts.
///
/// Re-applying an identical configuration while the session is active is a
/// no-op; backends compare against the configuration they last applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Target sample rate in Hz.
    pub sample_rate: u32,
    /// Target hardware buffer duration.
    pub buffer_duration: Duration,
    /// Route playback to the speaker when nothing else is connected.
    pub default_to_speaker: bool,
    /// Allow Bluetooth devices on both the input and output side.
    pub allow_bluetooth: bool,
}

impl SessionConfig {
    /// Hardware buffer size in frames at this configuration's sample rate.
    pub fn buffer_frames(&self) -> u32 {
        let frames = self.buffer_duration.as_secs_f64() * f64::from(self.sample_rate);
        frames.round().max(1.0) as u32
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            buffer_duration: DEFAULT_BUFFER_DURATION,
            default_to_speaker: true,
            allow_bluetooth: true,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionPolicy
// ---------------------------------------------------------------------------

/// Owns the session configuration and the active input-source selection.
///
/// The policy is pure decision logic: it maps an [`InputSource`] to a
/// concrete [`InputDevice`] from a backend's enumeration and records which
/// source is active.  Applying those decisions to hardware is the graph
/// controller's job.
#[derive(Debug, Default)]
pub struct SessionPolicy {
    config: SessionConfig,
    selection: InputSource,
}

impl SessionPolicy {
    /// Policy with the given route configuration and an `Auto` selection.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            selection: InputSource::Auto,
        }
    }

    /// The route configuration to request from the platform.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Currently active input-source selection.
    pub fn selection(&self) -> InputSource {
        self.selection
    }

    /// Record `source` as the active selection.
    ///
    /// Callers must resolve availability first — see
    /// [`resolve_input`](Self::resolve_input).
    pub fn select(&mut self, source: InputSource) {
        self.selection = source;
    }

    /// Map `source` to a device from `available`.
    ///
    /// `Auto` clears the preference (`Ok(None)`).  A non-auto source returns
    /// the first matching device, or
    /// [`SessionError::PreferredInputUnavailable`] when nothing matches —
    /// in that case the caller must leave the active selection unchanged.
    pub fn resolve_input(
        &self,
        available: &[InputDevice],
        source: InputSource,
    ) -> Result<Option<InputDevice>, SessionError> {
        let Some(wanted) = source.wanted_kind() else {
            return Ok(None);
        };

        available
            .iter()
            .find(|dev| dev.kind == wanted)
            .cloned()
            .map(Some)
            .ok_or(SessionError::PreferredInputUnavailable(source))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn devices() -> Vec<InputDevice> {
        vec![
            InputDevice::with_kind("Built-in Microphone", InputKind::BuiltIn),
            InputDevice::with_kind("USB Headset", InputKind::Headset),
            InputDevice::with_kind("Scarlett 2i2", InputKind::Other),
        ]
    }

    // ---- SessionConfig -----------------------------------------------------

    #[test]
    fn default_config_targets_48k_5ms() {
        let config = SessionConfig::default();
        assert_eq!(config.sample_rate, 48_000);
        assert_eq!(config.buffer_duration, Duration::from_millis(5));
        assert!(config.default_to_speaker);
        assert!(config.allow_bluetooth);
    }

    #[test]
    fn buffer_frames_at_48k_5ms_is_240() {
        assert_eq!(SessionConfig::default().buffer_frames(), 240);
    }

    #[test]
    fn buffer_frames_never_zero() {
        let config = SessionConfig {
            buffer_duration: Duration::from_nanos(1),
            ..SessionConfig::default()
        };
        assert_eq!(config.buffer_frames(), 1);
    }

    // ---- resolve_input -----------------------------------------------------

    #[test]
    fn auto_always_resolves_to_no_preference() {
        let policy = SessionPolicy::default();
        assert_eq!(policy.resolve_input(&[], InputSource::Auto), Ok(None));
        assert_eq!(
            policy.resolve_input(&devices(), InputSource::Auto),
            Ok(None)
        );
    }

    #[test]
    fn built_in_resolves_to_built_in_device() {
        let policy = SessionPolicy::default();
        let picked = policy
            .resolve_input(&devices(), InputSource::BuiltInMic)
            .unwrap()
            .unwrap();
        assert_eq!(picked.kind, InputKind::BuiltIn);
    }

    #[test]
    fn headset_resolves_to_headset_device() {
        let policy = SessionPolicy::default();
        let picked = policy
            .resolve_input(&devices(), InputSource::HeadsetMic)
            .unwrap()
            .unwrap();
        assert_eq!(picked.name, "USB Headset");
    }

    #[test]
    fn missing_built_in_is_unavailable() {
        let policy = SessionPolicy::default();
        let only_headset = vec![InputDevice::with_kind("USB Headset", InputKind::Headset)];
        assert_eq!(
            policy.resolve_input(&only_headset, InputSource::BuiltInMic),
            Err(SessionError::PreferredInputUnavailable(
                InputSource::BuiltInMic
            ))
        );
    }

    #[test]
    fn other_devices_never_match_a_pinned_source() {
        let policy = SessionPolicy::default();
        let only_usb = vec![InputDevice::with_kind("Scarlett 2i2", InputKind::Other)];
        assert!(policy
            .resolve_input(&only_usb, InputSource::HeadsetMic)
            .is_err());
    }

    // ---- selection ---------------------------------------------------------

    #[test]
    fn select_records_the_source() {
        let mut policy = SessionPolicy::default();
        assert_eq!(policy.selection(), InputSource::Auto);

        policy.select(InputSource::HeadsetMic);
        assert_eq!(policy.selection(), InputSource::HeadsetMic);
    }
}
