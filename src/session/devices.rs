//! Input-device descriptions and physical-type classification.
//!
//! The session policy matches an [`InputSource`](super::InputSource) request
//! against the devices a backend currently enumerates.  Desktop audio APIs
//! expose no structured port type the way mobile platforms do, so
//! [`classify_input`] falls back to name heuristics ("built-in", "headset",
//! "bluetooth", …) to decide what kind of microphone a device is.

// ---------------------------------------------------------------------------
// InputKind
// ---------------------------------------------------------------------------

/// Physical classification of an input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// The machine's internal microphone.
    BuiltIn,
    /// A wired headset or Bluetooth hands-free microphone.
    Headset,
    /// Anything else (USB interface, virtual loopback, …).
    Other,
}

/// Classify a device by its reported name.
///
/// Case-insensitive substring match; unknown names map to
/// [`InputKind::Other`] rather than guessing.
pub fn classify_input(name: &str) -> InputKind {
    let lower = name.to_lowercase();

    const HEADSET_HINTS: [&str; 4] = ["headset", "bluetooth", "hands-free", "airpods"];
    const BUILT_IN_HINTS: [&str; 3] = ["built-in", "builtin", "internal"];

    if HEADSET_HINTS.iter().any(|h| lower.contains(h)) {
        InputKind::Headset
    } else if BUILT_IN_HINTS.iter().any(|h| lower.contains(h)) {
        InputKind::BuiltIn
    } else {
        InputKind::Other
    }
}

// ---------------------------------------------------------------------------
// InputDevice
// ---------------------------------------------------------------------------

/// A currently connected input device as reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDevice {
    /// Device name as reported by the platform.
    pub name: String,
    /// Physical classification used for preferred-input matching.
    pub kind: InputKind,
}

impl InputDevice {
    /// Build a device description, classifying it from `name`.
    pub fn from_name(name: impl Into<String>) -> Self {
        let name = name.into();
        let kind = classify_input(&name);
        Self { name, kind }
    }

    /// Build a device with an explicit classification (used by backends that
    /// know the port type, and by tests).
    pub fn with_kind(name: impl Into<String>, kind: InputKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
