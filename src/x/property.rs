//! Typed window property values read from and written to the X server.
use crate::{pure::hints::SizeHints, Xid};
use serde::{Deserialize, Serialize};

/// The ICCCM `WM_STATE` values the window manager sets on managed windows.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WmState {
    /// Not managed / withdrawn from the screen
    Withdrawn,
    /// Mapped and visible
    Normal,
    /// Hidden (scratchpad or off-workspace)
    Iconic,
}

impl From<WmState> for u32 {
    fn from(s: WmState) -> u32 {
        match s {
            WmState::Withdrawn => 0,
            WmState::Normal => 1,
            WmState::Iconic => 3,
        }
    }
}

/// Parsed ICCCM `WM_HINTS` fields the window manager cares about.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WmHints {
    /// The urgency flag
    pub urgent: bool,
    /// Whether the client participates in input focus
    pub accepts_input: bool,
}

impl Default for WmHints {
    fn default() -> Self {
        Self {
            urgent: false,
            accepts_input: true,
        }
    }
}

/// A typed property value for a given client.
///
/// The variants cover the property types this window manager reads or
/// writes; transports convert between these and their raw wire form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Prop {
    /// A list of interned atoms, by name
    Atoms(Vec<String>),
    /// One or more cardinal values
    Cardinal(Vec<u32>),
    /// UTF-8 encoded string values
    UTF8String(Vec<String>),
    /// One or more window ids
    Window(Vec<Xid>),
    /// Parsed WM_HINTS
    WmHints(WmHints),
    /// Parsed WM_NORMAL_HINTS
    WmNormalHints(SizeHints),
}

/// The subset of window attributes used when deciding whether to manage a
/// window.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WindowAttributes {
    /// Windows with override-redirect set are never managed
    pub override_redirect: bool,
    /// Whether the window is currently viewable (mapped)
    pub viewable: bool,
}
