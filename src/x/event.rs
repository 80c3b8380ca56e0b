//! Data types for working with X events
use crate::{
    pure::geometry::{Point, Rect},
    Xid,
};
use serde::{Deserialize, Serialize};

/// Wrapper around the low level X event types the window manager reacts to.
///
/// The variant names and payloads follow the X11 core protocol but are
/// decoupled from any particular client library so the dispatcher can be
/// driven by a mock in tests.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum XEvent {
    /// A grabbed mouse button was pressed
    ButtonPress(MouseEvent),
    /// A grabbed mouse button was released
    ButtonRelease(MouseEvent),
    /// A message has been sent to a particular client
    ClientMessage(ClientMessage),
    /// Client or root geometry has changed in some way
    ConfigureNotify(ConfigureEvent),
    /// A client is requesting to be repositioned
    ConfigureRequest(ConfigureRequest),
    /// A client window has been destroyed
    Destroy(Xid),
    /// The pointer has entered a new client window
    Enter(PointerChange),
    /// A client gained input focus
    FocusIn(Xid),
    /// Keyboard mappings have changed
    MappingNotify,
    /// A client window is requesting to be positioned and rendered
    MapRequest(Xid),
    /// The pointer moved within a window (reported for the root)
    Motion(MouseEvent),
    /// A client property has changed in some way
    PropertyNotify(PropertyEvent),
    /// A RandR action has occured (outputs changed, resolution change etc)
    RandrNotify,
    /// A client is being unmapped
    UnmapNotify {
        /// The window being unmapped
        id: Xid,
        /// Whether this was a synthetic event sent by the client itself
        from_send_event: bool,
    },
}

impl std::fmt::Display for XEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use XEvent::*;

        match self {
            ButtonPress(_) => write!(f, "ButtonPress"),
            ButtonRelease(_) => write!(f, "ButtonRelease"),
            ClientMessage(_) => write!(f, "ClientMessage"),
            ConfigureNotify(_) => write!(f, "ConfigureNotify"),
            ConfigureRequest(_) => write!(f, "ConfigureRequest"),
            Destroy(_) => write!(f, "Destroy"),
            Enter(_) => write!(f, "Enter"),
            FocusIn(_) => write!(f, "FocusIn"),
            MappingNotify => write!(f, "MappingNotify"),
            MapRequest(_) => write!(f, "MapRequest"),
            Motion(_) => write!(f, "Motion"),
            PropertyNotify(_) => write!(f, "PropertyNotify"),
            RandrNotify => write!(f, "RandrNotify"),
            UnmapNotify { .. } => write!(f, "UnmapNotify"),
        }
    }
}

/// A press, release or drag involving the configured mouse chords.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// The window under the pointer (child of root for chorded presses)
    pub id: Xid,
    /// Pointer position relative to the root window
    pub abs: Point,
    /// Active modifier mask
    pub state: u16,
    /// The button involved (0 for plain motion)
    pub button: u8,
}

/// A message sent by a client or another X utility, e.g. `_NET_WM_STATE`
/// change requests or pagers activating a window.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClientMessage {
    /// The target window
    pub id: Xid,
    /// Name of the message type atom
    pub dtype: String,
    /// The raw 32bit message payload
    pub data: [u32; 5],
}

/// `_NET_WM_STATE` client messages carry a tri-state action in `data[0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetWmStateAction {
    /// Clear the state
    Remove,
    /// Set the state
    Add,
    /// Invert the state
    Toggle,
}

impl NetWmStateAction {
    /// Decode the action field of a `_NET_WM_STATE` message.
    pub fn from_data(v: u32) -> Option<Self> {
        match v {
            0 => Some(Self::Remove),
            1 => Some(Self::Add),
            2 => Some(Self::Toggle),
            _ => None,
        }
    }

    /// Resolve the action against the current state of the flag.
    pub fn apply_to(&self, current: bool) -> bool {
        match self {
            Self::Remove => false,
            Self::Add => true,
            Self::Toggle => !current,
        }
    }
}

/// A configure notification: a window (possibly the root) changed size or
/// position.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigureEvent {
    /// The window that changed
    pub id: Xid,
    /// Its new geometry
    pub r: Rect,
    /// Whether this is for the root window
    pub is_root: bool,
}

/// A client request to change its own geometry. Only the fields the client
/// actually included in its request are present.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConfigureRequest {
    /// The requesting window
    pub id: Xid,
    /// Requested x position
    pub x: Option<i32>,
    /// Requested y position
    pub y: Option<i32>,
    /// Requested width
    pub w: Option<i32>,
    /// Requested height
    pub h: Option<i32>,
    /// Requested border width
    pub bw: Option<i32>,
}

/// A notification that the pointer has entered a window.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerChange {
    /// The window that was entered
    pub id: Xid,
    /// Absolute position of the pointer
    pub abs: Point,
}

/// A property change on a known window.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PropertyEvent {
    /// The window whose property changed
    pub id: Xid,
    /// Name of the property that changed
    pub atom: String,
    /// Whether the property was deleted rather than replaced
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case(0, false, false; "remove")]
    #[test_case(0, true, false; "remove when set")]
    #[test_case(1, false, true; "add")]
    #[test_case(2, false, true; "toggle on")]
    #[test_case(2, true, false; "toggle off")]
    #[test]
    fn net_wm_state_action(data: u32, current: bool, expected: bool) {
        let action = NetWmStateAction::from_data(data).expect("valid action");

        assert_eq!(action.apply_to(current), expected);
    }

    #[test]
    fn unknown_actions_are_rejected() {
        assert_eq!(NetWmStateAction::from_data(3), None);
    }
}
