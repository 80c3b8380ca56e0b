//! Logic for interacting with the X server
//!
//! [XConn] is the full capability set the window manager needs from an X
//! transport: queries, property IO, window configuration, grabs and event
//! delivery. The production implementation wraps x11rb; tests drive the core
//! with a recording mock instead of a live server.
use crate::{
    pure::{
        geometry::{Point, Rect},
        hints::SizeHints,
        model::MouseCfg,
        monitor::Strut,
    },
    Result, Xid,
};
use serde::{Deserialize, Serialize};
use std::os::unix::io::RawFd;
use tracing::trace;

pub mod atom;
pub mod event;
pub mod mock;
pub mod property;

pub use atom::{Atom, AUTO_FLOAT_WINDOW_TYPES, EWMH_SUPPORTED_ATOMS};
pub use event::{
    ClientMessage, ConfigureEvent, ConfigureRequest, MouseEvent, NetWmStateAction, PointerChange,
    PropertyEvent, XEvent,
};
pub use property::{Prop, WindowAttributes, WmHints, WmState};

/// The name advertised through `_NET_SUPPORTING_WM_CHECK`.
pub const WM_NAME: &str = "lath";

/// The cursor glyphs loaded at startup.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorKind {
    /// The default pointer
    Normal,
    /// Shown while an interactive move is in progress
    Move,
    /// Shown while an interactive resize is in progress
    Resize,
}

/// On screen configuration options for X clients.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientConfig {
    /// The border width in pixels
    BorderPx(i32),
    /// Absolute position only, leaving size untouched
    Move(Point),
    /// Absolute size and position on the screen (border excluded from w/h)
    Position(Rect),
    /// Stack directly above all siblings
    StackAbove,
    /// Stack directly below all siblings
    StackBelow,
}

/// Attributes for an X11 client window.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAttr {
    /// Border color as an argb hex value
    BorderColor(u32),
    /// Set the pre-defined client event mask
    ClientEventMask,
    /// Set the pre-defined client event mask minus structure notify, for
    /// unmaps the client should not observe
    ClientUnmapMask,
    /// Set the pre-defined root event mask
    RootEventMask,
}

/// A connected RandR output and its current CRTC geometry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OutputInfo {
    /// Stable RandR output id
    pub id: u32,
    /// Output name
    pub name: String,
    /// Position and dimensions on the X screen
    pub r: Rect,
    /// Whether this output is the RandR primary
    pub primary: bool,
}

/// A handle on a running X11 connection that we can use for issuing X
/// requests.
///
/// All methods that hit the server return a [Result]: protocol errors on a
/// single client fall back to defaults at the call site and the window
/// manager keeps running.
pub trait XConn {
    /// The ID of the window manager root window.
    fn root(&self) -> Xid;
    /// The dimensions of the root window.
    fn screen_size(&self) -> Rect;
    /// Register for substructure redirect on the root window, becoming THE
    /// window manager for the display. Fails with
    /// [crate::Error::AnotherWmRunning] if the mask is already claimed.
    fn register_wm(&self) -> Result<()>;

    /// Create the small unmapped helper window advertised through
    /// `_NET_SUPPORTING_WM_CHECK`.
    fn create_check_window(&self) -> Result<Xid>;

    /// Look up the id of a named atom, interning it if needed.
    fn intern_atom(&self, name: &str) -> Result<u32>;
    /// Look up the name of an interned atom.
    fn atom_name(&self, id: u32) -> Result<String>;

    /// The currently connected RandR outputs.
    fn outputs(&self) -> Result<Vec<OutputInfo>>;
    /// The current (x, y) position of the pointer relative to the root.
    fn cursor_position(&self) -> Result<Point>;
    /// Reposition the pointer within the given window.
    fn warp_pointer(&self, id: Xid, x: i32, y: i32) -> Result<()>;

    /// Ask the X server for the IDs of all current top-level windows.
    fn existing_windows(&self) -> Result<Vec<Xid>>;
    /// The attributes used to decide whether a window should be managed.
    fn window_attributes(&self, id: Xid) -> Result<WindowAttributes>;
    /// The current geometry of the given window.
    fn window_geometry(&self, id: Xid) -> Result<Rect>;

    /// Map the given window, making it visible.
    fn map(&self, id: Xid) -> Result<()>;
    /// Unmap the given window.
    fn unmap(&self, id: Xid) -> Result<()>;
    /// Forcibly kill the client owning the given window.
    fn kill(&self, id: Xid) -> Result<()>;
    /// Give X input focus to the given window (pass the root to drop focus).
    fn focus(&self, id: Xid) -> Result<()>;

    /// Set one or more attributes on a window.
    fn set_client_attributes(&self, id: Xid, attrs: &[ClientAttr]) -> Result<()>;
    /// Apply configuration (geometry, border, stacking) to a window.
    fn set_client_config(&self, id: Xid, conf: &[ClientConfig]) -> Result<()>;
    /// Send a WM_PROTOCOLS client message (e.g. WM_DELETE_WINDOW,
    /// WM_TAKE_FOCUS) to the given window.
    fn send_protocol_message(&self, id: Xid, proto: &str) -> Result<()>;
    /// Send a synthetic ConfigureNotify telling a client its current
    /// geometry without moving it.
    fn send_configure_notify(&self, id: Xid, r: Rect, bw: i32) -> Result<()>;

    /// Look up a property on a window, typed by the property's own type.
    fn get_prop(&self, id: Xid, name: &str) -> Result<Option<Prop>>;
    /// Replace a property on a window.
    fn set_prop(&self, id: Xid, name: &str, value: Prop) -> Result<()>;
    /// Delete a property from a window.
    fn delete_prop(&self, id: Xid, name: &str) -> Result<()>;
    /// Set the ICCCM WM_STATE of a window.
    fn set_wm_state(&self, id: Xid, state: WmState) -> Result<()>;

    /// Grab the pointer for an interactive move or resize.
    fn grab_pointer(&self, cursor: CursorKind) -> Result<()>;
    /// Release a pointer grab.
    fn ungrab_pointer(&self) -> Result<()>;
    /// Grab the configured mouse chords on a client window.
    fn grab_buttons(&self, id: Xid, mouse: &MouseCfg) -> Result<()>;
    /// Replay a pointer event intercepted by a button grab so the client
    /// still sees it.
    fn allow_pointer_events(&self) -> Result<()>;
    /// Reload cached keyboard/modifier mappings after a MappingNotify.
    fn refresh_keyboard_mapping(&self) -> Result<()>;

    /// Return the next queued event without blocking, if there is one.
    fn poll_event(&self) -> Result<Option<XEvent>>;
    /// Block until the next event arrives. Only the nested mouse loop uses
    /// this; the main loop multiplexes on [XConn::connection_fd].
    fn next_event(&self) -> Result<XEvent>;
    /// Return an already-decoded event to the front of the queue, for
    /// nested pumps that drain selectively.
    fn push_back_event(&self, event: XEvent);
    /// The connection's file descriptor, for `select`.
    fn connection_fd(&self) -> RawFd;
    /// Flush all pending requests to the server.
    fn flush(&self);
}

/// Derived property helpers shared by every [XConn] impl.
pub trait XConnExt: XConn + Sized {
    /// Request the title of a window following EWMH then ICCCM conventions.
    fn window_title(&self, id: Xid) -> String {
        let read = |name: &str| match self.get_prop(id, name) {
            Ok(Some(Prop::UTF8String(mut strs))) if !strs.is_empty() => Some(strs.remove(0)),
            _ => None,
        };

        read(Atom::NetWmName.as_ref())
            .or_else(|| read(Atom::WmName.as_ref()))
            .unwrap_or_default()
    }

    /// Request the WM_CLASS pair of a window.
    fn window_class(&self, id: Xid) -> (String, String) {
        match self.get_prop(id, Atom::WmClass.as_ref()) {
            Ok(Some(Prop::UTF8String(strs))) if strs.len() >= 2 => {
                (strs[1].clone(), strs[0].clone())
            }
            _ => (String::new(), String::new()),
        }
    }

    /// Request a window's PID via `_NET_WM_PID`. Not all clients set it.
    fn window_pid(&self, id: Xid) -> Option<u32> {
        match self.get_prop(id, Atom::NetWmPid.as_ref()) {
            Ok(Some(Prop::Cardinal(vals))) if !vals.is_empty() => Some(vals[0]),
            _ => None,
        }
    }

    /// The window types set for a window, as atom names.
    fn window_types(&self, id: Xid) -> Vec<String> {
        match self.get_prop(id, Atom::NetWmWindowType.as_ref()) {
            Ok(Some(Prop::Atoms(atoms))) => atoms,
            _ => Vec::new(),
        }
    }

    /// The WM_TRANSIENT_FOR parent of a window, when set.
    fn transient_for(&self, id: Xid) -> Option<Xid> {
        match self.get_prop(id, Atom::WmTransientFor.as_ref()) {
            Ok(Some(Prop::Window(ids))) if !ids.is_empty() && *ids[0] != 0 => Some(ids[0]),
            _ => None,
        }
    }

    /// Parsed WM_HINTS for a window, defaulting when unset or malformed.
    fn wm_hints(&self, id: Xid) -> WmHints {
        match self.get_prop(id, Atom::WmHints.as_ref()) {
            Ok(Some(Prop::WmHints(h))) => h,
            _ => WmHints::default(),
        }
    }

    /// Parsed WM_NORMAL_HINTS for a window.
    fn normal_hints(&self, id: Xid) -> SizeHints {
        match self.get_prop(id, Atom::WmNormalHints.as_ref()) {
            Ok(Some(Prop::WmNormalHints(h))) => h,
            _ => SizeHints::default(),
        }
    }

    /// Whether the motif hints for a window request an undecorated frame.
    fn motif_requests_no_border(&self, id: Xid) -> bool {
        // Decorations are in field 2; 0 disables them, bit 1 of the flags
        // word marks the field as set.
        match self.get_prop(id, Atom::MotifWmHints.as_ref()) {
            Ok(Some(Prop::Cardinal(vals))) if vals.len() >= 3 => {
                vals[0] & (1 << 1) != 0 && vals[2] == 0
            }
            _ => false,
        }
    }

    /// The strut reserved by a panel window, preferring the partial form.
    fn strut(&self, id: Xid) -> Strut {
        let vals = match self.get_prop(id, Atom::NetWmStrutPartial.as_ref()) {
            Ok(Some(Prop::Cardinal(vals))) if vals.len() >= 4 => vals,
            _ => match self.get_prop(id, Atom::NetWmStrut.as_ref()) {
                Ok(Some(Prop::Cardinal(vals))) if vals.len() >= 4 => vals,
                _ => return Strut::default(),
            },
        };

        Strut {
            l: vals[0] as i32,
            r: vals[1] as i32,
            t: vals[2] as i32,
            b: vals[3] as i32,
        }
    }

    /// Check whether a window advertises the given WM_PROTOCOLS entry.
    fn supports_protocol(&self, id: Xid, proto: Atom) -> bool {
        match self.get_prop(id, Atom::WmProtocols.as_ref()) {
            Ok(Some(Prop::Atoms(protos))) => protos.iter().any(|p| p == proto.as_ref()),
            _ => false,
        }
    }

    /// Send a WM_PROTOCOLS client message (delete window, take focus) if the
    /// window supports it. Returns whether the message was sent.
    fn send_wm_protocol(&self, id: Xid, proto: Atom) -> Result<bool> {
        if !self.supports_protocol(id, proto) {
            return Ok(false);
        }

        trace!(%id, proto = proto.as_ref(), "sending wm protocol message");
        self.send_protocol_message(id, proto.as_ref()).map(|_| true)
    }

    /// Drop any queued EnterNotify events, so restacks and workspace flips
    /// do not generate spurious focus changes.
    fn drain_enter_notify(&self) -> Result<()> {
        let mut pending = Vec::new();

        while let Some(ev) = self.poll_event()? {
            if !matches!(ev, XEvent::Enter(_)) {
                pending.push(ev);
            }
        }
        // Reversed so that re-queueing at the front preserves arrival order.
        for ev in pending.into_iter().rev() {
            self.push_back_event(ev);
        }

        Ok(())
    }
}

// Auto impl XConnExt for all XConn impls
impl<T> XConnExt for T where T: XConn {}
