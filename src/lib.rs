//! lath: a dynamic tiling window manager for X11.
//!
//! The window manager proper is a single-threaded event loop multiplexing the
//! X connection and a unix control socket. Everything that can be expressed
//! without a live X server lives in the pure modules ([pure], [layout],
//! [rules], [cmd]) and is driven through the [x::XConn] transport trait; the
//! production transport is an [x11rb][crate::x11rb] wrapper, tests use a
//! recording mock.
#![warn(rust_2018_idioms)]

use std::ops::Deref;

#[macro_use]
mod macros;

pub mod absorb;
pub mod cmd;
pub mod core;
pub mod layout;
pub mod pure;
pub mod rules;
pub mod status;
pub mod util;
pub mod x;

#[cfg(feature = "x11rb-backend")]
pub mod x11rb;

pub use pure::geometry::{Point, Rect};

/// Error variants from the core window manager logic.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Registering for substructure redirect on the root window was refused:
    /// some other window manager already owns this display.
    #[error("unable to register as the window manager: is another one running?")]
    AnotherWmRunning,

    /// A malformed command line was received on the control socket. The
    /// message is the user-facing reply text (without the leading `!`).
    #[error("{0}")]
    BadCommand(String),

    /// Data received from the X server could not be interpreted.
    #[error("invalid property data: {0}")]
    InvalidPropertyData(String),

    /// An invalid hex color code was supplied.
    #[error("invalid colour argument: {hex} - expected N/(#/0x)(AA)RRGGBB")]
    InvalidHexColor {
        /// The string that was rejected
        hex: String,
    },

    /// The requested workspace can not be moved because it is the only one
    /// remaining on its monitor.
    #[error("workspace {ws} is the last workspace on monitor {mon}")]
    LastWorkspaceOnMonitor {
        /// Workspace number (0-based)
        ws: usize,
        /// Monitor name
        mon: String,
    },

    /// Every known monitor is disconnected.
    #[error("no connected monitors remain")]
    NoConnectedMonitor,

    /// A window property was requested for a client that does not have it set.
    #[error("the {0} property is not set for client {1}")]
    MissingProperty(String, Xid),

    /// An IO operation failed (socket, state file, config script).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A rule pattern failed to compile.
    #[error(transparent)]
    Regex(#[from] regex::Error),

    /// An atom name was requested that is not part of the interned set.
    #[error(transparent)]
    Strum(#[from] strum::ParseError),

    /// Workspace allocation past the hard upper bound was requested.
    #[error("workspace count {0} exceeds the maximum of 256")]
    TooManyWorkspaces(usize),

    /// A reference was made to a client that is not currently managed.
    #[error("{0} is not a known client")]
    UnknownClient(Xid),

    /// A reference was made to a monitor that does not exist.
    #[error("{0} is not a known monitor")]
    UnknownMonitor(String),

    /// A reference was made to a workspace number that does not exist.
    #[error("workspace {0} does not exist")]
    UnknownWorkspace(usize),

    /// An error from the x11rb backed transport.
    #[cfg(feature = "x11rb-backend")]
    #[error(transparent)]
    X11rb(#[from] crate::x11rb::Error),
}

/// Result type for fallible operations within lath.
pub type Result<T> = std::result::Result<T, Error>;

/// An X11 ID for a given resource.
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Xid(pub(crate) u32);

impl Xid {
    /// Construct an [Xid] from a raw window id.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for Xid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl Deref for Xid {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<u32> for Xid {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// An ARGB color used for window borders.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Color(u32);

impl Color {
    /// The raw `0xAARRGGBB` value of this color.
    pub fn argb_u32(&self) -> u32 {
        self.0
    }

    /// Parse a color from its command-line form: decimal, `0x` hex or
    /// `#`-prefixed hex, six or eight hex digits. Alpha defaults to `0xff`
    /// when only six digits are given.
    pub fn try_from_cmd(s: &str) -> Result<Self> {
        let err = || Error::InvalidHexColor { hex: s.to_string() };

        let (digits, len) = if let Some(hex) = s.strip_prefix('#') {
            (u32::from_str_radix(hex, 16).map_err(|_| err())?, hex.len())
        } else if let Some(hex) = s.strip_prefix("0x") {
            (u32::from_str_radix(hex, 16).map_err(|_| err())?, hex.len())
        } else {
            (s.parse::<u32>().map_err(|_| err())?, 8)
        };

        if len != 6 && len != 8 {
            return Err(err());
        }

        Ok(if digits > 0xffffff || len == 8 {
            Self(digits)
        } else {
            Self(digits | 0xff000000)
        })
    }
}

impl From<u32> for Color {
    fn from(argb: u32) -> Self {
        Self(argb)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case("#aabbcc", 0xffaabbcc; "hash six digit")]
    #[test_case("#80aabbcc", 0x80aabbcc; "hash eight digit")]
    #[test_case("0xaabbcc", 0xffaabbcc; "hex six digit")]
    #[test_case("0x00aabbcc", 0x00aabbcc; "hex eight digit zero alpha")]
    #[test]
    fn color_parsing(s: &str, expected: u32) {
        let c = Color::try_from_cmd(s).expect("valid color");

        assert_eq!(c.argb_u32(), expected);
    }

    #[test_case("#abc"; "too short")]
    #[test_case("#aabbccddee"; "too long")]
    #[test_case("cheese"; "not a number")]
    #[test]
    fn invalid_colors_are_rejected(s: &str) {
        assert!(Color::try_from_cmd(s).is_err());
    }
}
