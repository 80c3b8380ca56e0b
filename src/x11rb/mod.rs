//! Helpers and utilities for using x11rb as a back end
pub mod xconn;

pub use xconn::RustConn;

/// Result type for fallible methods using x11rb
pub type Result<T> = std::result::Result<T, Error>;

/// Enum to store the various ways that operations can fail inside of the
/// x11rb implementation of the transport traits.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Unable to establish a connection to the X server
    #[error(transparent)]
    Connect(#[from] ::x11rb::errors::ConnectError),

    /// The X11 connection broke
    #[error(transparent)]
    Connection(#[from] ::x11rb::errors::ConnectionError),

    /// Could not get an X11 request reply
    #[error(transparent)]
    Reply(#[from] ::x11rb::errors::ReplyError),

    /// Could not get an X11 request reply or generate a fresh id
    #[error(transparent)]
    ReplyOrId(#[from] ::x11rb::errors::ReplyOrIdError),

    /// The X11 server does not support the RandR extension
    #[error("the X11 server does not support the RandR extension")]
    MissingRandRSupport,
}
