//! Pure state for the window manager: everything that can be created,
//! mutated and checked without an X server.
pub mod client;
pub mod geometry;
pub mod hints;
pub mod model;
pub mod monitor;
pub mod workspace;

pub use client::{Client, ClientState};
pub use geometry::{Gravity, Point, Rect};
pub use hints::SizeHints;
pub use model::{BorderCfg, Config, Model, MouseCfg, MAX_WORKSPACES, SCRATCH_WS};
pub use monitor::{Desk, Monitor, Panel, Strut};
pub use workspace::{Workspace, WsDefaults};
