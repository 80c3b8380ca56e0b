//! The managed client record and its state flags.
use crate::{
    pure::{geometry::Rect, hints::SizeHints},
    Xid,
};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Per-client state bits.
    ///
    /// Most bits combine freely; `FULLSCREEN`, `STICKY` and `FIXED` all imply
    /// `FLOATING`, which [crate::pure::Model] maintains when toggling them.
    #[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClientState: u32 {
        /// Fullscreen state is advertised but geometry is left alone
        const FAKEFULL    = 1 << 0;
        /// Size hints pin the window to a single size
        const FIXED       = 1 << 1;
        /// Not tiled; placed by the floating logic
        const FLOATING    = 1 << 2;
        /// Occupies the full monitor rect with no border
        const FULLSCREEN  = 1 << 3;
        /// Border width pinned to zero
        const NOBORDER    = 1 << 4;
        /// Never given X input focus directly (WM_TAKE_FOCUS only)
        const NOINPUT     = 1 << 5;
        /// Visible on every workspace of its monitor
        const STICKY      = 1 << 6;
        /// Demands attention
        const URGENT      = 1 << 7;
        /// Mapping deferred until the next refresh
        const NEEDSMAP    = 1 << 8;
        /// Was floating before its workspace switched to a no-tile layout
        const WASFLOATING = 1 << 9;
        /// Configure requests from the client are ignored
        const IGNORECFG   = 1 << 10;
        /// Client messages for this window are ignored
        const IGNOREMSG   = 1 << 11;
        /// Stacked above other floating clients
        const ABOVE       = 1 << 12;
        /// Unmapped but retained (scratchpad)
        const HIDDEN      = 1 << 13;
        /// Lives on the scratch workspace
        const SCRATCH     = 1 << 14;
        /// Eligible to absorb the windows of child processes
        const TERMINAL    = 1 << 15;
        /// Never absorbed by a terminal
        const NOABSORB    = 1 << 16;
    }
}

/// A managed top-level window and everything we track about it.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct Client {
    /// The X window being managed
    pub win: Xid,
    /// Current geometry (border excluded from w/h)
    pub geom: Rect,
    /// Current border width
    pub bw: i32,
    /// Height offset applied by the tile layouts
    pub hoff: i32,
    /// Geometry saved for reversible transitions (float toggle, fullscreen)
    pub old_geom: Rect,
    /// Border width saved alongside `old_geom`
    pub old_bw: i32,
    /// State bits saved when entering fullscreen
    pub old_state: ClientState,
    /// Current state bits
    pub state: ClientState,
    /// Owning workspace number ([crate::pure::SCRATCH_WS] for the scratchpad)
    pub ws: usize,
    /// WM_TRANSIENT_FOR parent, when that parent is itself managed
    pub trans: Option<Xid>,
    /// The client this terminal has absorbed, detached from all lists
    pub absorbed: Option<Box<Client>>,
    /// Size hints, fetched lazily and invalidated on WM_NORMAL_HINTS changes
    pub hints: Option<SizeHints>,
    /// Motif hints requested no decoration
    pub motif_no_border: bool,
    /// Named lifecycle callback bound by a rule
    pub cb: Option<String>,
    /// WM_CLASS class
    pub class: String,
    /// WM_CLASS instance
    pub instance: String,
    /// _NET_WM_NAME / WM_NAME
    pub title: String,
    /// _NET_WM_PID when the client sets it
    pub pid: u32,
}

impl Client {
    /// Create a client record for a newly mapped window.
    pub fn new(win: Xid, geom: Rect, bw: i32) -> Self {
        Self {
            win,
            geom,
            bw,
            old_geom: geom,
            old_bw: bw,
            ..Default::default()
        }
    }

    /// Total width including both borders.
    pub fn full_w(&self) -> i32 {
        self.geom.w + 2 * self.bw
    }

    /// Total height including both borders.
    pub fn full_h(&self) -> i32 {
        self.geom.h + 2 * self.bw
    }

    /// The full-size rect this client occupies on screen, borders included.
    pub fn frame_rect(&self) -> Rect {
        Rect::new(self.geom.x, self.geom.y, self.full_w(), self.full_h())
    }

    /// True when fullscreen geometry handling applies (`FAKEFULL` opts out).
    pub fn real_fullscreen(&self) -> bool {
        self.state.contains(ClientState::FULLSCREEN) && !self.state.contains(ClientState::FAKEFULL)
    }

    /// Set or clear the border, keeping width and the `NOBORDER` bit in sync.
    pub fn set_border_width(&mut self, bw: i32) {
        self.bw = bw.max(0);
        self.state.set(ClientState::NOBORDER, self.bw == 0);
    }

    /// Record the current geometry so a later transition can be reversed.
    pub fn save_geometry(&mut self) {
        self.old_geom = self.geom;
        self.old_bw = self.bw;
    }

    /// Restore the last saved geometry, re-syncing the `NOBORDER` bit.
    pub fn restore_geometry(&mut self) {
        self.geom = self.old_geom;
        let bw = self.old_bw;
        self.set_border_width(bw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn border_width_and_noborder_stay_in_sync() {
        let mut c = Client::new(Xid(1), Rect::new(0, 0, 100, 100), 2);

        c.set_border_width(0);
        assert!(c.state.contains(ClientState::NOBORDER));

        c.set_border_width(3);
        assert!(!c.state.contains(ClientState::NOBORDER));
        assert_eq!(c.bw, 3);
    }

    #[test]
    fn geometry_round_trips_through_save_restore() {
        let mut c = Client::new(Xid(1), Rect::new(10, 20, 300, 200), 1);

        c.save_geometry();
        c.geom = Rect::new(0, 0, 1920, 1080);
        c.bw = 0;
        c.restore_geometry();

        assert_eq!(c.geom, Rect::new(10, 20, 300, 200));
        assert_eq!(c.bw, 1);
    }

    #[test]
    fn frame_rect_includes_borders() {
        let c = Client::new(Xid(1), Rect::new(5, 5, 100, 50), 2);

        assert_eq!(c.frame_rect(), Rect::new(5, 5, 104, 54));
    }
}
