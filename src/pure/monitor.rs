//! Monitors, panels and desktop windows.
use crate::{pure::geometry::Rect, Xid};
use serde::{Deserialize, Serialize};

/// A physical output as reported by RandR.
///
/// Disconnected monitors are retained (with `connected = false`) so that
/// their workspaces can be reassigned without losing per-workspace settings,
/// and re-adopted if the output comes back.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Monitor {
    /// RandR output id
    pub id: u32,
    /// Output name (e.g. `eDP-1`)
    pub name: String,
    /// 0-based index in discovery order
    pub num: usize,
    /// Whether the output is currently connected
    pub connected: bool,
    /// Full rectangle on the X screen
    pub r: Rect,
    /// Usable rectangle after panel struts are subtracted
    pub wr: Rect,
    /// Number of the workspace currently visible on this monitor
    pub ws: usize,
}

impl Monitor {
    /// Create a connected monitor record showing workspace `ws`.
    pub fn new(id: u32, name: impl Into<String>, num: usize, r: Rect, ws: usize) -> Self {
        Self {
            id,
            name: name.into(),
            num,
            connected: true,
            r,
            wr: r,
            ws,
        }
    }

    /// Reset the usable rect to the full output rect (before struts).
    pub fn reset_working_area(&mut self) {
        self.wr = self.r;
    }

    /// Subtract a panel strut from the usable rect.
    ///
    /// Struts are given as reserved pixels from each screen edge; each one
    /// only narrows the usable area, never widens it.
    pub fn apply_strut(&mut self, strut: &Strut) {
        if self.r.x + strut.l > self.wr.x {
            let shift = self.r.x + strut.l - self.wr.x;
            self.wr.x += shift;
            self.wr.w -= shift;
        }
        if self.r.y + strut.t > self.wr.y {
            let shift = self.r.y + strut.t - self.wr.y;
            self.wr.y += shift;
            self.wr.h -= shift;
        }
        if self.wr.right() > self.r.right() - strut.r {
            self.wr.w = self.r.right() - strut.r - self.wr.x;
        }
        if self.wr.bottom() > self.r.bottom() - strut.b {
            self.wr.h = self.r.bottom() - strut.b - self.wr.y;
        }
    }
}

/// Screen-edge pixels reserved by a panel.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Strut {
    /// Pixels reserved at the left edge
    pub l: i32,
    /// Pixels reserved at the right edge
    pub r: i32,
    /// Pixels reserved at the top edge
    pub t: i32,
    /// Pixels reserved at the bottom edge
    pub b: i32,
}

/// A dock-type window. Panels are not laid out; they reserve screen edges
/// via struts on the monitor they sit on.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    /// The panel window
    pub win: Xid,
    /// Window geometry
    pub r: Rect,
    /// Reserved edges parsed from `_NET_WM_STRUT[_PARTIAL]`
    pub strut: Strut,
    /// Index of the monitor the panel occupies
    pub mon: usize,
    /// WM_CLASS class
    pub class: String,
    /// WM_CLASS instance
    pub instance: String,
}

/// A desktop-type window pinned below all others on its monitor.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Desk {
    /// The desktop window
    pub win: Xid,
    /// Index of the monitor it covers
    pub mon: usize,
    /// WM_CLASS class
    pub class: String,
    /// WM_CLASS instance
    pub instance: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case(
        Strut { t: 30, ..Default::default() },
        Rect::new(0, 30, 1920, 1050);
        "top bar"
    )]
    #[test_case(
        Strut { b: 40, ..Default::default() },
        Rect::new(0, 0, 1920, 1040);
        "bottom bar"
    )]
    #[test_case(
        Strut { l: 50, r: 20, ..Default::default() },
        Rect::new(50, 0, 1850, 1080);
        "side docks"
    )]
    #[test_case(Strut::default(), Rect::new(0, 0, 1920, 1080); "no struts")]
    #[test]
    fn strut_subtraction(strut: Strut, expected: Rect) {
        let mut m = Monitor::new(1, "HDMI-1", 0, Rect::new(0, 0, 1920, 1080), 0);

        m.apply_strut(&strut);

        assert_eq!(m.wr, expected);
    }

    #[test]
    fn struts_accumulate_across_panels() {
        let mut m = Monitor::new(1, "HDMI-1", 0, Rect::new(0, 0, 1920, 1080), 0);

        m.apply_strut(&Strut { t: 30, ..Default::default() });
        m.apply_strut(&Strut { b: 40, ..Default::default() });

        assert_eq!(m.wr, Rect::new(0, 30, 1920, 1010));
    }

    #[test]
    fn struts_respect_monitor_origin() {
        // A second monitor to the right of the first: a 30px top strut there
        // reserves from its own top edge.
        let mut m = Monitor::new(2, "DP-1", 1, Rect::new(1920, 0, 1920, 1080), 1);

        m.apply_strut(&Strut { t: 30, ..Default::default() });

        assert_eq!(m.wr, Rect::new(1920, 30, 1920, 1050));
    }
}
