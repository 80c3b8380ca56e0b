//! RandR monitor discovery and the relocation of clients across outputs.
use crate::{
    core::Wm,
    pure::{
        client::ClientState,
        geometry::{Gravity, Rect},
        monitor::Monitor,
    },
    x::XConn,
    Result, Xid,
};
use tracing::{debug, info, warn};

/// Re-enumerate RandR outputs, updating the monitor list in place. Returns
/// true when anything changed (new output, geometry change, disconnect).
///
/// Monitors are never removed: a disconnected output keeps its record so its
/// workspaces can be reassigned without losing their settings, and so it can
/// be re-adopted if the output returns.
pub fn update_monitors<X: XConn>(wm: &mut Wm<X>) -> Result<bool> {
    let outputs = wm.x.outputs()?;
    let mut changed = false;
    let mut seen = vec![false; wm.model.monitors.len()];

    if outputs.is_empty() {
        // No RandR information: treat the whole screen as one monitor.
        if wm.model.monitors.is_empty() {
            let r = wm.model.screen;
            wm.model.monitors.push(Monitor::new(0, "default", 0, r, 0));
            wm.model.primary = Some(0);
            return Ok(true);
        }
        return Ok(false);
    }

    for out in outputs.iter() {
        // An output mirroring an already-known monitor at the same origin
        // and size is a clone; skip it.
        let clone = wm
            .model
            .monitors
            .iter()
            .any(|m| m.id != out.id && m.connected && m.r == out.r);
        if clone {
            debug!(name = %out.name, "skipping cloned output");
            continue;
        }

        match wm.model.monitors.iter().position(|m| m.id == out.id) {
            Some(i) => {
                seen[i] = true;
                let m = &mut wm.model.monitors[i];
                if !m.connected || m.r != out.r {
                    info!(name = %m.name, ?out.r, "monitor geometry updated");
                    m.connected = true;
                    m.r = out.r;
                    m.wr = out.r;
                    changed = true;
                }
            }
            None => {
                let num = wm.model.monitors.len();
                info!(name = %out.name, ?out.r, "new monitor");
                wm.model
                    .monitors
                    .push(Monitor::new(out.id, out.name.clone(), num, out.r, 0));
                changed = true;
            }
        }
    }

    for (i, was_seen) in seen.into_iter().enumerate() {
        let m = &mut wm.model.monitors[i];
        if !was_seen && m.connected && !outputs.iter().any(|o| o.id == m.id) {
            info!(name = %m.name, "monitor disconnected");
            m.connected = false;
            changed = true;
        }
    }

    wm.model.primary = outputs
        .iter()
        .find(|o| o.primary)
        .and_then(|o| wm.model.monitors.iter().position(|m| m.id == o.id))
        .or_else(|| wm.model.connected_monitors().next());

    Ok(changed)
}

impl<X: XConn> Wm<X> {
    /// React to a RandR screen-change notification: re-enumerate outputs
    /// and, if the topology changed, redistribute workspaces and relocate
    /// the clients of any workspace that moved monitor.
    pub fn handle_randr_change(&mut self) {
        let changed = match update_monitors(self) {
            Ok(c) => c,
            Err(e) => {
                warn!(%e, "unable to query RandR outputs");
                return;
            }
        };

        if changed {
            let old_homes: Vec<usize> = self.model.workspaces.iter().map(|w| w.mon).collect();

            let needed = self.model.cfg.num_ws;
            if let Err(e) = self.model.update_workspaces(needed) {
                warn!(%e, "unable to redistribute workspaces");
                return;
            }

            for num in 0..self.model.workspaces.len() {
                let new_mon = self.model.ws(num).mon;
                let old = match old_homes.get(num).copied() {
                    Some(o) if o != new_mon => o,
                    _ => continue,
                };
                for id in self.model.ws(num).clients.clone() {
                    self.relocate_client(id, new_mon, old);
                }
            }

            if self.model.sel_ws >= self.model.workspaces.len()
                || !self.model.monitors[self.model.sel_mon()].connected
            {
                if let Ok(first) = self.model.first_connected() {
                    let ws = self.model.monitors[first].ws;
                    self.model.sel_ws = ws;
                }
            }

            let _ = self.update_net_workspaces();
        }

        self.model.update_struts();
        let _ = self.update_net_workspaces();
        self.model.needs_refresh = true;
    }

    /// Relocate every client of `ws` after it moved from `old` to its new
    /// monitor. Only meaningful when the workspace is (or was) visible.
    pub(crate) fn relocate_workspace(&mut self, ws: usize, old: usize, was_visible: bool) {
        let mon = self.model.ws(ws).mon;
        if mon == old || self.model.monitors[mon].ws != ws || !was_visible {
            return;
        }
        debug!(ws = %self.model.ws(ws).name, old_mon = %self.model.monitors[old].name, "relocating workspace");

        for id in self.model.ws(ws).clients.clone() {
            self.relocate_client(id, mon, old);
        }
    }

    /// Refit one client after a monitor change: fullscreen windows take the
    /// new full rect, floating windows rescale proportionally into the new
    /// monitor and get re-constrained by their size hints.
    pub(crate) fn relocate_client(&mut self, id: Xid, mon: usize, old: usize) {
        let (new_r, old_r) = (self.model.monitors[mon].r, self.model.monitors[old].r);
        let (floating, sticky, fullscreen, geom, bw) = match self.model.client(id) {
            Some(c) => (
                self.model.floating(c),
                c.state.contains(ClientState::STICKY),
                c.state.contains(ClientState::FULLSCREEN),
                c.geom,
                c.bw,
            ),
            None => return,
        };

        if !floating || new_r.contains(&geom) {
            return;
        }
        if sticky {
            // Sticky clients stay with the selected workspace.
            let vis = self.model.monitors[old].ws;
            let keep = self.model.cur_client();
            self.set_client_workspace(id, vis, false);
            self.focus(keep);
            return;
        }

        if fullscreen && geom.w == old_r.w && geom.h == old_r.h {
            if let Some(c) = self.model.client_mut(id) {
                c.geom = new_r;
            }
            return;
        }

        // Proportional rescale from the old monitor into the new one.
        let corner = geom.x == old_r.x && geom.y == old_r.y;
        let nx = new_r.x + (geom.x - old_r.x) * new_r.w / old_r.w.max(1);
        let ny = new_r.y + (geom.y - old_r.y) * new_r.h / old_r.h.max(1);
        let nw = geom.w * new_r.w / old_r.w.max(1);
        let nh = geom.h * new_r.h / old_r.h.max(1);

        if let Some(c) = self.model.client_mut(id) {
            c.geom = Rect::new(nx, ny, nw, nh);
        }
        let mut r = Rect::new(nx, ny, nw, nh);
        self.apply_size_hints(id, &mut r, bw, false, false);
        if let Some(c) = self.model.client_mut(id) {
            c.geom = r;
        }
        if !corner && r.x == new_r.x && r.y == new_r.y {
            self.gravitate(id, Gravity::Center, Gravity::Center, true);
        }
        debug!(%id, ?r, "relocated client");
    }
}
