//! The process-wide data model: monitors, workspaces, clients, panels and
//! desks, plus the global settings table.
//!
//! Entities reference each other by stable ids (window ids for clients,
//! indexes for workspaces and monitors) rather than pointers, so membership
//! and validity are always checkable by lookup.
use crate::{
    pure::{
        client::{Client, ClientState},
        geometry::{Point, Rect},
        monitor::{Desk, Monitor, Panel},
        workspace::{Workspace, WsDefaults},
    },
    Color, Error, Result, Xid,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Hard upper bound on allocatable workspaces.
pub const MAX_WORKSPACES: usize = 256;

/// The workspace number of the scratchpad, outside the numbered set.
pub const SCRATCH_WS: usize = usize::MAX;

/// Border width and colors.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderCfg {
    /// Width in pixels applied to every managed client
    pub width: i32,
    /// Border color of the focused client
    pub focus: Color,
    /// Border color of urgent clients
    pub urgent: Color,
    /// Border color of unfocused clients
    pub unfocus: Color,
}

impl Default for BorderCfg {
    fn default() -> Self {
        Self {
            width: 1,
            focus: Color::from(0xff6699cc),
            urgent: Color::from(0xffee5555),
            unfocus: Color::from(0xff444444),
        }
    }
}

/// Mouse chord configuration for interactive move/resize.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseCfg {
    /// Modifier mask that arms the move/resize buttons
    pub modifier: u16,
    /// Button that starts an interactive move
    pub move_button: u8,
    /// Button that starts an interactive resize
    pub resize_button: u8,
}

impl Default for MouseCfg {
    fn default() -> Self {
        Self {
            modifier: 1 << 3, // mod1 / alt
            move_button: 1,
            resize_button: 3,
        }
    }
}

/// The global settings table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    /// Number of currently allocated workspaces
    pub num_ws: usize,
    /// Keep workspaces pinned to the monitor they were assigned
    pub static_ws: bool,
    /// Focus follows the mouse pointer
    pub focus_mouse: bool,
    /// Newly opened clients take focus
    pub focus_open: bool,
    /// `_NET_ACTIVE_WINDOW` requests focus instead of setting urgency
    pub focus_urgent: bool,
    /// Minimum client dimension when resizing or tiling
    pub min_wh: i32,
    /// Minimum pixels kept on screen when the user drags a window away
    pub min_xy: i32,
    /// Respect size hints in tiled layouts
    pub tile_hints: bool,
    /// Attach new clients at the head of the list instead of the tail
    pub tile_to_head: bool,
    /// Drop borders when a layout shows a single client
    pub smart_border: bool,
    /// Drop gaps when a layout shows a single client
    pub smart_gap: bool,
    /// Honor motif hints asking for no decoration
    pub obey_motif: bool,
    /// Border width and colors
    pub border: BorderCfg,
    /// Mouse chords for interactive move/resize
    pub mouse: MouseCfg,
    /// Defaults for newly allocated workspaces
    pub ws_def: WsDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_ws: 0,
            static_ws: false,
            focus_mouse: true,
            focus_open: true,
            focus_urgent: true,
            min_wh: 50,
            min_xy: 10,
            tile_hints: false,
            tile_to_head: false,
            smart_border: true,
            smart_gap: true,
            obey_motif: true,
            border: BorderCfg::default(),
            mouse: MouseCfg::default(),
            ws_def: WsDefaults::default(),
        }
    }
}

/// The full pure state of the window manager.
#[derive(Debug, Clone, Default)]
pub struct Model {
    /// Global settings
    pub cfg: Config,
    /// All known monitors, connected or not, in discovery order
    pub monitors: Vec<Monitor>,
    /// The numbered workspaces
    pub workspaces: Vec<Workspace>,
    /// The scratch workspace, outside the numbered set
    pub scratch: Workspace,
    /// Every managed client keyed by window id
    pub clients: HashMap<Xid, Client>,
    /// Dock windows
    pub panels: Vec<Panel>,
    /// Desktop windows
    pub desks: Vec<Desk>,
    /// The selected workspace
    pub sel_ws: usize,
    /// The previously selected workspace
    pub last_ws: usize,
    /// Index of the RandR primary monitor, when set
    pub primary: Option<usize>,
    /// Root window dimensions
    pub screen: Rect,
    /// Focus or title changed since the last status emission
    pub win_change: bool,
    /// Workspace contents changed since the last status emission
    pub ws_change: bool,
    /// Layout changed since the last status emission
    pub layout_change: bool,
    /// The refresh pipeline should run at the end of this loop iteration
    pub needs_refresh: bool,
    // Rotating placement slot used when popping clients out to floating.
    quadrant_index: usize,
    quadrant_ws: usize,
}

impl Model {
    /// Create a model with no monitors or workspaces allocated yet.
    pub fn new(cfg: Config) -> Self {
        let ws_def = cfg.ws_def.clone();
        let mut scratch = Workspace::new(0, 0, &ws_def);
        scratch.num = SCRATCH_WS;
        scratch.name = "scratch".to_string();

        Self {
            cfg,
            scratch,
            needs_refresh: true,
            ..Default::default()
        }
    }

    // ----- lookups ---------------------------------------------------------

    /// The workspace with the given number (the scratchpad for
    /// [SCRATCH_WS]). Panics on an invalid number: workspace references held
    /// by clients and monitors are internal and always valid.
    pub fn ws(&self, num: usize) -> &Workspace {
        if num == SCRATCH_WS {
            &self.scratch
        } else {
            &self.workspaces[num]
        }
    }

    /// Mutable form of [Model::ws].
    pub fn ws_mut(&mut self, num: usize) -> &mut Workspace {
        if num == SCRATCH_WS {
            &mut self.scratch
        } else {
            &mut self.workspaces[num]
        }
    }

    /// Checked workspace lookup for user-supplied numbers.
    pub fn get_ws(&self, num: usize) -> Result<&Workspace> {
        if num == SCRATCH_WS {
            Ok(&self.scratch)
        } else {
            self.workspaces.get(num).ok_or(Error::UnknownWorkspace(num))
        }
    }

    /// The client for `id` if it is managed.
    pub fn client(&self, id: Xid) -> Option<&Client> {
        self.clients.get(&id)
    }

    /// Mutable client lookup.
    pub fn client_mut(&mut self, id: Xid) -> Option<&mut Client> {
        self.clients.get_mut(&id)
    }

    /// Client lookup that reports unknown ids as an [Error].
    pub fn try_client(&self, id: Xid) -> Result<&Client> {
        self.clients.get(&id).ok_or(Error::UnknownClient(id))
    }

    /// The currently selected workspace.
    pub fn cur_ws(&self) -> &Workspace {
        self.ws(self.sel_ws)
    }

    /// The selected client on the selected workspace.
    pub fn cur_client(&self) -> Option<Xid> {
        self.cur_ws().sel
    }

    /// Index of the monitor holding the selected workspace.
    pub fn sel_mon(&self) -> usize {
        self.cur_ws().mon
    }

    /// Indexes of connected monitors in discovery order.
    pub fn connected_monitors(&self) -> impl Iterator<Item = usize> + '_ {
        self.monitors
            .iter()
            .enumerate()
            .filter(|(_, m)| m.connected)
            .map(|(i, _)| i)
    }

    /// The first connected monitor.
    pub fn first_connected(&self) -> Result<usize> {
        self.connected_monitors()
            .next()
            .ok_or(Error::NoConnectedMonitor)
    }

    /// The monitor whose full rect contains `(x, y)`.
    pub fn coord_to_mon(&self, p: Point) -> Option<usize> {
        self.connected_monitors()
            .find(|&i| self.monitors[i].r.contains_point(p))
    }

    /// Find a connected monitor by name or 1-based number.
    pub fn mon_by_reference(&self, s: &str) -> Option<usize> {
        if let Ok(n) = s.parse::<usize>() {
            if n >= 1 {
                return self.connected_monitors().nth(n - 1);
            }
        }

        self.connected_monitors()
            .find(|&i| self.monitors[i].name == s)
    }

    /// The monitor showing the largest share of `r`.
    pub fn mon_for_rect(&self, r: &Rect) -> Option<usize> {
        self.connected_monitors()
            .max_by_key(|&i| self.monitors[i].r.intersection_area(r))
    }

    // ----- list maintenance ------------------------------------------------

    /// Insert `c` into the model without attaching it to any workspace list.
    /// [Model::set_workspace] completes the job.
    pub fn add_client(&mut self, c: Client) {
        self.clients.insert(c.win, c);
    }

    /// Attach `id` to its workspace's tiling order.
    pub fn attach(&mut self, id: Xid, to_head: bool) {
        if let Some(ws) = self.clients.get(&id).map(|c| c.ws) {
            self.ws_mut(ws).attach(id, to_head);
        }
    }

    /// Detach `id` from its workspace's tiling order, optionally reattaching
    /// it at the head.
    pub fn detach(&mut self, id: Xid, reattach: bool) {
        if let Some(ws) = self.clients.get(&id).map(|c| c.ws) {
            let ws = self.ws_mut(ws);
            ws.detach(id);
            if reattach {
                ws.attach(id, true);
            }
        }
    }

    /// Attach `id` to the head of its workspace's focus stack.
    pub fn attach_stack(&mut self, id: Xid) {
        if let Some(ws) = self.clients.get(&id).map(|c| c.ws) {
            self.ws_mut(ws).attach_stack(id, false);
        }
    }

    /// Detach `id` from its workspace's focus stack, promoting the new stack
    /// head to selected if `id` was selected.
    pub fn detach_stack(&mut self, id: Xid) {
        if let Some(ws) = self.clients.get(&id).map(|c| c.ws) {
            self.ws_mut(ws).detach_stack(id);
        }
    }

    /// Move a client between workspaces atomically: detach from both lists
    /// of the old, attach to both lists of the new. Returns true if the
    /// client actually moved (the caller mirrors `_NET_WM_DESKTOP`).
    pub fn set_workspace(&mut self, id: Xid, ws: usize, stack_tail: bool) -> bool {
        let (old, known) = match self.clients.get(&id) {
            Some(c) => (c.ws, true),
            None => (0, false),
        };
        if !known || old == ws {
            return false;
        }

        self.ws_mut(old).detach(id);
        self.ws_mut(old).detach_stack(id);

        if let Some(c) = self.clients.get_mut(&id) {
            c.ws = ws;
        }
        let to_head = self.cfg.tile_to_head;
        self.ws_mut(ws).attach(id, to_head);
        self.ws_mut(ws).attach_stack(id, stack_tail);

        if self.ws(ws).clients.len() == 1 {
            self.ws_change = true;
        }

        true
    }

    /// Re-home a workspace to another monitor. Fails when the workspace is
    /// the only one left on its current monitor: a monitor must always have
    /// at least one workspace.
    pub fn assign_workspace(&mut self, ws: usize, mon: usize) -> Result<()> {
        let old_mon = self.ws(ws).mon;
        if old_mon == mon {
            return Ok(());
        }

        let replacement = self
            .workspaces
            .iter()
            .find(|w| w.mon == old_mon && w.num != ws)
            .map(|w| w.num);

        let replacement = match replacement {
            Some(r) => r,
            None => {
                return Err(Error::LastWorkspaceOnMonitor {
                    ws,
                    mon: self.monitors[old_mon].name.clone(),
                })
            }
        };

        if self.monitors[old_mon].ws == ws {
            self.monitors[old_mon].ws = replacement;
        }
        self.ws_mut(ws).mon = mon;
        self.ws_change = true;
        self.needs_refresh = true;

        Ok(())
    }

    /// Grow the workspace set so that at least `needed` exist (and at least
    /// one per connected monitor), then distribute all workspaces over the
    /// connected monitors round-robin, keeping visible slots valid.
    pub fn update_workspaces(&mut self, needed: usize) -> Result<()> {
        let mons: Vec<usize> = self.connected_monitors().collect();
        if mons.is_empty() {
            return Err(Error::NoConnectedMonitor);
        }
        if needed > MAX_WORKSPACES {
            return Err(Error::TooManyWorkspaces(needed));
        }

        while self.workspaces.len() < needed.max(mons.len()) {
            let num = self.workspaces.len();
            let ws = Workspace::new(num, mons[num % mons.len()], &self.cfg.ws_def);
            self.workspaces.push(ws);
        }
        self.cfg.num_ws = self.workspaces.len();

        let mut cycle = mons.iter().cycle();
        for num in 0..self.workspaces.len() {
            let &m = cycle.next().expect("at least one connected monitor");
            self.workspaces[num].mon = m;
        }

        // With every home settled, make sure each connected monitor shows a
        // workspace it actually owns, preferring the one it already shows.
        for &m in mons.iter() {
            let vis = self.monitors[m].ws;
            let still_owned = vis < self.workspaces.len() && self.workspaces[vis].mon == m;
            if !still_owned {
                if let Some(ws) = self.workspaces.iter().find(|w| w.mon == m) {
                    self.monitors[m].ws = ws.num;
                }
            }
        }

        if self.sel_ws >= self.workspaces.len() {
            self.sel_ws = self.monitors[mons[0]].ws;
        }
        self.ws_change = true;
        self.needs_refresh = true;

        Ok(())
    }

    /// Remove a client record entirely, detaching it from all lists.
    pub fn remove_client(&mut self, id: Xid) -> Option<Client> {
        self.detach(id, false);
        self.detach_stack(id);
        self.clients.remove(&id)
    }

    // ----- state queries ---------------------------------------------------

    /// Whether `c` is on a visible workspace: the visible workspace of its
    /// monitor, or sticky and co-resident on the selected monitor.
    pub fn visible(&self, c: &Client) -> bool {
        let ws = self.ws(c.ws);
        let mon = &self.monitors[ws.mon];

        mon.ws == c.ws
            || (c.state.contains(ClientState::STICKY) && ws.mon == self.sel_mon())
    }

    /// Whether `c` floats: explicitly, or because its workspace layout has
    /// no tile function.
    pub fn floating(&self, c: &Client) -> bool {
        c.state.contains(ClientState::FLOATING) || !self.ws(c.ws).layout.is_tiling()
    }

    /// The tiled clients of a workspace in list order.
    pub fn tiled(&self, ws: usize) -> Vec<Xid> {
        self.ws(ws)
            .clients
            .iter()
            .filter(|id| self.clients.get(id).map(|c| !self.floating(c)).unwrap_or(false))
            .copied()
            .collect()
    }

    /// The number of tiled clients on a workspace.
    pub fn tile_count(&self, ws: usize) -> usize {
        self.tiled(ws).len()
    }

    /// All windows we are responsible for, for `_NET_CLIENT_LIST`: every
    /// workspace's clients, the scratchpad, panels and desks.
    pub fn net_client_list(&self) -> Vec<Xid> {
        let mut ids: Vec<Xid> = self
            .workspaces
            .iter()
            .flat_map(|ws| ws.clients.iter().copied())
            .collect();
        ids.extend(self.scratch.clients.iter().copied());
        ids.extend(self.panels.iter().map(|p| p.win));
        ids.extend(self.desks.iter().map(|d| d.win));

        ids
    }

    /// Recompute every monitor's usable rect from the current panel struts.
    ///
    /// Struts that are larger than the panel itself are first clamped to the
    /// panel's size when the panel sits on the matching screen edge.
    pub fn update_struts(&mut self) {
        for m in self.monitors.iter_mut() {
            m.reset_working_area();
        }

        for i in 0..self.panels.len() {
            let (mon, mut strut, pr) = {
                let p = &self.panels[i];
                (p.mon, p.strut, p.r)
            };
            let mr = self.monitors[mon].r;

            if strut.l > 0 && strut.l > pr.w && pr.x == mr.x {
                strut.l = pr.w;
            }
            if strut.r > 0 && strut.r > pr.w && pr.right() == mr.right() {
                strut.r = pr.w;
            }
            if strut.t > 0 && strut.t > pr.h && pr.y == mr.y {
                strut.t = pr.h;
            }
            if strut.b > 0 && strut.b > pr.h && pr.bottom() == mr.bottom() {
                strut.b = pr.h;
            }

            self.panels[i].strut = strut;
            self.monitors[mon].apply_strut(&strut);
        }

        self.needs_refresh = true;
    }

    /// The next placement slot for a client popped out to floating: a
    /// rotating 3x3 quadrant pattern over the monitor's usable rect.
    pub fn next_quadrant(&mut self, ws: usize, w: i32, h: i32, bw: i32) -> Point {
        let m = &self.monitors[self.ws(ws).mon];
        let (wr, tw, th) = (m.wr, m.wr.w / 3, m.wr.h / 3);
        let slots = [
            (wr.x + tw, wr.y + th),
            (wr.x + 2 * tw, wr.y + th),
            (wr.x, wr.y + th),
            (wr.x + tw, wr.y),
            (wr.x + 2 * tw, wr.y),
            (wr.x, wr.y),
            (wr.x + tw, wr.y + 2 * th),
            (wr.x + 2 * tw, wr.y + 2 * th),
            (wr.x, wr.y + 2 * th),
        ];

        if self.quadrant_ws != ws {
            self.quadrant_ws = ws;
            self.quadrant_index = 0;
        }
        let (qx, qy) = slots[self.quadrant_index];
        self.quadrant_index = (self.quadrant_index + 1) % slots.len();

        let x = (qx - (w - tw) / 2).max(wr.x).min(wr.right() - (w + 2 * bw));
        let y = (qy - (h - th) / 2).max(wr.y).min(wr.bottom() - (h + 2 * bw));

        Point::new(x, y)
    }

    // ----- invariant checking ----------------------------------------------

    /// Assert the structural invariants that must hold at every quiescent
    /// point. Intended for tests; panics with a description on violation.
    pub fn check_invariants(&self) {
        for (id, c) in self.clients.iter() {
            let ws = self.ws(c.ws);
            assert!(
                ws.clients.contains(id),
                "client {} not on workspace {} client list",
                id,
                ws.name
            );
            assert!(
                ws.stack.contains(id),
                "client {} not on workspace {} stack",
                id,
                ws.name
            );
            if c.state.contains(ClientState::FULLSCREEN) {
                assert!(
                    c.state.contains(ClientState::FLOATING),
                    "fullscreen client {} is not floating",
                    id
                );
            }
            if let Some(b) = &c.absorbed {
                assert!(
                    !self.clients.contains_key(&b.win),
                    "absorbed client {} still managed",
                    b.win
                );
            }
            assert_eq!(
                c.bw == 0,
                c.state.contains(ClientState::NOBORDER),
                "client {} border width out of sync with NOBORDER",
                id
            );
        }

        for ws in self.workspaces.iter().chain([&self.scratch]) {
            if let Some(sel) = ws.sel {
                assert!(
                    ws.stack.contains(&sel),
                    "workspace {} selection not on its stack",
                    ws.name
                );
            }
            for id in ws.clients.iter() {
                assert_eq!(
                    self.clients.get(id).map(|c| c.ws),
                    Some(ws.num),
                    "client {} listed on workspace {} but does not reference it",
                    id,
                    ws.name
                );
            }
            assert_eq!(ws.clients.len(), ws.stack.len());
        }

        for (i, m) in self.monitors.iter().enumerate() {
            if m.connected {
                assert_eq!(
                    self.ws(m.ws).mon,
                    i,
                    "monitor {} visible workspace is homed elsewhere",
                    m.name
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_with(mons: usize, ws_count: usize, clients: &[(u32, usize)]) -> Model {
        let mut m = Model::new(Config::default());
        for i in 0..mons {
            m.monitors.push(Monitor::new(
                i as u32 + 1,
                format!("MON-{}", i),
                i,
                Rect::new(1920 * i as i32, 0, 1920, 1080),
                0,
            ));
        }
        m.update_workspaces(ws_count).expect("workspace allocation");
        for &(id, ws) in clients {
            let mut c = Client::new(Xid(id), Rect::new(0, 0, 100, 100), 1);
            c.ws = ws;
            m.add_client(c);
            m.attach(Xid(id), false);
            m.attach_stack(Xid(id));
        }

        m
    }

    #[test]
    fn workspaces_distribute_round_robin() {
        let m = model_with(2, 4, &[]);

        assert_eq!(m.workspaces[0].mon, 0);
        assert_eq!(m.workspaces[1].mon, 1);
        assert_eq!(m.workspaces[2].mon, 0);
        assert_eq!(m.workspaces[3].mon, 1);
        assert_eq!(m.monitors[0].ws, 0);
        assert_eq!(m.monitors[1].ws, 1);
        m.check_invariants();
    }

    #[test]
    fn workspace_count_is_bounded() {
        let mut m = model_with(1, 4, &[]);

        assert!(matches!(
            m.update_workspaces(257),
            Err(Error::TooManyWorkspaces(257))
        ));
        assert_eq!(m.workspaces.len(), 4);

        m.update_workspaces(256).expect("256 is allowed");
        assert_eq!(m.workspaces.len(), 256);
    }

    #[test]
    fn set_workspace_moves_between_both_lists() {
        let mut m = model_with(1, 2, &[(1, 0), (2, 0)]);

        assert!(m.set_workspace(Xid(1), 1, false));

        assert_eq!(m.ws(0).clients, vec![Xid(2)]);
        assert_eq!(m.ws(0).stack, vec![Xid(2)]);
        assert_eq!(m.ws(1).clients, vec![Xid(1)]);
        assert_eq!(m.ws(1).stack, vec![Xid(1)]);
        assert_eq!(m.client(Xid(1)).unwrap().ws, 1);
        m.check_invariants();
    }

    #[test]
    fn set_workspace_to_same_ws_is_a_noop() {
        let mut m = model_with(1, 2, &[(1, 0)]);

        assert!(!m.set_workspace(Xid(1), 0, false));
    }

    #[test]
    fn set_workspace_stack_tail_does_not_take_selection() {
        let mut m = model_with(1, 2, &[(1, 0), (2, 1)]);
        m.ws_mut(1).raise_in_stack(Xid(2));

        m.set_workspace(Xid(1), 1, true);

        assert_eq!(m.ws(1).stack, vec![Xid(2), Xid(1)]);
        assert_eq!(m.ws(1).sel, Some(Xid(2)));
    }

    #[test]
    fn assign_workspace_fails_for_last_ws_on_monitor() {
        let mut m = model_with(2, 2, &[]);

        // Each monitor has exactly one workspace: moving either would orphan
        // its monitor.
        assert!(matches!(
            m.assign_workspace(0, 1),
            Err(Error::LastWorkspaceOnMonitor { ws: 0, .. })
        ));
    }

    #[test]
    fn assign_workspace_rehomes_and_fixes_visible_slot() {
        let mut m = model_with(2, 4, &[]);

        m.assign_workspace(0, 1).expect("workspace 2 remains on mon 0");

        assert_eq!(m.ws(0).mon, 1);
        assert_eq!(m.monitors[0].ws, 2);
        m.check_invariants();
    }

    #[test]
    fn remove_client_detaches_everything() {
        let mut m = model_with(1, 1, &[(1, 0), (2, 0)]);
        m.ws_mut(0).raise_in_stack(Xid(2));

        let c = m.remove_client(Xid(2));

        assert!(c.is_some());
        assert_eq!(m.ws(0).sel, Some(Xid(1)));
        m.check_invariants();
    }

    #[test]
    fn sticky_clients_are_visible_across_workspaces() {
        let mut m = model_with(1, 2, &[(1, 1)]);
        m.client_mut(Xid(1)).unwrap().state |= ClientState::STICKY;

        // ws 1 is hidden (monitor shows ws 0) but the client is sticky and
        // on the selected monitor.
        assert_eq!(m.sel_ws, 0);
        let c = m.client(Xid(1)).unwrap();
        assert!(m.visible(c));
    }

    #[test]
    fn net_client_list_covers_all_containers() {
        let mut m = model_with(1, 2, &[(1, 0), (2, 1)]);
        let mut sc = Client::new(Xid(3), Rect::new(0, 0, 50, 50), 1);
        sc.ws = SCRATCH_WS;
        sc.state |= ClientState::SCRATCH;
        m.add_client(sc);
        m.attach(Xid(3), false);
        m.attach_stack(Xid(3));
        m.panels.push(Panel {
            win: Xid(4),
            r: Rect::new(0, 0, 1920, 30),
            strut: Default::default(),
            mon: 0,
            class: "bar".into(),
            instance: "bar".into(),
        });

        let ids = m.net_client_list();

        assert_eq!(ids.len(), 4);
        for id in [1, 2, 3, 4] {
            assert!(ids.contains(&Xid(id)));
        }
    }

    #[test]
    fn update_struts_clamps_oversized_struts() {
        let mut m = model_with(1, 1, &[]);
        m.panels.push(Panel {
            win: Xid(9),
            r: Rect::new(0, 0, 1920, 30),
            strut: crate::pure::monitor::Strut { t: 500, ..Default::default() },
            mon: 0,
            class: "bar".into(),
            instance: "bar".into(),
        });

        m.update_struts();

        assert_eq!(m.panels[0].strut.t, 30);
        assert_eq!(m.monitors[0].wr, Rect::new(0, 30, 1920, 1050));
    }

    #[test]
    fn quadrant_rotates_and_stays_usable() {
        let mut m = model_with(1, 1, &[]);

        let p1 = m.next_quadrant(0, 400, 300, 1);
        let p2 = m.next_quadrant(0, 400, 300, 1);

        assert_ne!(p1, p2);
        let wr = m.monitors[0].wr;
        for p in [p1, p2] {
            assert!(wr.contains_point(p));
        }
    }
}
