//! The window manager context and its refresh pipeline.
//!
//! [Wm] owns the pure [Model], the rule list and the X transport, and is the
//! single value threaded through every operation: there is no ambient global
//! state. All X side effects flow through the [XConn] trait so the whole
//! core can be driven by the mock transport in tests.
use crate::{
    layout::{self, LayoutCtx, LayoutKind, Tile},
    pure::{
        client::ClientState,
        geometry::{Gravity, Point, Rect},
        model::{Config, Model},
    },
    rules::Rules,
    status::Subscriber,
    x::{Atom, ClientAttr, ClientConfig, Prop, WmState, XConn, XConnExt, EWMH_SUPPORTED_ATOMS},
    Result, Xid,
};
use tracing::{debug, trace, warn};

pub mod clients;
pub mod event;
pub mod monitors;
pub mod mouse;
pub mod snapshot;
pub mod socket;
pub mod workspaces;

/// Names of the built-in lifecycle callbacks a rule may bind to a client.
pub const CALLBACK_NAMES: &[&str] = &["albumart"];

/// The running window manager: pure state plus the X transport.
pub struct Wm<X: XConn> {
    /// The X transport
    pub x: X,
    /// The pure data model
    pub model: Model,
    /// The rule list
    pub rules: Rules,
    /// Live status subscribers
    pub subscribers: Vec<Subscriber>,
    /// Cleared to break out of the main loop
    pub running: bool,
    /// Set when the loop should re-exec rather than exit
    pub restart: bool,
    /// The client the current command line operates on
    pub(crate) cmd_target: Option<Xid>,
    /// The command named its client explicitly rather than using the selection
    pub(crate) cmd_target_passed: bool,
    /// The current `mon` command addresses monitors rather than workspaces
    pub(crate) cmd_use_mon: bool,
    check_win: Xid,
}

impl<X: XConn> Wm<X> {
    /// Register as the window manager for the display and build the initial
    /// model from the current RandR state.
    pub fn new(x: X, cfg: Config) -> Result<Self> {
        x.register_wm()?;

        let mut model = Model::new(cfg);
        model.screen = x.screen_size();

        let mut wm = Self {
            x,
            model,
            rules: Rules::default(),
            subscribers: Vec::new(),
            running: true,
            restart: false,
            cmd_target: None,
            cmd_target_passed: false,
            cmd_use_mon: false,
            check_win: Xid(0),
        };

        monitors::update_monitors(&mut wm)?;
        let needed = wm.model.cfg.num_ws.max(1);
        wm.model.update_workspaces(needed)?;
        wm.init_ewmh()?;

        Ok(wm)
    }

    fn init_ewmh(&mut self) -> Result<()> {
        let root = self.x.root();
        self.check_win = self.x.create_check_window()?;

        let check = Prop::Window(vec![self.check_win]);
        self.x.set_prop(
            self.check_win,
            Atom::NetWmName.as_ref(),
            Prop::UTF8String(vec![crate::x::WM_NAME.to_string()]),
        )?;
        self.x
            .set_prop(self.check_win, Atom::NetSupportingWmCheck.as_ref(), check.clone())?;
        self.x
            .set_prop(root, Atom::NetSupportingWmCheck.as_ref(), check)?;
        self.x.set_prop(
            root,
            Atom::NetSupported.as_ref(),
            Prop::Atoms(
                EWMH_SUPPORTED_ATOMS
                    .iter()
                    .map(|a| a.as_ref().to_string())
                    .collect(),
            ),
        )?;

        self.update_net_workspaces()?;
        self.update_net_client_list()?;

        Ok(())
    }

    /// Manage every pre-existing window, transients last so their parents
    /// are already known when they arrive.
    pub fn scan(&mut self) -> Result<()> {
        let ids = self.x.existing_windows()?;
        let (plain, transient): (Vec<Xid>, Vec<Xid>) = ids
            .into_iter()
            .partition(|&id| self.x.transient_for(id).is_none());

        for id in plain.into_iter().chain(transient) {
            self.manage(id, true);
        }

        Ok(())
    }

    // ----- geometry --------------------------------------------------------

    /// The usable rect of the monitor a client lives on.
    pub(crate) fn client_mon_rects(&self, id: Xid) -> (Rect, Rect) {
        let mon = match self.model.client(id) {
            Some(c) => self.model.ws(c.ws).mon,
            None => self.model.sel_mon(),
        };
        let m = &self.model.monitors[mon];

        (m.r, m.wr)
    }

    /// Constrain a proposed geometry per the ICCCM rules and the global
    /// settings. Returns true when the result differs from the client's
    /// stored geometry (so a configure needs to be issued).
    pub(crate) fn apply_size_hints(
        &mut self,
        id: Xid,
        r: &mut Rect,
        bw: i32,
        user_motion: bool,
        mouse: bool,
    ) -> bool {
        let (min_wh, min_xy) = (self.model.cfg.min_wh, self.model.cfg.min_xy);
        let tile_hints = self.model.cfg.tile_hints;
        let screen = self.model.screen;
        let (_, wr) = self.client_mon_rects(id);
        let floating = match self.model.client(id) {
            Some(c) => self.model.floating(c),
            None => return false,
        };

        self.fetch_size_hints_if_needed(id);
        let c = match self.model.client(id) {
            Some(c) => c,
            None => return false,
        };

        r.w = r.w.max(1);
        r.h = r.h.max(1);
        if user_motion {
            if !mouse {
                if let Some(h) = c.hints {
                    h.snap_to_increment(c.geom.w, c.geom.h, &mut r.w, &mut r.h);
                }
                r.h = r.h.min(wr.h);
                r.w = r.w.min(wr.w);
            }
            r.x = r.x.max(-(r.w - min_xy)).min(screen.w - (min_xy + bw));
            r.y = r.y.max(-(r.h - min_xy)).min(screen.h - (min_xy + bw));
        } else {
            r.w = r.w.max(min_wh).min(wr.w - 2 * bw);
            r.h = r.h.max(min_wh).min(wr.h - 2 * bw);
            r.x = r.x.max(wr.x).min(wr.x + wr.w - (r.w + bw));
            r.y = r.y.max(wr.y).min(wr.y + wr.h - (r.h + bw));
        }

        if floating || tile_hints {
            if let Some(h) = c.hints {
                h.constrain(&mut r.w, &mut r.h);
            }
        }

        *r != c.geom || bw != c.bw || c.state.contains(ClientState::NEEDSMAP)
    }

    fn fetch_size_hints_if_needed(&mut self, id: Xid) {
        let needs = matches!(self.model.client(id), Some(c) if c.hints.is_none());
        if !needs {
            return;
        }

        let hints = self.x.normal_hints(id);
        if let Some(c) = self.model.client_mut(id) {
            c.hints = Some(hints);
            if hints.is_fixed() {
                c.state |= ClientState::FIXED | ClientState::FLOATING;
            }
        }
    }

    /// Apply a new geometry to a client and tell the X server.
    pub(crate) fn resize(&mut self, id: Xid, r: Rect, bw: i32) {
        let focused = self.model.cur_client() == Some(id);
        let min_wh = self.model.cfg.min_wh;
        let (floating, fullscreen) = match self.model.client(id) {
            Some(c) => (self.model.floating(c), c.real_fullscreen()),
            None => return,
        };

        // Only the geometry is recorded: a layout may paint a zero border
        // (smart border) without the client's configured width changing.
        if let Some(c) = self.model.client_mut(id) {
            if floating && !fullscreen {
                c.old_geom = c.geom;
            }
            c.geom = r;
        }

        let clamped = Rect::new(r.x, r.y, r.w.max(min_wh), r.h.max(min_wh));
        let _ = self
            .x
            .set_client_config(id, &[ClientConfig::Position(clamped), ClientConfig::BorderPx(bw)]);
        self.client_border(id, focused);
        let _ = self.x.send_configure_notify(id, clamped, bw);
        self.x.flush();
    }

    /// Resize through the size-hint path: only issues a configure when the
    /// constrained geometry actually changed.
    pub(crate) fn resize_hint(
        &mut self,
        id: Xid,
        mut r: Rect,
        bw: i32,
        user_motion: bool,
        mouse: bool,
    ) {
        if self.apply_size_hints(id, &mut r, bw, user_motion, mouse) {
            self.resize(id, r, bw);
        }
    }

    /// Align a floating client to an edge or center of its monitor's usable
    /// rect (or its transient parent), optionally inset by the workspace gap.
    pub fn gravitate(&mut self, id: Xid, xg: Gravity, yg: Gravity, match_gap: bool) {
        let (visible, cur, full_w, full_h, container, gap) = match self.model.client(id) {
            Some(c) if self.model.floating(c) => {
                let parent = c.trans.and_then(|t| self.model.client(t));
                let (container, gap) = match parent {
                    Some(p) => (p.geom, 0),
                    None => {
                        let (_, wr) = self.client_mon_rects(id);
                        let g = if match_gap { self.model.ws(c.ws).gap } else { 0 };
                        (wr, g)
                    }
                };
                (
                    self.model.visible(c),
                    c.geom,
                    c.full_w(),
                    c.full_h(),
                    container,
                    gap,
                )
            }
            _ => return,
        };

        let x = xg.apply_x(&container, full_w, gap).unwrap_or(cur.x);
        let y = yg.apply_y(&container, full_h, gap).unwrap_or(cur.y);
        if (x, y) == (cur.x, cur.y) {
            return;
        }

        if let Some(c) = self.model.client_mut(id) {
            c.geom.x = x;
            c.geom.y = y;
        }
        if visible {
            let bw = self.model.client(id).map(|c| c.bw).unwrap_or(0);
            self.resize_hint(id, Rect::new(x, y, cur.w, cur.h), bw, false, false);
        }
    }

    // ----- borders and focus ----------------------------------------------

    /// Repaint a client's border for its focus / urgency state.
    pub(crate) fn client_border(&mut self, id: Xid, focused: bool) {
        let (bw, urgent, noborder) = match self.model.client(id) {
            Some(c) => (
                c.bw,
                c.state.contains(ClientState::URGENT),
                c.state.contains(ClientState::NOBORDER),
            ),
            None => return,
        };
        if noborder || bw == 0 {
            return;
        }

        let b = &self.model.cfg.border;
        let color = if focused {
            b.focus
        } else if urgent {
            b.urgent
        } else {
            b.unfocus
        };
        let _ = self
            .x
            .set_client_attributes(id, &[ClientAttr::BorderColor(color.argb_u32())]);
    }

    /// Drop focus from a client, optionally reverting input focus to the
    /// root and clearing `_NET_ACTIVE_WINDOW`.
    pub(crate) fn unfocus(&mut self, id: Option<Xid>, focus_root: bool) {
        if let Some(id) = id {
            self.client_border(id, false);
        }
        if focus_root {
            let root = self.x.root();
            let _ = self.x.focus(root);
            let _ = self.x.delete_prop(root, Atom::NetActiveWindow.as_ref());
        }
    }

    /// Give a client X input focus, honoring `NOINPUT`, and advertise it via
    /// `_NET_ACTIVE_WINDOW`.
    pub(crate) fn set_input_focus(&mut self, id: Xid) {
        let no_input = matches!(
            self.model.client(id),
            Some(c) if c.state.contains(ClientState::NOINPUT)
        );

        if !no_input {
            let _ = self.x.focus(id);
            let _ = self.x.set_prop(
                self.x.root(),
                Atom::NetActiveWindow.as_ref(),
                Prop::Window(vec![id]),
            );
        }
        let _ = self.x.send_wm_protocol(id, Atom::WmTakeFocus);
    }

    /// Focus a client, or the top of the selected workspace's stack when
    /// `None` (the root gets focus if the workspace is empty).
    pub fn focus(&mut self, id: Option<Xid>) {
        let sel_ws = self.model.sel_ws;
        let id = id
            .filter(|c| self.model.clients.contains_key(c))
            .or_else(|| self.model.ws(sel_ws).stack.first().copied());

        if let Some(prev) = self.model.ws(sel_ws).sel {
            if Some(prev) != id {
                self.unfocus(Some(prev), false);
            }
        }

        match id {
            Some(id) => {
                trace!(%id, "focusing client");
                if matches!(self.model.client(id), Some(c) if c.state.contains(ClientState::URGENT))
                {
                    self.set_urgent(id, false);
                }
                let ws = self.model.clients[&id].ws;
                self.model.ws_mut(ws).raise_in_stack(id);
                self.client_border(id, true);
                self.set_input_focus(id);
                self.cmd_target = Some(id);

                // A monocle workspace re-runs layout so the newly selected
                // client comes back on screen.
                if self.model.ws(ws).layout == LayoutKind::Mono {
                    self.layout_workspace(ws);
                    let _ = self.x.drain_enter_notify();
                }
            }
            None => {
                self.unfocus(None, true);
                self.model.ws_mut(sel_ws).sel = None;
            }
        }
        self.model.win_change = true;
    }

    /// Mirror a client's urgency state into its ICCCM hints and border.
    pub fn set_urgent(&mut self, id: Xid, urgent: bool) {
        let selected = self.model.cur_client() == Some(id);
        if let Some(c) = self.model.client_mut(id) {
            if urgent && !selected {
                c.state |= ClientState::URGENT;
            } else if !urgent {
                c.state -= ClientState::URGENT;
            }
        }

        let mut hints = self.x.wm_hints(id);
        hints.urgent = urgent && !selected;
        let _ = self.x.set_prop(id, Atom::WmHints.as_ref(), Prop::WmHints(hints));
        if !selected {
            self.client_border(id, false);
        }
    }

    // ----- fullscreen ------------------------------------------------------

    /// Enter or leave fullscreen, saving and restoring geometry. `FAKEFULL`
    /// clients advertise the state without the geometry change.
    pub fn set_fullscreen(&mut self, id: Xid, fullscreen: bool) {
        let (mon_r, _) = self.client_mon_rects(id);
        let (cur, visible) = match self.model.client(id) {
            Some(c) => (c.state.contains(ClientState::FULLSCREEN), self.model.visible(c)),
            None => return,
        };

        if fullscreen && !cur {
            let _ = self.x.set_prop(
                id,
                Atom::NetWmState.as_ref(),
                Prop::Atoms(vec![Atom::NetWmStateFullscreen.as_ref().to_string()]),
            );
            if let Some(c) = self.model.client_mut(id) {
                c.old_state = c.state;
                c.old_geom = c.geom;
                if c.bw != 0 || c.state.contains(ClientState::NOBORDER) {
                    c.old_bw = c.bw;
                }
                c.state |= ClientState::FULLSCREEN | ClientState::FLOATING;
                c.set_border_width(0);
            }
            if visible {
                self.resize(id, mon_r, 0);
                let _ = self.x.set_client_config(id, &[ClientConfig::StackAbove]);
                self.refresh();
            }
        } else if !fullscreen && cur {
            let _ = self
                .x
                .set_prop(id, Atom::NetWmState.as_ref(), Prop::Atoms(vec![]));
            let restored = match self.model.client_mut(id) {
                Some(c) => {
                    c.state = c.old_state;
                    c.set_border_width(c.old_bw);
                    (c.old_geom, c.bw)
                }
                None => return,
            };
            if visible {
                self.resize_hint(id, restored.0, restored.1, false, false);
                self.refresh();
            } else if let Some(c) = self.model.client_mut(id) {
                c.geom = c.old_geom;
            }
        }
        self.x.flush();
    }

    // ----- layout and refresh ---------------------------------------------

    /// Run one workspace's layout and apply the resulting placements,
    /// popping any clients the layout could not fit out to floating.
    /// Returns true if the layout reported overflow.
    pub(crate) fn layout_workspace(&mut self, ws: usize) -> bool {
        let kind = self.model.ws(ws).layout;
        if !kind.is_tiling() {
            return false;
        }

        let res = layout::layout(kind, &self.layout_ctx(ws));
        self.model.ws_mut(ws).smart_gap = res.smart_gap;
        for id in res.popped.iter() {
            self.pop_float(*id);
        }
        for p in res.placements.iter() {
            self.resize_hint(p.id, p.r, p.bw, false, false);
        }
        // Monocle keeps unselected clients mapped but parked out of sight;
        // the park bypasses the clamping in the resize path.
        for id in res.parked.iter() {
            if let Some(c) = self.model.client(*id) {
                let _ = self.x.set_client_config(
                    *id,
                    &[ClientConfig::Move(Point::new(-2 * c.full_w(), c.geom.y))],
                );
            }
        }

        res.overflowed || !res.popped.is_empty()
    }

    fn layout_ctx(&self, ws: usize) -> LayoutCtx {
        let w = self.model.ws(ws);
        let m = &self.model.monitors[w.mon];
        let tiles = self
            .model
            .tiled(ws)
            .into_iter()
            .filter_map(|id| {
                self.model.client(id).map(|c| Tile {
                    id,
                    bw: c.bw,
                    hoff: c.hoff,
                })
            })
            .collect();

        LayoutCtx {
            r: m.wr.with_padding(w.pad_l, w.pad_r, w.pad_t, w.pad_b),
            tiles,
            sel: w.sel,
            gap: w.gap,
            nmaster: w.nmaster,
            nstack: w.nstack,
            msplit: w.msplit,
            ssplit: w.ssplit,
            min_wh: self.model.cfg.min_wh,
            smart_gap: self.model.cfg.smart_gap,
            smart_border: self.model.cfg.smart_border,
        }
    }

    /// Detach a client from tiling: mark it floating and place it in the
    /// next free quadrant of its monitor.
    pub(crate) fn pop_float(&mut self, id: Xid) {
        let (ws, mut w, mut h, bw) = match self.model.client(id) {
            Some(c) => (c.ws, c.geom.w, c.geom.h, c.bw),
            None => return,
        };
        let (_, wr) = self.client_mon_rects(id);

        if let Some(c) = self.model.client_mut(id) {
            c.state |= ClientState::FLOATING;
        }
        w = w.clamp(wr.w / 8, wr.w / 3);
        h = h.clamp(wr.h / 8, wr.h / 3);
        let p = self.model.next_quadrant(ws, w, h, bw);
        self.resize_hint(id, Rect::new(p.x, p.y, w, h), bw, false, false);
        let _ = self.x.set_client_config(id, &[ClientConfig::StackAbove]);
    }

    /// Map a window if it still has a deferred map pending.
    pub(crate) fn win_map(&mut self, id: Xid) {
        let needs = matches!(
            self.model.client(id),
            Some(c) if c.state.contains(ClientState::NEEDSMAP)
        );
        if needs {
            let _ = self.x.set_wm_state(id, WmState::Normal);
            let _ = self.x.map(id);
            if let Some(c) = self.model.client_mut(id) {
                c.state -= ClientState::NEEDSMAP;
            }
        }
    }

    /// Unmap a window without generating an unmanage, marking it withdrawn.
    pub(crate) fn win_unmap(&mut self, id: Xid) {
        let _ = self.x.set_client_attributes(id, &[ClientAttr::ClientUnmapMask]);
        let _ = self.x.unmap(id);
        let _ = self.x.set_client_attributes(id, &[ClientAttr::ClientEventMask]);
        let _ = self.x.set_wm_state(id, WmState::Withdrawn);
    }

    /// The refresh pipeline: per monitor run the visible workspace's layout,
    /// place floating and fullscreen clients, map anything pending, restack,
    /// and re-assert focus. EnterNotify events generated along the way are
    /// swallowed.
    pub fn refresh(&mut self) {
        let mons: Vec<usize> = self.model.connected_monitors().collect();

        for mi in mons {
            let ws = self.model.monitors[mi].ws;
            debug!(ws = %self.model.ws(ws).name, mon = %self.model.monitors[mi].name, "refreshing monitor");
            if self.layout_workspace(ws) {
                // A layout that popped clients lays out again with the
                // remaining tiles.
                self.layout_workspace(ws);
            }

            let mon_r = self.model.monitors[mi].r;
            for id in self.model.ws(ws).clients.clone() {
                let (fullscreen, floating, geom, bw) = match self.model.client(id) {
                    Some(c) => (c.real_fullscreen(), self.model.floating(c), c.geom, c.bw),
                    None => continue,
                };
                if fullscreen {
                    self.resize(id, mon_r, 0);
                } else if floating {
                    self.resize_hint(id, geom, bw, false, false);
                }
                self.win_map(id);
            }

            self.restack(ws);
        }

        for p in self.model.panels.clone() {
            let _ = self.x.map(p.win);
        }
        for d in self.model.desks.clone() {
            let _ = self.x.map(d.win);
        }

        self.focus(None);
        if let Some(sel) = self.model.cur_client() {
            let floating = self
                .model
                .client(sel)
                .map(|c| self.model.floating(c))
                .unwrap_or(false);
            if floating {
                let _ = self.x.set_client_config(sel, &[ClientConfig::StackAbove]);
            }
        }

        let _ = self.x.drain_enter_notify();
        self.x.flush();
        self.model.needs_refresh = false;
    }

    /// Re-apply stacking order on one workspace: panels above tiled
    /// clients, `ABOVE` floaters on top, desks at the bottom.
    pub(crate) fn restack(&mut self, ws: usize) {
        let mon = self.model.ws(ws).mon;

        for p in self.model.panels.clone() {
            if p.mon == mon {
                let _ = self.x.set_client_config(p.win, &[ClientConfig::StackBelow]);
            }
        }
        for id in self.model.ws(ws).stack.clone() {
            let (floating, above) = match self.model.client(id) {
                Some(c) => (self.model.floating(c), c.state.contains(ClientState::ABOVE)),
                None => continue,
            };
            if !floating {
                let _ = self.x.set_client_config(id, &[ClientConfig::StackBelow]);
            } else if above {
                let _ = self.x.set_client_config(id, &[ClientConfig::StackAbove]);
            }
        }
        for d in self.model.desks.clone() {
            if d.mon == mon {
                let _ = self.x.set_client_config(d.win, &[ClientConfig::StackBelow]);
            }
        }
    }

    // ----- root properties -------------------------------------------------

    /// Rewrite `_NET_CLIENT_LIST` from the model.
    pub(crate) fn update_net_client_list(&mut self) -> Result<()> {
        let ids = self.model.net_client_list();
        self.x
            .set_prop(self.x.root(), Atom::NetClientList.as_ref(), Prop::Window(ids))
    }

    /// Rewrite the desktop-related root properties from the model.
    pub(crate) fn update_net_workspaces(&mut self) -> Result<()> {
        let root = self.x.root();
        let n = self.model.workspaces.len() as u32;
        let screen = self.model.screen;

        self.x
            .set_prop(root, Atom::NetNumberOfDesktops.as_ref(), Prop::Cardinal(vec![n]))?;
        self.x.set_prop(
            root,
            Atom::NetDesktopGeometry.as_ref(),
            Prop::Cardinal(vec![screen.w as u32, screen.h as u32]),
        )?;
        self.x.set_prop(
            root,
            Atom::NetCurrentDesktop.as_ref(),
            Prop::Cardinal(vec![self.model.sel_ws as u32]),
        )?;

        let mut viewports = Vec::with_capacity(2 * self.model.workspaces.len());
        let mut workareas = Vec::with_capacity(4 * self.model.workspaces.len());
        for ws in self.model.workspaces.iter() {
            let m = &self.model.monitors[ws.mon];
            viewports.extend([m.r.x as u32, m.r.y as u32]);
            workareas.extend([
                m.wr.x as u32,
                m.wr.y as u32,
                m.wr.w as u32,
                m.wr.h as u32,
            ]);
        }
        self.x
            .set_prop(root, Atom::NetDesktopViewport.as_ref(), Prop::Cardinal(viewports))?;
        self.x
            .set_prop(root, Atom::NetWorkarea.as_ref(), Prop::Cardinal(workareas))?;
        self.set_net_ws_names()?;

        Ok(())
    }

    /// Rewrite `_NET_DESKTOP_NAMES`.
    pub(crate) fn set_net_ws_names(&mut self) -> Result<()> {
        let names = self
            .model
            .workspaces
            .iter()
            .map(|ws| ws.name.clone())
            .collect();
        self.x.set_prop(
            self.x.root(),
            Atom::NetDesktopNames.as_ref(),
            Prop::UTF8String(names),
        )
    }

    // ----- misc ------------------------------------------------------------

    /// Politely ask a client to close, falling back to a forced kill when it
    /// does not speak WM_DELETE_WINDOW.
    pub fn kill_client(&mut self, id: Xid) {
        match self.x.send_wm_protocol(id, Atom::WmDeleteWindow) {
            Ok(true) => (),
            _ => {
                if let Err(e) = self.x.kill(id) {
                    warn!(%id, %e, "unable to kill client");
                }
            }
        }
        let _ = self.x.drain_enter_notify();
    }

    /// Run a named lifecycle callback for a client. `closed` marks the
    /// closing phase; the opening phase runs right after the rule applied.
    pub fn run_callback(&mut self, name: &str, id: Xid, closed: bool) {
        match name {
            // Pin album-art style popups to the right edge and pad the
            // workspace so tiling leaves them visible.
            "albumart" => {
                let ws = match self.model.client(id) {
                    Some(c) => c.ws,
                    None => return,
                };
                if closed {
                    self.model.ws_mut(ws).pad_r = 0;
                } else {
                    let (w, gap) = match self.model.client(id) {
                        Some(c) => (c.geom.w, self.model.ws(ws).gap),
                        None => return,
                    };
                    self.model.ws_mut(ws).pad_r = w + 2 * gap;
                    self.gravitate(id, Gravity::Right, Gravity::Center, true);
                    let next = self.model.ws(ws).stack.get(1).copied();
                    self.focus(next);
                }
                self.model.needs_refresh = true;
            }
            _ => warn!(%name, "unknown callback"),
        }
    }

    /// The monitor under the pointer, falling back to the selected one.
    pub(crate) fn mon_at_cursor(&self) -> usize {
        self.x
            .cursor_position()
            .ok()
            .and_then(|p| self.model.coord_to_mon(p))
            .unwrap_or_else(|| self.model.sel_mon())
    }

    /// Handle a root geometry change.
    pub(crate) fn root_resized(&mut self, r: Rect) {
        self.model.screen = r;
    }

    /// Warp the pointer to the middle of a client (or a point).
    pub(crate) fn warp_to(&mut self, id: Option<Xid>, fallback: Point) {
        let root = self.x.root();
        match id.and_then(|id| self.model.client(id)) {
            Some(c) => {
                let mid = c.geom.midpoint();
                let _ = self.x.warp_pointer(root, mid.x, mid.y);
            }
            None => {
                let _ = self.x.warp_pointer(root, fallback.x, fallback.y);
            }
        }
    }
}
