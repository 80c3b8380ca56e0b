//! Interactive move and resize, driven by a pointer grab and a nested
//! event pump.
use crate::{
    core::Wm,
    layout::LayoutKind,
    pure::{client::ClientState, geometry::{Point, Rect}},
    x::{ClientConfig, CursorKind, XConn, XConnExt, XEvent},
    Xid,
};
use std::time::{Duration, Instant};
use tracing::{trace, warn};

// Motion events are coalesced to at most this rate.
const MOTION_INTERVAL: Duration = Duration::from_millis(1000 / 60);

impl<X: XConn> Wm<X> {
    /// Grab the pointer and enter the interactive move/resize loop for a
    /// client. Terminates on button release only; unrelated events are
    /// dispatched normally from inside the loop.
    pub fn mouse_interact(&mut self, id: Xid, moving: bool, origin: Point) {
        let cursor = if moving { CursorKind::Move } else { CursorKind::Resize };
        if let Err(e) = self.x.grab_pointer(cursor) {
            warn!(%e, "unable to grab pointer");
            return;
        }

        if moving {
            self.mouse_move_loop(id, origin);
        } else {
            self.mouse_resize_loop(id, origin);
        }
    }

    // Pop a tiled client out to floating mid-drag, re-running the layout to
    // close the gap it left.
    fn detach_to_floating(&mut self, id: Xid) {
        let ws = match self.model.client(id) {
            Some(c) => c.ws,
            None => return,
        };
        if let Some(c) = self.model.client_mut(id) {
            c.state |= ClientState::FLOATING;
            c.old_state |= ClientState::FLOATING;
        }
        self.layout_workspace(ws);
        let _ = self.x.set_client_config(id, &[ClientConfig::StackAbove]);
    }

    fn mouse_move_loop(&mut self, id: Xid, origin: Point) {
        let (ox, oy) = match self.model.client(id) {
            Some(c) => (c.geom.x, c.geom.y),
            None => return,
        };
        let mut last = Instant::now() - MOTION_INTERVAL;

        while self.running {
            let ev = match self.x.next_event() {
                Ok(ev) => ev,
                Err(_) => break,
            };

            match ev {
                XEvent::Motion(e) => {
                    if last.elapsed() < MOTION_INTERVAL {
                        continue;
                    }
                    last = Instant::now();

                    let nx = ox + (e.abs.x - origin.x);
                    let ny = oy + (e.abs.y - origin.y);
                    let (floating, fake_full, geom, bw) = match self.model.client(id) {
                        Some(c) => (
                            self.model.floating(c),
                            c.state
                                .contains(ClientState::FULLSCREEN | ClientState::FAKEFULL),
                            c.geom,
                            c.bw,
                        ),
                        None => break,
                    };
                    if (nx, ny) == (geom.x, geom.y) {
                        continue;
                    }
                    if !floating || fake_full {
                        trace!(%id, "popping dragged client to floating");
                        self.detach_to_floating(id);
                    }

                    // Crossing into another monitor drags the client along
                    // to that monitor's visible workspace.
                    if let Some(m) = self.model.coord_to_mon(e.abs) {
                        let ws = self.model.monitors[m].ws;
                        if self.model.client(id).map(|c| c.ws) != Some(ws) {
                            self.set_client_workspace(id, ws, false);
                            self.change_workspace(ws, false, false);
                            self.focus(Some(id));
                        }
                    }

                    let mut r = Rect::new(nx, ny, geom.w, geom.h);
                    if self.apply_size_hints(id, &mut r, bw, true, true) {
                        self.resize(id, r, bw);
                    }
                }
                XEvent::ButtonRelease(_) => {
                    let _ = self.x.ungrab_pointer();
                    break;
                }
                other => self.handle_event(other),
            }
        }
    }

    fn mouse_resize_loop(&mut self, id: Xid, origin: Point) {
        let ws = match self.model.client(id) {
            Some(c) => c.ws,
            None => return,
        };
        let (ox, ow, oh) = match self.model.client(id) {
            Some(c) => (c.geom.x, c.geom.w, c.geom.h),
            None => return,
        };
        let mut my = origin.y;
        let mut first = true;
        let mut last = Instant::now() - MOTION_INTERVAL;

        while self.running {
            let ev = match self.x.next_event() {
                Ok(ev) => ev,
                Err(_) => break,
            };

            match ev {
                XEvent::Motion(e) => {
                    if last.elapsed() < MOTION_INTERVAL {
                        continue;
                    }
                    last = Instant::now();

                    let layout = self.model.ws(ws).layout;
                    let floating = self
                        .model
                        .client(id)
                        .map(|c| c.state.contains(ClientState::FLOATING))
                        .unwrap_or(true);

                    if !floating && layout.supports_drag_resize() {
                        self.drag_tiled_resize(id, ws, e.abs, origin, ox, ow, &mut my, &mut first);
                    } else {
                        let nw = ow + (e.abs.x - origin.x);
                        let nh = oh + (e.abs.y - origin.y);
                        let (fl, fake_full, geom, bw) = match self.model.client(id) {
                            Some(c) => (
                                self.model.floating(c),
                                c.state
                                    .contains(ClientState::FULLSCREEN | ClientState::FAKEFULL),
                                c.geom,
                                c.bw,
                            ),
                            None => break,
                        };
                        if (nw, nh) == (geom.w, geom.h) {
                            continue;
                        }
                        if !fl || fake_full {
                            self.detach_to_floating(id);
                        }
                        let mut r = Rect::new(geom.x, geom.y, nw, nh);
                        if self.apply_size_hints(id, &mut r, bw, true, true) {
                            self.resize(id, r, bw);
                        }
                    }
                }
                XEvent::ButtonRelease(_) => {
                    let _ = self.x.ungrab_pointer();
                    let _ = self.x.drain_enter_notify();
                    break;
                }
                other => self.handle_event(other),
            }
        }
    }

    // Resizing a tiled client adjusts the column split it sits against and
    // its height offset within the column.
    #[allow(clippy::too_many_arguments)]
    fn drag_tiled_resize(
        &mut self,
        id: Xid,
        ws: usize,
        abs: Point,
        origin: Point,
        ox: i32,
        ow: i32,
        my: &mut i32,
        first: &mut bool,
    ) {
        let tiled = self.model.tiled(ws);
        let i = match tiled.iter().position(|&t| t == id) {
            Some(i) => i,
            None => return,
        };
        let (nmaster, nstack) = {
            let w = self.model.ws(ws);
            (w.nmaster, w.nstack)
        };
        let left = self.model.ws(ws).layout == LayoutKind::Tile;
        let m = self.model.monitors[self.model.ws(ws).mon].r;
        let dx = abs.x - origin.x;

        {
            let msplit = self.model.ws(ws).msplit;
            let w = self.model.ws_mut(ws);
            if nstack > 0 && i >= nstack + nmaster {
                let master_w = m.w as f32 * msplit;
                w.ssplit = if left {
                    ((ox - m.x + dx) as f32 - master_w) / (m.w as f32 - master_w)
                } else {
                    (ox - m.x + ow - dx) as f32 / (m.w as f32 - master_w)
                }
                .clamp(0.05, 0.95);
            } else if nmaster > 0 && i >= nmaster {
                w.msplit = if left {
                    (ox - m.x + dx) as f32 / m.w as f32
                } else {
                    (ox - m.x + ow - dx) as f32 / m.w as f32
                }
                .clamp(0.05, 0.95);
            } else {
                w.msplit = if left {
                    (ox - m.x + ow + dx) as f32 / m.w as f32
                } else {
                    (ox - m.x - dx) as f32 / m.w as f32
                }
                .clamp(0.05, 0.95);
            }
        }

        // The last client of a column grows upward; the rest grow downward.
        let column_end =
            i + 1 == nmaster || i + 1 == nmaster + nstack || i + 1 == tiled.len();
        let has_next = i + 1 < tiled.len();
        let at_column_head = i == nmaster || i == nmaster + nstack;

        if (i > 0 && !at_column_head) || (at_column_head && has_next) {
            let ohoff = self.model.client(id).map(|c| c.hoff).unwrap_or(0);
            let dy = abs.y - *my;
            let new_hoff = if *first {
                *first = false;
                if column_end {
                    *my += ohoff;
                    -dy + ohoff
                } else {
                    *my -= ohoff;
                    dy + ohoff
                }
            } else if column_end {
                -dy
            } else {
                dy
            };

            if let Some(c) = self.model.client_mut(id) {
                c.hoff = new_hoff;
            }
            if self.layout_workspace(ws) {
                if let Some(c) = self.model.client_mut(id) {
                    c.hoff = ohoff;
                }
                self.layout_workspace(ws);
            }
        } else {
            self.layout_workspace(ws);
        }
    }
}
