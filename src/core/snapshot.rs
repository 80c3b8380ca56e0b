//! Restart persistence: client geometry snapshots written before re-exec
//! and replayed after the startup scan.
//!
//! The format is machine-local and carries no compatibility promise: one
//! header line with the focused window, then one line per client.
use crate::{
    core::Wm,
    pure::{client::ClientState, geometry::Rect},
    x::XConn,
    Result, Xid,
};
use std::{
    fs,
    io::Write,
};
use tracing::{debug, warn};

const STATE_PATH: &str = "/tmp/lath_state";

impl<X: XConn> Wm<X> {
    /// Write the restart snapshot: the focused window plus the geometry and
    /// float state of every client.
    pub fn save_state(&self) -> Result<()> {
        let mut out = String::new();
        let focused = self.model.cur_client().map(|id| *id).unwrap_or(0);
        out.push_str(&format!("focused {}\n", focused));

        let all = self
            .model
            .workspaces
            .iter()
            .chain([&self.model.scratch])
            .flat_map(|ws| ws.clients.iter());
        for id in all {
            if let Some(c) = self.model.client(*id) {
                out.push_str(&format!(
                    "client {} {} {} {} {} {} {}\n",
                    *c.win,
                    c.geom.x,
                    c.geom.y,
                    c.geom.w,
                    c.geom.h,
                    c.bw,
                    u8::from(c.state.contains(ClientState::FLOATING)),
                ));
            }
        }

        let mut f = fs::File::create(STATE_PATH)?;
        f.write_all(out.as_bytes())?;
        debug!(path = STATE_PATH, "saved restart state");

        Ok(())
    }

    /// Restore the snapshot after a restart scan: floating geometry for
    /// clients still present, focus for the previously focused window.
    /// Returns false when there was no snapshot to restore.
    pub fn restore_state(&mut self) -> bool {
        let data = match fs::read_to_string(STATE_PATH) {
            Ok(d) => d,
            Err(_) => return false,
        };
        let _ = fs::remove_file(STATE_PATH);

        let mut focused = None;
        for line in data.lines() {
            let mut parts = line.split_whitespace();
            match parts.next() {
                Some("focused") => {
                    focused = parts.next().and_then(|v| v.parse::<u32>().ok()).map(Xid::from);
                }
                Some("client") => {
                    let vals: Vec<i64> =
                        parts.filter_map(|v| v.parse().ok()).collect();
                    if vals.len() != 7 {
                        warn!(%line, "malformed state line");
                        continue;
                    }
                    let id = Xid::from(vals[0] as u32);
                    if vals[6] == 0 || !self.model.clients.contains_key(&id) {
                        continue;
                    }

                    let r = Rect::new(
                        vals[1] as i32,
                        vals[2] as i32,
                        vals[3] as i32,
                        vals[4] as i32,
                    );
                    let bw = vals[5] as i32;
                    let visible = self
                        .model
                        .client(id)
                        .map(|c| self.model.visible(c))
                        .unwrap_or(false);

                    if let Some(c) = self.model.client_mut(id) {
                        c.state |= ClientState::FLOATING;
                    }
                    if visible {
                        self.resize_hint(id, r, bw, false, false);
                        self.model.needs_refresh = true;
                    } else if let Some(c) = self.model.client_mut(id) {
                        c.geom = r;
                        c.set_border_width(bw);
                    }
                }
                _ => (),
            }
        }

        if let Some(id) = focused {
            let visible = self
                .model
                .client(id)
                .map(|c| self.model.visible(c))
                .unwrap_or(false);
            if visible {
                self.focus(Some(id));
            }
        }

        true
    }
}
