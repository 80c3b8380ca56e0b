//! The main loop: one thread multiplexing the X connection and the control
//! socket, plus status subscriber upkeep.
use crate::{
    cmd::{self, Outcome},
    core::Wm,
    status::{self, Subscriber},
    x::XConn,
    Error, Result,
};
use nix::{
    errno::Errno,
    sys::select::{select, FdSet},
};
use std::{
    io::{Read, Write},
    os::unix::{io::AsRawFd, net::UnixListener},
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};
use tracing::{debug, error, warn};

// One command per connection, so a single read covers it.
const CMD_BUF: usize = 4096;

// Set from the signal handler; the loop notices it on its next wakeup.
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Request a clean exit from async-signal context.
pub fn request_shutdown() {
    SHUTDOWN.store(true, Ordering::SeqCst);
}

impl<X: XConn> Wm<X> {
    /// Block in `select` over the X fd and the listening socket until
    /// shutdown or restart is requested. This is the only suspension point
    /// in the process apart from the nested mouse pump.
    pub fn run(&mut self, listener: &UnixListener) -> Result<()> {
        let xfd = self.x.connection_fd();
        let sfd = listener.as_raw_fd();

        if self.model.needs_refresh {
            self.refresh();
        }

        while self.running {
            self.x.flush();

            let mut fds = FdSet::new();
            fds.insert(sfd);
            fds.insert(xfd);
            match select(None, Some(&mut fds), None, None, None) {
                Ok(_) => (),
                Err(Errno::EINTR) => {
                    if SHUTDOWN.load(Ordering::SeqCst) {
                        self.running = false;
                    }
                    continue;
                }
                Err(e) => return Err(Error::Io(e.into())),
            }
            if SHUTDOWN.load(Ordering::SeqCst) {
                self.running = false;
            }

            if fds.contains(sfd) {
                self.handle_connection(listener);
            }
            if fds.contains(xfd) {
                self.x.flush();
                self.drain_x_events()?;
            }

            if self.model.needs_refresh {
                self.refresh();
            }
            self.flush_status();
        }

        Ok(())
    }

    /// Dispatch everything currently queued on the X connection.
    pub fn drain_x_events(&mut self) -> Result<()> {
        while let Some(ev) = self.x.poll_event()? {
            self.handle_event(ev);
        }

        Ok(())
    }

    fn handle_connection(&mut self, listener: &UnixListener) {
        let (mut stream, _) = match listener.accept() {
            Ok(s) => s,
            Err(e) => {
                warn!(%e, "unable to accept control connection");
                return;
            }
        };

        let _ = stream.set_read_timeout(Some(Duration::from_millis(250)));
        let mut buf = [0u8; CMD_BUF];
        let n = match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        let line = String::from_utf8_lossy(&buf[..n]);
        let line = line.trim_end_matches('\n');

        match cmd::execute(self, line) {
            Outcome::Reply(reply) => {
                if let Err(e) = stream.write_all(reply.as_bytes()) {
                    debug!(%e, "unable to write command reply");
                }
            }
            Outcome::Subscribe { ty, num } => {
                let snapshot = status::snapshot_for(self, ty);
                let mut sub = Subscriber { stream, ty, num };
                if sub.emit(&snapshot) {
                    // Ownership of the connection moves to the subscriber
                    // list; it is written to during refresh only.
                    self.subscribers.push(sub);
                }
            }
        }
    }

    /// Emit updated snapshots to every subscriber whose type matches a
    /// pending change flag, dropping the dead ones.
    pub fn flush_status(&mut self) {
        let (win, ws, layout) = (
            self.model.win_change,
            self.model.ws_change,
            self.model.layout_change,
        );
        if self.subscribers.is_empty() || !(win || ws || layout) {
            self.model.win_change = false;
            self.model.ws_change = false;
            self.model.layout_change = false;
            return;
        }

        let mut subs = std::mem::take(&mut self.subscribers);
        subs.retain_mut(|sub| {
            if !status::wants_update(sub.ty, win, ws, layout) {
                return true;
            }
            let snapshot = status::snapshot_for(self, sub.ty);
            sub.emit(&snapshot)
        });
        self.subscribers = subs;

        self.model.win_change = false;
        self.model.ws_change = false;
        self.model.layout_change = false;
    }
}

/// Bind (or adopt) the control socket and advertise its path.
///
/// An already-open fd is adopted after a restart; otherwise the path comes
/// from `LATHSOCK`, falling back to a display-qualified name under /tmp.
pub fn control_socket(adopt_fd: Option<i32>) -> Result<(UnixListener, String)> {
    use std::os::unix::io::FromRawFd;

    if let Some(fd) = adopt_fd {
        let listener = unsafe { UnixListener::from_raw_fd(fd) };
        let path = std::env::var("LATHSOCK").unwrap_or_default();
        return Ok((listener, path));
    }

    let path = match std::env::var("LATHSOCK") {
        Ok(p) if !p.is_empty() => p,
        _ => {
            let display = std::env::var("DISPLAY").unwrap_or_else(|_| ":0".to_string());
            let cleaned: String = display
                .chars()
                .map(|c| if c == ':' || c == '.' { '_' } else { c })
                .collect();
            format!("/tmp/lath{}.socket", cleaned)
        }
    };

    std::env::set_var("LATHSOCK", &path);
    let _ = std::fs::remove_file(&path);
    let listener = UnixListener::bind(&path).map_err(|e| {
        error!(%path, %e, "unable to bind control socket");
        Error::Io(e)
    })?;

    Ok((listener, path))
}
