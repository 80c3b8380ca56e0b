//! The window manager daemon.
use lath::{
    core::{socket, Wm},
    pure::model::Config,
    util,
    x::XConn,
    x11rb::RustConn,
};
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::os::unix::{io::AsRawFd, process::CommandExt};
use tracing::{info, warn};
use tracing_subscriber::{self, prelude::*, EnvFilter};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const USAGE: &str = "usage: lath [-hv] [-s SOCKET_FD]";

extern "C" fn on_signal(_: i32) {
    socket::request_shutdown();
}

fn install_signal_handlers() {
    let term = SigAction::new(
        SigHandler::Handler(on_signal),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    let ignore = SigAction::new(
        SigHandler::SigIgn,
        SaFlags::SA_NOCLDSTOP | SaFlags::SA_NOCLDWAIT | SaFlags::SA_RESTART,
        SigSet::empty(),
    );

    unsafe {
        for sig in [Signal::SIGTERM, Signal::SIGINT, Signal::SIGHUP] {
            if let Err(e) = sigaction(sig, &term) {
                warn!(%sig, %e, "unable to install signal handler");
            }
        }
        for sig in [Signal::SIGCHLD, Signal::SIGPIPE] {
            if let Err(e) = sigaction(sig, &ignore) {
                warn!(%sig, %e, "unable to install signal handler");
            }
        }
    }
}

fn main() -> lath::Result<()> {
    let mut adopt_fd = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-v" => {
                println!("lath {}", VERSION);
                return Ok(());
            }
            "-h" => {
                println!("{}", USAGE);
                return Ok(());
            }
            "-s" => match args.next().and_then(|v| v.parse::<i32>().ok()) {
                Some(fd) if fd > 0 => adopt_fd = Some(fd),
                _ => eprintln!("lath: -s requires an open socket file descriptor"),
            },
            _ => {
                eprintln!("{}", USAGE);
                std::process::exit(2);
            }
        }
    }

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    install_signal_handlers();

    let conn = RustConn::new()?;
    let mut wm = Wm::new(conn, Config::default())?;
    let (listener, sock_path) = socket::control_socket(adopt_fd)?;
    info!(%sock_path, "control socket ready");

    // The config script runs before the startup scan so rules are in place
    // when pre-existing windows are adopted.
    util::exec_config();
    wm.scan()?;

    let restored = wm.restore_state();
    if !restored && wm.model.connected_monitors().count() > 1 {
        if let Some(p) = wm.model.primary {
            let mid = wm.model.monitors[p].r.midpoint();
            let root = wm.x.root();
            let _ = wm.x.warp_pointer(root, mid.x, mid.y);
        }
    }

    wm.run(&listener)?;

    if wm.restart {
        info!("restarting");
        if let Err(e) = wm.save_state() {
            warn!(%e, "unable to save restart state");
        }
        let fd = listener.as_raw_fd();
        let _ = nix::fcntl::fcntl(
            fd,
            nix::fcntl::FcntlArg::F_SETFD(nix::fcntl::FdFlag::empty()),
        );
        let exe = std::env::current_exe()?;
        let err = std::process::Command::new(exe)
            .arg("-s")
            .arg(fd.to_string())
            .exec();
        warn!(%err, "unable to re-exec");
    } else if !sock_path.is_empty() {
        let _ = std::fs::remove_file(&sock_path);
    }

    Ok(())
}
