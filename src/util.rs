//! Utility functions for use in other parts of the window manager.
use crate::Result;
use std::process::{Command, Stdio};
use tracing::{info, warn};

/// Run an external command.
///
/// This redirects the process stdout and stderr to /dev/null.
pub fn spawn<S: Into<String>>(cmd: S) -> Result<()> {
    let s = cmd.into();
    let parts: Vec<&str> = s.split_whitespace().collect();
    if parts.is_empty() {
        return Ok(());
    }

    Command::new(parts[0])
        .args(&parts[1..])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(Into::into)
}

/// Execute the user config script, a shell script of `lathcmd` calls run
/// once at startup. Failure is logged and the window manager continues with
/// built-in defaults.
pub fn exec_config() {
    let path = match std::env::var("LATH_CONF") {
        Ok(p) if !p.is_empty() => p,
        _ => {
            let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
                format!("{}/.config", std::env::var("HOME").unwrap_or_default())
            });
            format!("{}/lath/lathrc", base)
        }
    };

    info!(%path, "running config script");
    match Command::new(&path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(_) => (),
        Err(e) => warn!(%path, %e, "unable to execute config script"),
    }
}
