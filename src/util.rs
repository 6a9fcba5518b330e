//! Utility functions for use in other parts of tagwm
use crate::Result;
use nix::unistd::setsid;
use std::{
    os::unix::process::CommandExt,
    process::{Command, Stdio},
};
use tracing::{info, warn};

/// Run an external command in its own session, detached from the window manager.
///
/// The command is split on whitespace and its stdio is redirected to /dev/null. The
/// child is not waited on: with `SIGCHLD` ignored it is reaped by the kernel.
pub fn spawn<S: Into<String>>(cmd: S) -> Result<()> {
    let cmd = cmd.into();
    let parts: Vec<&str> = cmd.split_whitespace().collect();
    let (program, args) = match parts.split_first() {
        Some((program, args)) => (*program, args),
        None => {
            warn!("attempt to spawn an empty command");
            return Ok(());
        }
    };

    spawn_with_args(program, args)
}

/// Run an external command with the specified command line arguments
///
/// This behaves like [spawn] without splitting the program name.
pub fn spawn_with_args<S: Into<String>>(cmd: S, args: &[&str]) -> Result<()> {
    let cmd = cmd.into();
    info!(?cmd, ?args, "spawning subprocess");

    let mut command = Command::new(&cmd);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    // SAFETY: setsid is async-signal-safe and touches no state shared with the parent
    unsafe {
        command.pre_exec(|| setsid().map(|_| ()).map_err(std::io::Error::from));
    }

    command.spawn()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_commands_are_ignored() {
        assert!(spawn("   ").is_ok());
    }

    #[test]
    fn missing_programs_are_an_error() {
        assert!(spawn("definitely-not-a-real-program-for-tagwm").is_err());
    }
}
