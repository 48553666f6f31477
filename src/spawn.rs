use std::ffi::CString;

use log::warn;
use nix::libc;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, execvp, fork, setsid};

use crate::command::Command;

/// Start `command` detached from this process tree.
///
/// The sequence is a two-stage detach: fork a first child, which starts a
/// new session and forks a grandchild, which execs the command. The first
/// child exits as soon as the second fork happened, so the grandchild is
/// re-parented away from us and survives our exit. Only the first child is
/// waited on and reaped.
///
/// Best effort: the return value reflects whether the detach sequence
/// succeeded, not whether the exec did. The grandchild outlives us by
/// design, so an exec failure has no channel back to the caller.
pub fn spawn(command: &Command) -> bool {
    let Ok(path) = CString::new(command.path.as_str()) else {
        return false;
    };

    let argv: Vec<CString> = match command
        .argv
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect()
    {
        Ok(argv) => argv,
        Err(_) => return false,
    };

    match unsafe { fork() } {
        Ok(ForkResult::Child) => {
            // Detach from the controlling terminal before the second fork.
            if setsid().is_err() {
                unsafe { libc::_exit(1) };
            }

            match unsafe { fork() } {
                Ok(ForkResult::Child) => {
                    // The command must be argv[0], certain programs won't
                    // run correctly otherwise.
                    let _ = execvp(&path, &argv);
                    unsafe { libc::_exit(127) };
                }
                Ok(ForkResult::Parent { .. }) => unsafe { libc::_exit(0) },
                Err(_) => unsafe { libc::_exit(1) },
            }
        }
        Ok(ForkResult::Parent { child }) => {
            // Reap the first child; its exit status is all we ever learn.
            matches!(waitpid(child, None), Ok(WaitStatus::Exited(_, 0)))
        }
        Err(err) => {
            warn!("fork failed: {err}");
            false
        }
    }
}
