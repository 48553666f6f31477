use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, Write};
use std::os::fd::{AsRawFd, RawFd};
use std::sync::Arc;

use anyhow::{Context, Result};
use log::debug;
use nix::libc::{STDIN_FILENO, STDOUT_FILENO};
use nix::unistd::{close, dup, dup2};

use crate::model::{Entry, PostExec};
use crate::modes::Mode;

/// Piped candidates from stdin, selection printed to stdout.
///
/// Stdin and stdout belong to the surrounding pipeline, so both are saved
/// at construction and the controlling terminal is re-routed onto them for
/// the UI's benefit. The saved stdout is restored right before writing the
/// selected line, and the saved handles are restored from `Drop` when the
/// user aborts instead, so the redirect never leaks into the parent shell.
pub struct DmenuMode {
    entries: Vec<Arc<Entry>>,
    saved_stdout: Option<RawFd>,
    saved_stdin: Option<RawFd>,
}

impl DmenuMode {
    pub fn new() -> Result<Self> {
        // Drain the pipe before touching any fds.
        let entries = io::stdin()
            .lock()
            .lines()
            .map_while(Result::ok)
            .map(|line| Arc::new(Entry::new(line)))
            .collect();

        let saved_stdout = dup(STDOUT_FILENO).context("saving stdout")?;
        let saved_stdin = dup(STDIN_FILENO).context("saving stdin")?;

        let tty_in = File::open("/dev/tty").context("opening /dev/tty for reading")?;
        let tty_out = OpenOptions::new()
            .write(true)
            .open("/dev/tty")
            .context("opening /dev/tty for writing")?;

        dup2(tty_in.as_raw_fd(), STDIN_FILENO).context("redirecting tty onto stdin")?;
        dup2(tty_out.as_raw_fd(), STDOUT_FILENO).context("redirecting tty onto stdout")?;

        Ok(Self {
            entries,
            saved_stdout: Some(saved_stdout),
            saved_stdin: Some(saved_stdin),
        })
    }

    fn restore_stdout(&mut self) {
        if let Some(fd) = self.saved_stdout.take() {
            let _ = io::stdout().flush();
            let _ = dup2(fd, STDOUT_FILENO);
            let _ = close(fd);
        }
    }

    fn restore_stdin(&mut self) {
        if let Some(fd) = self.saved_stdin.take() {
            let _ = dup2(fd, STDIN_FILENO);
            let _ = close(fd);
        }
    }
}

impl Mode for DmenuMode {
    fn name(&self) -> &str {
        "dmenu"
    }

    fn entries(&mut self) -> Result<Vec<Arc<Entry>>> {
        Ok(self.entries.clone())
    }

    fn execute(&mut self, entry: &Entry, _input: &str) -> PostExec {
        // Hand stdout back to the pipeline so the consumer sees exactly the
        // selected line.
        self.restore_stdout();
        println!("{}", entry.display);
        let _ = io::stdout().flush();

        // UI teardown still writes escape sequences on its way out; close
        // stdout so none of that reaches the pipe.
        let _ = close(STDOUT_FILENO);
        self.restore_stdin();

        debug!("dmenu selection written");
        PostExec::CloseSuccess
    }
}

impl Drop for DmenuMode {
    fn drop(&mut self) {
        self.restore_stdout();
        self.restore_stdin();
    }
}
