use std::process::{Command as ProcessCommand, Stdio};
use std::sync::Arc;

use anyhow::Result;
use log::{debug, warn};

use crate::loader::Loader;
use crate::model::{Entry, PostExec};
use crate::modes::Mode;

/// Candidates produced by an external command's stdout.
///
/// On execute the command is re-run with the selection appended; as long as
/// it keeps printing output the session stays open with the fresh lines as
/// the new candidate set.
pub struct ScriptMode {
    name: String,
    command: String,
    loader: Option<Loader<Vec<String>>>,
    entries: Vec<Arc<Entry>>,
}

impl ScriptMode {
    pub fn new(name: &str, command: &str) -> Self {
        let initial = command.to_string();
        Self {
            name: name.to_string(),
            command: command.to_string(),
            loader: Some(Loader::spawn(move || run_lines(&initial))),
            entries: Vec::new(),
        }
    }

    fn ensure_loaded(&mut self) {
        if let Some(mut loader) = self.loader.take() {
            self.set_lines(loader.join().unwrap_or_default());
        }
    }

    fn set_lines(&mut self, lines: Vec<String>) {
        self.entries = lines
            .into_iter()
            .map(|line| Arc::new(Entry::new(line)))
            .collect();
    }
}

/// Run `command` through the shell and collect its stdout lines.
fn run_lines(command: &str) -> Vec<String> {
    debug!("running script command: {command}");
    match ProcessCommand::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .output()
    {
        Ok(output) => String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        Err(err) => {
            warn!("script command {command:?} failed to run: {err}");
            Vec::new()
        }
    }
}

impl Mode for ScriptMode {
    fn name(&self) -> &str {
        &self.name
    }

    fn entries(&mut self) -> Result<Vec<Arc<Entry>>> {
        self.ensure_loaded();
        Ok(self.entries.clone())
    }

    fn execute(&mut self, entry: &Entry, _input: &str) -> PostExec {
        // Synchronous on purpose: the user just committed and is waiting on
        // the outcome anyway.
        let lines = run_lines(&format!("{} {}", self.command, entry.display));
        if lines.is_empty() {
            return PostExec::CloseSuccess;
        }

        // A pending initial load is stale now; the re-run owns the set.
        self.loader = None;
        self.set_lines(lines);
        PostExec::StayOpen
    }
}
