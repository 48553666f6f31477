use std::env;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;

use anyhow::Result;
use log::{debug, info, warn};

use crate::command;
use crate::loader::Loader;
use crate::model::{Entry, PostExec};
use crate::modes::Mode;
use crate::spawn::spawn;

/// Binaries on $PATH. Matching is restricted to the first input token so
/// the user can type arguments after the binary name.
pub struct RunMode {
    loader: Option<Loader<Vec<String>>>,
    entries: Vec<Arc<Entry>>,
}

impl RunMode {
    pub fn new() -> Self {
        Self {
            loader: Some(Loader::spawn(scan_path)),
            entries: Vec::new(),
        }
    }

    fn ensure_loaded(&mut self) {
        if let Some(mut loader) = self.loader.take() {
            let binaries = loader.join().unwrap_or_default();
            self.entries = binaries
                .into_iter()
                .map(|name| Arc::new(Entry::new(name)))
                .collect();
        }
    }
}

fn scan_path() -> Vec<String> {
    let Ok(path_var) = env::var("PATH") else {
        return Vec::new();
    };

    let mut binaries = Vec::new();
    for dir in path_var.split(':').filter(|dir| !dir.is_empty()) {
        let Ok(read_dir) = fs::read_dir(dir) else {
            continue;
        };

        debug!("scanning binaries in {dir}");
        for entry in read_dir.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let Ok(metadata) = fs::metadata(&path) else {
                continue;
            };

            if metadata.permissions().mode() & 0o111 == 0 {
                continue;
            }

            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                binaries.push(name.to_string());
            }
        }
    }

    // The same binary can live in several PATH dirs; resolution is the
    // spawn's problem, not ours.
    binaries.sort();
    binaries.dedup();
    binaries.retain(|name| keep_binary(name));

    info!("run: found {} binaries", binaries.len());
    binaries
}

fn keep_binary(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('.') && !name.starts_with('[')
}

impl Mode for RunMode {
    fn name(&self) -> &str {
        "run"
    }

    fn entries(&mut self) -> Result<Vec<Arc<Entry>>> {
        self.ensure_loaded();
        Ok(self.entries.clone())
    }

    fn first_word_only(&self) -> bool {
        true
    }

    fn execute(&mut self, entry: &Entry, input: &str) -> PostExec {
        // The typed first token went through fuzzy matching, so the matched
        // binary name is the one to trust; the rest of the input is passed
        // along as arguments.
        let mut commandline = entry.display.clone();
        for arg in input.split_whitespace().skip(1) {
            commandline.push(' ');
            commandline.push_str(arg);
        }

        let Some(command) = command::parse(&commandline) else {
            warn!("nothing to execute for {:?}", entry.display);
            return PostExec::CloseFailure;
        };

        if spawn(&command) {
            PostExec::CloseSuccess
        } else {
            PostExec::CloseFailure
        }
    }
}
