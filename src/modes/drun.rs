use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use directories::BaseDirs;
use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::command;
use crate::loader::Loader;
use crate::model::{Entry, PostExec};
use crate::modes::Mode;
use crate::spawn::spawn;

/// One parsed desktop application, paired with the entry handed out to the
/// session.
struct App {
    entry: Arc<Entry>,
    exec: String,
    terminal: bool,
}

/// Installed applications from XDG desktop files.
///
/// Enumeration is expensive, so it runs on a background loader started at
/// construction; the first entries() call blocks until it resolves.
pub struct DrunMode {
    loader: Option<Loader<Vec<App>>>,
    apps: Vec<App>,
    terminal_cmd: Option<String>,
}

impl DrunMode {
    pub fn new(terminal_cmd: Option<String>) -> Self {
        Self {
            loader: Some(Loader::spawn(load_applications)),
            apps: Vec::new(),
            terminal_cmd,
        }
    }

    fn ensure_loaded(&mut self) {
        if let Some(mut loader) = self.loader.take() {
            self.apps = loader.join().unwrap_or_default();
        }
    }
}

fn application_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(base_dirs) = BaseDirs::new() {
        dirs.push(base_dirs.data_dir().join("applications"));
    }
    dirs.push(Path::new("/usr/share/applications").to_path_buf());
    dirs.push(Path::new("/usr/local/share/applications").to_path_buf());
    dirs
}

fn load_applications() -> Vec<App> {
    let mut apps = Vec::new();
    for dir in application_dirs() {
        if !dir.exists() {
            continue;
        }

        debug!("scanning desktop files in {dir:?}");
        for file in WalkDir::new(dir).into_iter().flatten() {
            if !file.file_type().is_file()
                || file.path().extension().and_then(|ext| ext.to_str()) != Some("desktop")
            {
                continue;
            }

            let Ok(content) = fs::read_to_string(file.path()) else {
                continue;
            };

            if let Some(desktop) = parse_desktop_file(&content) {
                apps.push(desktop.into_app());
            }
        }
    }

    info!("drun: found {} applications", apps.len());
    apps
}

struct DesktopFile {
    name: String,
    exec: String,
    comment: Option<String>,
    terminal: bool,
}

impl DesktopFile {
    fn into_app(self) -> App {
        let display = match &self.comment {
            Some(comment) => format!("{}: {}", self.name, comment),
            None => self.name.clone(),
        };

        // Match on the bare name and the executable, not the decorated
        // display text.
        let mut criteria = vec![self.name];
        if let Some(bin) = self
            .exec
            .split_whitespace()
            .next()
            .and_then(|bin| Path::new(bin).file_name())
            .and_then(|bin| bin.to_str())
        {
            criteria.push(bin.to_string());
        }

        App {
            entry: Arc::new(Entry::with_criteria(display, criteria)),
            exec: self.exec,
            terminal: self.terminal,
        }
    }
}

fn parse_desktop_file(content: &str) -> Option<DesktopFile> {
    let mut name = None;
    let mut exec = None;
    let mut comment = None;
    let mut terminal = false;
    let mut hidden = false;
    let mut in_desktop_entry = false;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            in_desktop_entry = line == "[Desktop Entry]";
            continue;
        }

        if !in_desktop_entry {
            continue;
        }

        if let Some(value) = line.strip_prefix("Name=") {
            name = Some(value.to_string());
        } else if let Some(value) = line.strip_prefix("Exec=") {
            // Field codes like %u/%f are for launchers that pass files; we
            // never do.
            let cleaned: Vec<&str> = value
                .split_whitespace()
                .filter(|token| !token.starts_with('%'))
                .collect();
            exec = Some(cleaned.join(" "));
        } else if let Some(value) = line.strip_prefix("Comment=") {
            if !value.is_empty() {
                comment = Some(value.to_string());
            }
        } else if let Some(value) = line.strip_prefix("Terminal=") {
            terminal = value == "true";
        } else if let Some(value) = line.strip_prefix("NoDisplay=") {
            hidden |= value == "true";
        } else if let Some(value) = line.strip_prefix("Hidden=") {
            hidden |= value == "true";
        }
    }

    if hidden {
        return None;
    }

    match (name, exec) {
        (Some(name), Some(exec)) if !exec.is_empty() => Some(DesktopFile {
            name,
            exec,
            comment,
            terminal,
        }),
        _ => None,
    }
}

impl Mode for DrunMode {
    fn name(&self) -> &str {
        "drun"
    }

    fn entries(&mut self) -> Result<Vec<Arc<Entry>>> {
        self.ensure_loaded();
        Ok(self.apps.iter().map(|app| app.entry.clone()).collect())
    }

    fn execute(&mut self, entry: &Entry, _input: &str) -> PostExec {
        let Some(app) = self
            .apps
            .iter()
            .find(|app| std::ptr::eq(app.entry.as_ref(), entry))
        else {
            warn!("selected application is not in the loaded set");
            return PostExec::CloseFailure;
        };

        let commandline = match (&self.terminal_cmd, app.terminal) {
            (Some(terminal), true) => format!("{terminal} {}", app.exec),
            _ => app.exec.clone(),
        };

        let Some(command) = command::parse(&commandline) else {
            return PostExec::CloseFailure;
        };

        if spawn(&command) {
            PostExec::CloseSuccess
        } else {
            PostExec::CloseFailure
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIREFOX: &str = "\
[Desktop Entry]
Type=Application
Name=Firefox
Comment=Browse the web
Exec=/usr/lib/firefox/firefox %u
Terminal=false
";

    #[test]
    fn test_parse_builds_decorated_display_and_criteria() {
        let app = parse_desktop_file(FIREFOX).unwrap().into_app();
        assert_eq!(app.entry.display, "Firefox: Browse the web");
        assert_eq!(
            app.entry.criteria,
            Some(vec!["Firefox".to_string(), "firefox".to_string()])
        );
        assert!(!app.terminal);
    }

    #[test]
    fn test_parse_strips_field_codes() {
        let desktop = parse_desktop_file(FIREFOX).unwrap();
        assert_eq!(desktop.exec, "/usr/lib/firefox/firefox");
    }

    #[test]
    fn test_parse_skips_hidden_entries() {
        let content = "[Desktop Entry]\nName=Ghost\nExec=ghost\nNoDisplay=true\n";
        assert!(parse_desktop_file(content).is_none());

        let content = "[Desktop Entry]\nName=Ghost\nExec=ghost\nHidden=true\n";
        assert!(parse_desktop_file(content).is_none());
    }

    #[test]
    fn test_parse_ignores_other_sections() {
        let content = "\
[Desktop Entry]
Name=App
Exec=app
[Desktop Action new-window]
Name=New Window
Exec=app --new-window %f
";
        let desktop = parse_desktop_file(content).unwrap();
        assert_eq!(desktop.name, "App");
        assert_eq!(desktop.exec, "app");
    }

    #[test]
    fn test_parse_requires_name_and_exec() {
        assert!(parse_desktop_file("[Desktop Entry]\nName=Only\n").is_none());
        assert!(parse_desktop_file("[Desktop Entry]\nExec=only\n").is_none());
        assert!(parse_desktop_file("[Desktop Entry]\nName=X\nExec=%u\n").is_none());
    }

    #[test]
    fn test_display_without_comment_is_the_name() {
        let content = "[Desktop Entry]\nName=Plain\nExec=plain\n";
        let app = parse_desktop_file(content).unwrap().into_app();
        assert_eq!(app.entry.display, "Plain");
    }

    #[test]
    fn test_terminal_flag_is_parsed() {
        let content = "[Desktop Entry]\nName=Top\nExec=htop\nTerminal=true\n";
        assert!(parse_desktop_file(content).unwrap().terminal);
    }
}
