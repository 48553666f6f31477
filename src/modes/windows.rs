use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, warn};
use swayipc::{Connection, Node, NodeType};

use crate::config::WindowsConfig;
use crate::model::{Entry, PostExec};
use crate::modes::Mode;

/// One open window, paired with the entry handed out to the session.
struct Window {
    entry: Arc<Entry>,
    con_id: i64,
    workspace: Option<String>,
}

/// Open windows via i3/sway IPC.
///
/// The tree is re-queried on every entries() call since windows come and go
/// behind our back; there is no cache to invalidate.
pub struct WindowsMode {
    conn: Connection,
    self_id: String,
    ignore: Vec<String>,
    windows: Vec<Window>,
}

impl WindowsMode {
    pub fn new(config: &WindowsConfig) -> Result<Self> {
        let conn = Connection::new().context("connecting to the window manager socket")?;
        Ok(Self {
            conn,
            self_id: config.self_id.clone(),
            ignore: config.ignore.clone(),
            windows: Vec::new(),
        })
    }

    fn run(&mut self, command: &str) -> Result<()> {
        for outcome in self
            .conn
            .run_command(command)
            .with_context(|| format!("sending {command:?}"))?
        {
            outcome.with_context(|| format!("command {command:?} rejected"))?;
        }

        Ok(())
    }
}

/// The window-matching criterion differs between i3 and sway.
fn instance_key() -> &'static str {
    let sway = env::var("SWAYSOCK").is_ok()
        || env::var("I3SOCK").is_ok_and(|sock| sock.contains("sway"));
    if sway { "app_id" } else { "instance" }
}

fn window_class(node: &Node) -> Option<String> {
    node.app_id.clone().or_else(|| {
        node.window_properties
            .as_ref()
            .and_then(|props| props.instance.clone())
    })
}

fn collect_windows(
    node: &Node,
    workspace: Option<&str>,
    self_id: &str,
    ignore: &[String],
    windows: &mut Vec<Window>,
) {
    let workspace_name = match &node.node_type {
        NodeType::Workspace => node.name.as_deref(),
        _ => workspace,
    };

    let is_leaf = node.nodes.is_empty() && node.floating_nodes.is_empty();
    if is_leaf && matches!(&node.node_type, NodeType::Con | NodeType::FloatingCon) {
        if let Some(name) = &node.name {
            let class = window_class(node).unwrap_or_default();
            if class != self_id && !ignore.iter().any(|ignored| *ignored == class) {
                windows.push(Window {
                    entry: Arc::new(Entry::new(name.clone())),
                    con_id: node.id,
                    workspace: workspace_name.map(str::to_string),
                });
            }
        }
    }

    for child in node.nodes.iter().chain(node.floating_nodes.iter()) {
        collect_windows(child, workspace_name, self_id, ignore, windows);
    }
}

impl Mode for WindowsMode {
    fn name(&self) -> &str {
        "windows"
    }

    fn entries(&mut self) -> Result<Vec<Arc<Entry>>> {
        let tree = self.conn.get_tree().context("querying the window tree")?;

        let mut windows = Vec::new();
        collect_windows(&tree, None, &self.self_id, &self.ignore, &mut windows);
        self.windows = windows;

        Ok(self.windows.iter().map(|win| win.entry.clone()).collect())
    }

    /// Follow the highlighted window: switch to its workspace and bring
    /// ourselves along. Everything here is advisory, failures are dropped.
    fn preview(&mut self, entry: &Entry) {
        let Some(workspace) = self
            .windows
            .iter()
            .find(|win| std::ptr::eq(win.entry.as_ref(), entry))
            .and_then(|win| win.workspace.clone())
        else {
            return;
        };

        let key = instance_key();
        let self_id = self.self_id.clone();
        for command in [
            format!("workspace number {workspace}"),
            format!("[{key}=\"{self_id}\"] move to workspace {workspace}"),
            format!("[{key}=\"{self_id}\"] focus"),
        ] {
            if let Err(err) = self.run(&command) {
                debug!("preview command failed: {err:#}");
            }
        }
    }

    fn execute(&mut self, entry: &Entry, _input: &str) -> PostExec {
        let Some(con_id) = self
            .windows
            .iter()
            .find(|win| std::ptr::eq(win.entry.as_ref(), entry))
            .map(|win| win.con_id)
        else {
            warn!("selected window is gone");
            return PostExec::CloseFailure;
        };

        match self.run(&format!("[con_id={con_id}] focus")) {
            Ok(()) => PostExec::CloseSuccess,
            Err(err) => {
                warn!("focus failed: {err:#}");
                PostExec::CloseFailure
            }
        }
    }
}
