mod command;
mod config;
mod loader;
mod matcher;
mod model;
mod modes;
mod session;
mod spawn;
mod ui;

use anyhow::{Result, ensure};
use clap::Parser;
use log::warn;

use crate::config::{Config, load_config};
use crate::modes::Mode;
use crate::modes::dmenu::DmenuMode;
use crate::modes::drun::DrunMode;
use crate::modes::run::RunMode;
use crate::modes::script::ScriptMode;
use crate::modes::windows::WindowsMode;
use crate::session::Session;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Modes to enable, in order: drun, run, windows, or name:command for a
    /// script mode
    #[arg(short, long, value_delimiter = ',')]
    modes: Vec<String>,

    /// Read candidates from stdin and print the selection to stdout
    #[arg(short, long)]
    dmenu: bool,
}

fn build_modes(args: &Args, config: &Config) -> Result<Vec<Box<dyn Mode>>> {
    // The pipe owns stdio in dmenu mode; mixing in other modes would fight
    // over it, so dmenu runs alone.
    if args.dmenu {
        return Ok(vec![Box::new(DmenuMode::new()?)]);
    }

    let selected = if args.modes.is_empty() {
        &config.general.modes
    } else {
        &args.modes
    };

    let mut modes: Vec<Box<dyn Mode>> = Vec::new();
    for token in selected {
        if let Some((name, command)) = token.split_once(':') {
            modes.push(Box::new(ScriptMode::new(name, command)));
            continue;
        }

        match token.as_str() {
            "drun" => modes.push(Box::new(DrunMode::new(config.general.terminal.clone()))),
            "run" => modes.push(Box::new(RunMode::new())),
            "windows" => match WindowsMode::new(&config.windows) {
                Ok(mode) => modes.push(Box::new(mode)),
                Err(err) => warn!("windows mode unavailable: {err:#}"),
            },
            other => warn!("unknown mode {other:?}"),
        }
    }

    ensure!(!modes.is_empty(), "no usable modes configured");
    Ok(modes)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = load_config()?;

    let modes = build_modes(&args, &config)?;
    let session = Session::new(modes);

    let code = ui::run(session)?;
    std::process::exit(code);
}
