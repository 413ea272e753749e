#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::unnecessary_wraps, clippy::cast_precision_loss)]
//! Headless desk driver.
//!
//! Loads a layout, plays a scripted drag and drop at render rate with the
//! ambient stepper running underneath, and optionally hot-reloads the layout
//! and writes debounced snapshots.
//!
//! ```bash
//! desk_runtime --frames 600
//! RUST_LOG=desk_physics=debug desk_runtime --layout desk.json --save out.json
//! desk_runtime --layout desk.json --watch
//! ```

mod app;
mod watcher;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use desk_layout::DeskLayout;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "desk_runtime", version, about = "Headless desk physics driver", long_about = None)]
struct Cli {
    /// Layout file; a small demo desk is used when omitted
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Number of frames to run
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Frame length in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Write debounced snapshots of the desk here
    #[arg(long)]
    save: Option<PathBuf>,

    /// Reload the layout file whenever it changes
    #[arg(long, requires = "layout")]
    watch: bool,
}

impl Cli {
    /// Saving into the watched file would reload the desk after every save.
    fn check(&self) -> Result<()> {
        if let (true, Some(layout), Some(save)) = (self.watch, &self.layout, &self.save) {
            if same_file(layout, save) {
                bail!(
                    "--save must not point at the watched layout {}",
                    layout.display()
                );
            }
        }
        Ok(())
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.check()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let layout = match &cli.layout {
        Some(path) => DeskLayout::from_path(path)?,
        None => {
            tracing::info!("no layout given, using the demo desk");
            DeskLayout::demo()
        }
    };

    let layout_watcher = match (&cli.layout, cli.watch) {
        (Some(path), true) => match watcher::LayoutWatcher::start(path) {
            Ok(watcher_instance) => Some(watcher_instance),
            Err(e) => {
                tracing::error!("Failed to start layout watcher: {e:?}");
                None
            }
        },
        _ => None,
    };

    let config = app::SessionConfig {
        frames: cli.frames,
        frame: Duration::from_millis(cli.frame_ms.max(1)),
        realtime: layout_watcher.is_some(),
    };
    let mut session = app::Session::new(layout, cli.save)?;
    app::run(&mut session, &config, || {
        layout_watcher.as_ref().and_then(watcher::LayoutWatcher::poll)
    })?;

    let world = session.world();
    for (id, obj) in world.iter() {
        tracing::info!(
            %id,
            kind = %obj.kind,
            x = obj.position.x,
            y = obj.position.y,
            z = obj.position.z,
            fallen = obj.flags.fallen,
            "final placement"
        );
    }
    Ok(())
}
