//! Entry point for the **dashgrd** daemon.
//!
//! Loads the configuration, runs the widget provider pipeline, restores the
//! saved layout, then spawns the command sources on background threads and
//! processes incoming commands on the main thread.
//!
//! ```text
//! dashgrd [--config <path>] [--ephemeral] [--print-layout]
//! ```

use clap::Parser;
use dashgrd::board::Board;
use dashgrd::command::Command;
use dashgrd::config::Config;
use dashgrd::headless::HeadlessSurface;
use dashgrd::ipc::listener::UnixSocketListener;
use dashgrd::persist::{JsonFileStore, LayoutStore, MemoryStore};
use dashgrd::provider::StaticProvider;
use dashgrd::traits::{BoardEvent, CommandSource, Surface};
use log::{debug, error, info};
use std::path::PathBuf;
use std::sync::mpsc;

/// Command-line options.
#[derive(Debug, Parser)]
#[command(name = "dashgrd")]
#[command(about = "Paged widget dashboard daemon", long_about = None)]
#[command(version)]
struct Options {
    /// Config file (default: `$XDG_CONFIG_HOME/dashgrd/config.json`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Keep the layout in memory instead of the layout file.
    #[arg(long)]
    ephemeral: bool,

    /// Print the layout as JSON after loading, then exit.
    #[arg(long)]
    print_layout: bool,
}

/// Default socket path for the command listener.
fn default_socket_path() -> String {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    format!("{}/dashgrd.sock", runtime)
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/dashgrd`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("dashgrd")
}

/// Load the config from `path` (or the default location), falling back to
/// compiled-in defaults.
fn load_config(path: Option<PathBuf>) -> Config {
    let path = path.unwrap_or_else(|| config_dir().join("config.json"));
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

//  Main

fn main() {
    env_logger::init();

    let opts = Options::parse();
    let config = load_config(opts.config.clone());

    if opts.ephemeral {
        info!("ephemeral mode, layout is not written to disk");
        run(MemoryStore::new(), config, &opts);
    } else {
        let path = config.layout.resolved_path();
        info!("layout file {}", path.display());
        run(JsonFileStore::new(path), config, &opts);
    }
}

fn run<L: LayoutStore>(store: L, mut config: Config, opts: &Options) {
    let surface = HeadlessSurface::new(config.viewport.width, config.viewport.height);
    let mut board = Board::new(surface, store);
    board.set_pipeline_config(config.pipeline.clone());
    board.set_autosave(config.layout.autosave);

    let (event_tx, event_rx) = mpsc::channel();
    board.set_events(event_tx);
    spawn_event_logger(event_rx);

    board.register_provider(StaticProvider::new(std::mem::take(&mut config.widgets)));
    board.load_widgets();
    info!(
        "{} widget(s) on {} page(s)",
        board.widgets().count(),
        board.pages().len()
    );

    if opts.print_layout {
        match serde_json::to_string_pretty(&board.layout()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("failed to serialize layout: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
    spawn_command_sources(cmd_tx);
    start_event_loop(board, cmd_rx);
}

//  Event loop

fn start_event_loop<S: Surface, L: LayoutStore>(
    mut board: Board<S, L>,
    cmd_rx: mpsc::Receiver<Command>,
) {
    info!("dashgrd running");
    for cmd in cmd_rx {
        if let Err(e) = board.handle(cmd) {
            error!("command error: {}", e);
        }
    }
    info!("all command sources closed, exiting");
}

//  Helpers

fn spawn_command_sources(tx: mpsc::Sender<Command>) {
    {
        let tx = tx.clone();
        let path = default_socket_path();
        std::thread::spawn(move || {
            let mut source = UnixSocketListener::new(&path);
            if let Err(e) = source.run(tx) {
                error!("socket listener error: {}", e);
            }
        });
    }

    drop(tx);
}

fn spawn_event_logger(rx: mpsc::Receiver<BoardEvent>) {
    std::thread::spawn(move || {
        for event in rx {
            debug!("event: {:?}", event);
        }
    });
}
