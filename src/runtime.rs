//! Application runtime: terminal setup/teardown and the main event loop
//! wiring input, the player controller, the view and MPRIS together.

use std::{env, path::Path, sync::mpsc};

use anyhow::Context;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::catalog;
use crate::mpris::ControlCmd;
use crate::player::{PlayerController, backend_for};

mod event_loop;
mod mpris_sync;
mod settings;

pub fn run() -> anyhow::Result<()> {
    let settings = settings::load_settings();

    let manifest = env::args()
        .nth(1)
        .unwrap_or_else(|| "playlist.toml".to_string());
    let catalog = catalog::load(Path::new(&manifest))
        .with_context(|| format!("loading playlist manifest {manifest}"))?;
    info!(
        manifest,
        tracks = catalog.len(),
        kind = ?catalog.backend_kind(),
        "catalog loaded"
    );

    let backend = backend_for(&catalog, &settings);
    let mut controller = PlayerController::new(catalog, backend, settings.player.volume);

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &settings, &mut controller, &mpris, &control_rx);

    controller.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
