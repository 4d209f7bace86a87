use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::warn;

use crate::config;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::player::{Phase, PlayerController};
use crate::runtime::mpris_sync::update_mpris;
use crate::view;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Track-list cursor; independent of the loaded track so browsing never
    /// interrupts playback.
    pub selected: usize,
    /// Last-known loaded index as emitted to MPRIS.
    pub last_mpris_index: Option<usize>,
    /// Last-known phase as emitted to MPRIS.
    pub last_mpris_phase: Phase,
}

impl EventLoopState {
    pub fn new(controller: &PlayerController) -> Self {
        Self {
            selected: 0,
            last_mpris_index: None,
            last_mpris_phase: controller.transport().phase,
        }
    }
}

/// Main terminal loop: backend events, MPRIS sync, drawing and input.
/// Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    controller: &mut PlayerController,
    mpris: &MprisHandle,
    control_rx: &mpsc::Receiver<ControlCmd>,
) -> anyhow::Result<()> {
    let mut state = EventLoopState::new(controller);
    update_mpris(mpris, controller);

    loop {
        // Apply confirmations/auto-advance from the backend worker.
        controller.pump_events();

        // Keep MPRIS in sync even when changes come from media keys,
        // auto-advance or another client of the remote daemon.
        let transport = controller.transport();
        if transport.current != state.last_mpris_index
            || transport.phase != state.last_mpris_phase
        {
            state.last_mpris_index = transport.current;
            state.last_mpris_phase = transport.phase;
            update_mpris(mpris, controller);
        }

        let projected = view::project(
            controller.catalog(),
            controller.transport(),
            controller.progress(),
        );
        terminal.draw(|f| view::draw(f, &projected, state.selected, &settings.ui))?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, controller, &state) {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, controller, &mut state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Apply one MPRIS command. Returns `true` to quit.
fn handle_control_cmd(
    cmd: ControlCmd,
    controller: &mut PlayerController,
    state: &EventLoopState,
) -> bool {
    match cmd {
        ControlCmd::Quit => return true,
        ControlCmd::Play => match controller.transport().phase {
            Phase::Paused => controller.toggle_play(),
            Phase::Idle => select_cursor_track(controller, state.selected),
            Phase::Playing | Phase::Loading => {}
        },
        ControlCmd::Pause => {
            if controller.transport().is_playing() {
                controller.toggle_play();
            }
        }
        ControlCmd::PlayPause => {
            if controller.transport().phase == Phase::Idle {
                select_cursor_track(controller, state.selected);
            } else {
                controller.toggle_play();
            }
        }
        ControlCmd::Stop => controller.close(),
        ControlCmd::Next => controller.next(),
        ControlCmd::Prev => controller.previous(),
    }
    false
}

/// Apply one keypress. Returns `true` to quit.
fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    controller: &mut PlayerController,
    state: &mut EventLoopState,
) -> bool {
    let len = controller.catalog().len();
    let volume_step = settings.player.volume_step as i64;
    let scrub_step = settings.player.scrub_step_percent as f64 / 100.0;

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('j') | KeyCode::Down => {
            if len > 0 && state.selected + 1 < len {
                state.selected += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.selected = state.selected.saturating_sub(1);
        }
        KeyCode::Enter => {
            // Enter commits an in-progress scrub; otherwise it plays the
            // track under the cursor.
            if controller.transport().scrubbing {
                let fraction = controller.transport().scrub_fraction;
                controller.seek_commit(fraction);
            } else if len > 0 {
                select_cursor_track(controller, state.selected);
            }
        }
        KeyCode::Char(' ') | KeyCode::Char('p') => controller.toggle_play(),
        KeyCode::Char('h') => controller.previous(),
        KeyCode::Char('l') => controller.next(),
        KeyCode::Left => {
            controller.seek_start();
            let fraction = controller.transport().scrub_fraction - scrub_step;
            controller.seek_drag(fraction);
        }
        KeyCode::Right => {
            controller.seek_start();
            let fraction = controller.transport().scrub_fraction + scrub_step;
            controller.seek_drag(fraction);
        }
        KeyCode::Esc => controller.seek_cancel(),
        KeyCode::Char('+') | KeyCode::Char('=') => controller.adjust_volume(volume_step),
        KeyCode::Char('-') => controller.adjust_volume(-volume_step),
        KeyCode::Char('x') => controller.close(),
        _ => {}
    }
    false
}

fn select_cursor_track(controller: &mut PlayerController, index: usize) {
    if let Err(e) = controller.select_track(index) {
        warn!(error = %e, index, "could not start selected track");
    }
}
