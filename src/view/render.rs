//! Terminal rendering of the projected view using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Gauge, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::config::UiSettings;

use super::model::PlayerView;

const CONTROLS: &str = "[j/k] move | [enter] play selected | [space/p] play/pause | [h/l] prev/next | [←/→] scrub (enter commits, esc cancels) | [+/-] volume | [x] close player | [q] quit";

/// Render one frame: header, track list, player bar (when visible), footer.
pub fn draw(frame: &mut Frame, view: &PlayerView, selected: usize, ui_settings: &UiSettings) {
    let bar_height = if view.bar.visible { 6 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(bar_height),
            Constraint::Length(3),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" encore ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Track list. Window the rows around the selection so long playlists
    // keep the cursor visible without allocating off-screen items.
    {
        let total = view.rows.len();
        let list_height = chunks[1].height.saturating_sub(2) as usize;
        let (start, end, selected_in_window) = if total <= list_height || list_height == 0 {
            (0, total, selected.min(total.saturating_sub(1)))
        } else {
            let half = list_height / 2;
            let mut start = selected.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, selected - start)
        };

        let items: Vec<ListItem> = view.rows[start..end]
            .iter()
            .map(|row| {
                let line = format!("{} {} — {}", row.glyph, row.artist, row.title);
                let item = ListItem::new(line);
                if row.active {
                    item.style(
                        Style::default()
                            .fg(Color::Green)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    item
                }
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(" tracks "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if total > 0 {
            state.select(Some(selected_in_window));
        }
        frame.render_stateful_widget(list, chunks[1], &mut state);
    }

    // Player bar
    if view.bar.visible {
        let bar = &view.bar;
        let inner = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)])
            .margin(1)
            .split(chunks[2]);

        let block = Block::default().borders(Borders::ALL).title(" now playing ");
        frame.render_widget(block, chunks[2]);

        let state_glyph = if bar.playing { "⏸" } else { "▶" };
        let mut line = format!("{state_glyph}  {} — {}", bar.artist, bar.title);
        if let Some(art) = &bar.artwork {
            line.push_str(&format!("   [{art}]"));
        }
        frame.render_widget(Paragraph::new(line), inner[0]);

        // Filled/unfilled split of the gauge is the gradient split.
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Green).bg(Color::DarkGray))
            .ratio((bar.percent / 100.0).clamp(0.0, 1.0))
            .label(format!("{} / {}", bar.elapsed, bar.total));
        frame.render_widget(gauge, inner[1]);

        let volume = Paragraph::new(format!("vol {:>3}%", bar.volume));
        frame.render_widget(volume, inner[2]);
    }

    // Footer
    let footer = Paragraph::new(CONTROLS)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}
