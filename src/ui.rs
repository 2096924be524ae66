//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the deck using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::Marker,
    widgets::{
        Block, Borders, Clear, Gauge, List, ListItem, Padding, Paragraph, Wrap,
        canvas::{Canvas, Circle, Line as CanvasLine},
    },
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::{App, Deck};
use crate::config::UiSettings;
use crate::energy::Capability;
use crate::playlist::Track;

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("gg/G", "top/bottom");
    map.insert("enter", "load selected");
    map.insert("space/p", "play/pause");
    map.insert("l", "load next");
    map.insert("K", "metadata");
    map.insert("drop/paste", "add .wav");
    map.insert("q", "quit");
    map
});

/// Render the controls help text.
fn controls_text() -> String {
    let order = ["j/k", "gg/G", "enter", "space/p", "l", "K", "drop/paste", "q"];
    order
        .iter()
        .filter_map(|k| CONTROLS_MAP.get(k).map(|v| format!("[{}] {}", k, v)))
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format seconds as `M:SS`.
fn format_mss(secs: f32) -> String {
    let total = secs.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

fn bpm_text(track: &Track) -> String {
    match track.bpm {
        Some(b) => format!("{:.1} BPM", b),
        None => "-- BPM".to_string(),
    }
}

fn key_text(track: &Track) -> String {
    let key = track.key.as_deref().unwrap_or("--");
    match track.camelot {
        Some(c) => format!("{} ({})", key, c),
        None => key.to_string(),
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Point on the unit circle for a platter angle (0 deg = 12 o'clock, clockwise).
fn marker_point(angle_deg: f32, radius: f64) -> (f64, f64) {
    let rad = (angle_deg as f64).to_radians();
    (radius * rad.sin(), radius * rad.cos())
}

fn draw_platter(frame: &mut Frame, area: Rect, app: &App, deck: Deck) {
    let (slot, label, accent) = match deck {
        Deck::Current => (0, "deck A", Color::Magenta),
        Deck::Next => (1, "deck B", Color::Cyan),
    };
    let angle = app.platters[slot].angle();
    // Only the loaded deck carries the bass pulse ring.
    let pulse = match deck {
        Deck::Current => app.energy.value() as f64,
        Deck::Next => 0.0,
    };

    let title = match app.deck_track(deck) {
        Some(t) => format!(" {}: {} ", label, t.title),
        None => format!(" {}: empty ", label),
    };
    let subtitle = app
        .deck_track(deck)
        .map(|t| {
            format!(
                " {} • {} • {:.2} s/rev ",
                bpm_text(t),
                key_text(t),
                app.deck_period(deck)
            )
        })
        .unwrap_or_default();

    let canvas = Canvas::default()
        .block(
            Block::bordered()
                .title(title)
                .title_bottom(subtitle)
                .title_alignment(Alignment::Center),
        )
        .marker(Marker::Braille)
        .x_bounds([-1.1, 1.1])
        .y_bounds([-1.1, 1.1])
        .paint(move |ctx| {
            ctx.draw(&Circle {
                x: 0.0,
                y: 0.0,
                radius: 1.0,
                color: Color::DarkGray,
            });
            ctx.draw(&Circle {
                x: 0.0,
                y: 0.0,
                radius: 0.7,
                color: Color::DarkGray,
            });
            ctx.draw(&Circle {
                x: 0.0,
                y: 0.0,
                radius: 0.25 + 0.15 * pulse,
                color: accent,
            });
            let (x1, y1) = marker_point(angle, 0.3);
            let (x2, y2) = marker_point(angle, 1.0);
            ctx.draw(&CanvasLine {
                x1,
                y1,
                x2,
                y2,
                color: Color::White,
            });
        });
    frame.render_widget(canvas, area);
}

fn status_text(app: &App) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push(if app.is_playing() {
        " Playing".to_string()
    } else {
        " Paused".to_string()
    });

    let mode = match app.energy.capability() {
        Capability::Live(_) => "ENERGY: live bass",
        Capability::Pulse => "ENERGY: tempo pulse",
    };
    parts.push(mode.to_string());

    match app.mix_plan() {
        Some(plan) => parts.push(format!(
            "MIX: {} over {} bars ({:+.1} BPM)",
            plan.strategy.label(),
            plan.bars,
            plan.bpm_delta
        )),
        None => parts.push("MIX: --".to_string()),
    }

    parts.push(format!("Tracks: {}", app.playlist.len()));

    if let Some(s) = &app.status {
        parts.push(s.clone());
    }

    parts.join(" • ")
}

fn metadata_text(track: &Track) -> String {
    let mut lines = vec![
        format!("Title: {}", track.title),
        format!("Artist: {}", track.artist),
        format!("File: {}", track.filename),
        format!("Tempo: {}", bpm_text(track)),
        format!("Key: {}", key_text(track)),
    ];
    let sections = track.sections_by_start();
    if sections.is_empty() {
        lines.push("Sections: pending analysis".to_string());
    } else {
        lines.push("Sections:".to_string());
        for (name, [start, end]) in sections {
            lines.push(format!(
                "  {:<8} {} - {}",
                name,
                format_mss(start),
                format_mss(end)
            ));
        }
    }
    lines.join("\n")
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(frame: &mut Frame, app: &App, ui_settings: &UiSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(14),
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" spindeck ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let decks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    draw_platter(frame, decks[0], app, Deck::Current);
    draw_platter(frame, decks[1], app, Deck::Next);

    let meters = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    let energy = app.energy.value().clamp(0.0, 1.0);
    let energy_gauge = Gauge::default()
        .block(Block::bordered().title(" energy "))
        .gauge_style(Style::default().fg(Color::Magenta))
        .ratio(energy as f64)
        .label(format!("{:.2}", energy));
    frame.render_widget(energy_gauge, meters[0]);

    let progress = app.progress_value().clamp(0.0, 100.0);
    let progress_gauge = Gauge::default()
        .block(Block::bordered().title(" progress "))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(progress as f64 / 100.0)
        .label(format!("{:.1}%", progress));
    frame.render_widget(progress_gauge, meters[1]);

    let status_par = Paragraph::new(status_text(app))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[3]);

    // Track list, windowed around the cursor so only visible rows are built.
    {
        let tracks = app.playlist.tracks();
        let total = tracks.len();
        let list_height = chunks[4].height.saturating_sub(2) as usize;
        let cursor = app.cursor.min(total.saturating_sub(1));
        let (start, end, cursor_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, cursor)
        } else {
            let half = list_height / 2;
            let mut start = cursor.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, cursor - start)
        };

        let current = app.playlist.current();
        let next = app.playlist.next();
        let items: Vec<ListItem> = (start..end)
            .map(|i| {
                let mark = if i == current {
                    "▶ "
                } else if i == next {
                    "» "
                } else {
                    "  "
                };
                ListItem::new(format!("{}{}", mark, tracks[i].display()))
            })
            .collect();

        let block = Block::default().borders(Borders::ALL).title(" playlist ");
        if total == 0 {
            let hint = Paragraph::new("drop .wav files onto this window")
                .alignment(Alignment::Center)
                .italic()
                .block(block);
            frame.render_widget(hint, chunks[4]);
        } else {
            let list = List::new(items)
                .block(block)
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
                .highlight_symbol("> ");
            let mut state = ratatui::widgets::ListState::default();
            state.select(Some(cursor_in_visible));
            frame.render_stateful_widget(list, chunks[4], &mut state);
        }
    }

    if app.metadata_window {
        // Keep the popup inside the list area so it doesn't cover the decks.
        let popup_area = centered_rect_sized(60, 14, chunks[4]).intersection(chunks[4]);
        frame.render_widget(Clear, popup_area);

        let meta = app
            .playlist
            .get(app.cursor)
            .map(metadata_text)
            .unwrap_or_else(|| "No track selected".to_string());
        let meta_paragraph = Paragraph::new(meta)
            .block(
                Block::default()
                    .padding(Padding {
                        left: 1,
                        right: 0,
                        top: 0,
                        bottom: 0,
                    })
                    .borders(Borders::ALL)
                    .title(" metadata (K/esc closes) "),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(meta_paragraph, popup_area);
    }

    let footer = Paragraph::new(controls_text())
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
    frame.render_widget(footer, chunks[5]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::playlist::demo_tracks;
    use ratatui::{Terminal, backend::TestBackend};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn marker_starts_at_twelve_oclock_and_turns_clockwise() {
        let (x, y) = marker_point(0.0, 1.0);
        assert!(x.abs() < 1e-9 && (y - 1.0).abs() < 1e-9);
        let (x, y) = marker_point(90.0, 1.0);
        assert!((x - 1.0).abs() < 1e-9 && y.abs() < 1e-9);
    }

    #[test]
    fn format_mss_pads_seconds() {
        assert_eq!(format_mss(0.0), "0:00");
        assert_eq!(format_mss(75.4), "1:15");
        assert_eq!(format_mss(-3.0), "0:00");
    }

    #[test]
    fn draw_renders_demo_deck() {
        let settings = Settings::default();
        let mut app = App::new(demo_tracks(), &settings);
        app.metadata_window = true;

        let mut terminal = Terminal::new(TestBackend::new(120, 44)).unwrap();
        terminal.draw(|f| draw(f, &app, &settings.ui)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("spindeck"));
        assert!(text.contains("Night Drive"));
        assert!(text.contains("128.0 BPM"));
        assert!(text.contains("MIX: loop"));
        assert!(text.contains("chorus"));
        assert!(text.contains("s/rev"));
        assert!(text.contains("K/esc closes"));
    }

    #[test]
    fn draw_survives_tiny_and_empty_terminal() {
        let settings = Settings::default();
        let app = App::new(Vec::new(), &settings);
        let mut terminal = Terminal::new(TestBackend::new(20, 8)).unwrap();
        terminal.draw(|f| draw(f, &app, &settings.ui)).unwrap();
    }
}
