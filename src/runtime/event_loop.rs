use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use tracing::debug;

use crate::app::App;
use crate::config;
use crate::ui;

use super::terminal::Tui;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

/// Main terminal loop. Each pass is one frame: update the deck, draw it,
/// then wait up to `ui.frame_ms` for input. Returns when quit is requested.
pub fn run(
    terminal: &mut Tui,
    settings: &config::Settings,
    app: &mut App,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    let frame_budget = Duration::from_millis(settings.ui.frame_ms);
    let mut last_frame = Instant::now();

    loop {
        let now = Instant::now();
        app.on_frame(now - last_frame);
        last_frame = now;

        terminal.draw(|f| ui::draw(f, app, &settings.ui))?;

        if event::poll(frame_budget)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if handle_key_event(key, app, state) {
                        break;
                    }
                }
                Event::Paste(text) => {
                    state.pending_gg = false;
                    debug!(bytes = text.len(), "paste received");
                    app.intake_pasted(&text);
                }
                _ => {}
            }
        }
    }

    Ok(())
}

/// Apply one key press. Returns `true` when the app should exit.
pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App, state: &mut EventLoopState) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc if !app.metadata_window => {
            return true;
        }
        KeyCode::Esc => {
            app.metadata_window = false;
        }
        KeyCode::Char('g') => {
            if state.pending_gg {
                app.cursor_first();
            }
            state.pending_gg = !state.pending_gg;
            return false;
        }
        KeyCode::Char('G') => app.cursor_last(),
        KeyCode::Char('j') | KeyCode::Down => app.cursor_next(),
        KeyCode::Char('k') | KeyCode::Up => app.cursor_prev(),
        KeyCode::Enter => app.select_cursor(),
        KeyCode::Char('p') | KeyCode::Char(' ') => app.toggle_play(),
        KeyCode::Char('l') => app.advance(),
        KeyCode::Char('K') => app.toggle_metadata_window(),
        _ => {}
    }
    // Any other key cancels a half-typed `gg`.
    state.pending_gg = false;
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::playlist::demo_tracks;
    use crossterm::event::KeyModifiers;

    fn press(app: &mut App, state: &mut EventLoopState, code: KeyCode) -> bool {
        handle_key_event(KeyEvent::new(code, KeyModifiers::NONE), app, state)
    }

    #[test]
    fn keys_drive_cursor_selection_and_playback() {
        let mut app = App::new(demo_tracks(), &Settings::default());
        let mut state = EventLoopState::default();

        assert!(!press(&mut app, &mut state, KeyCode::Char('j')));
        assert_eq!(app.cursor, 1);
        press(&mut app, &mut state, KeyCode::Enter);
        assert_eq!(app.playlist.current(), 1);

        press(&mut app, &mut state, KeyCode::Char('g'));
        press(&mut app, &mut state, KeyCode::Char('g'));
        assert_eq!(app.cursor, 0);

        press(&mut app, &mut state, KeyCode::Char(' '));
        assert!(app.is_playing());
        press(&mut app, &mut state, KeyCode::Char('p'));
        assert!(!app.is_playing());

        assert!(press(&mut app, &mut state, KeyCode::Char('q')));
    }

    #[test]
    fn interrupted_gg_does_not_jump() {
        let mut app = App::new(demo_tracks(), &Settings::default());
        let mut state = EventLoopState::default();
        app.cursor = 1;

        press(&mut app, &mut state, KeyCode::Char('g'));
        press(&mut app, &mut state, KeyCode::Char('x'));
        press(&mut app, &mut state, KeyCode::Char('g'));
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn esc_closes_metadata_before_quitting() {
        let mut app = App::new(demo_tracks(), &Settings::default());
        let mut state = EventLoopState::default();

        press(&mut app, &mut state, KeyCode::Char('K'));
        assert!(app.metadata_window);
        assert!(!press(&mut app, &mut state, KeyCode::Esc));
        assert!(!app.metadata_window);
        assert!(press(&mut app, &mut state, KeyCode::Esc));
    }
}
