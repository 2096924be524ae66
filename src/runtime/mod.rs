use std::env;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::app::App;
use crate::playlist::demo_tracks;

mod event_loop;
mod logging;
mod settings;
mod terminal;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, settings_problem) = settings::load_settings();
    let _log_guard = logging::init(&settings.log);
    if let Some(problem) = settings_problem {
        warn!("{problem}");
    }

    // Every argument is treated like a dropped file or folder.
    let paths: Vec<PathBuf> = env::args_os().skip(1).map(PathBuf::from).collect();

    let seed = if settings.playlist.seed_demo_tracks {
        demo_tracks()
    } else {
        Vec::new()
    };
    let mut app = App::new(seed, &settings);
    if !paths.is_empty() {
        app.intake(paths);
    }
    info!(tracks = app.playlist.len(), "starting deck");

    let mut terminal = terminal::TerminalGuard::enter()?;
    let mut state = event_loop::EventLoopState::default();
    event_loop::run(terminal.terminal(), &settings, &mut app, &mut state)
}
