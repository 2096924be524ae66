//! Application model types: `App` and `PlaybackState`.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::info;

use crate::config::{IntakeSettings, MotionSettings, ProgressSettings, Settings};
use crate::energy::{EnergyDriver, FrameInput};
use crate::harmony::MixPlan;
use crate::motion::{Platter, seconds_per_revolution};
use crate::playlist::{Playlist, Track, intake_paths, parse_dropped_text};
use crate::progress::{ProgressHandle, ProgressSimulator, ProgressTimer};

/// The playback state of the deck.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Paused,
    Playing,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::Paused
    }
}

/// Which platter a value belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Deck {
    Current,
    Next,
}

/// The main application model.
pub struct App {
    pub playlist: Playlist,
    /// Highlighted row in the track list; independent of what is loaded.
    pub cursor: usize,
    pub playback: PlaybackState,
    pub energy: EnergyDriver,
    pub platters: [Platter; 2],
    pub progress: ProgressHandle,
    timer: Option<ProgressTimer>,

    pub status: Option<String>,
    pub metadata_window: bool,

    motion: MotionSettings,
    intake: IntakeSettings,
    progress_settings: ProgressSettings,
    default_bpm: f32,
    mix_bars: u32,
}

impl App {
    /// Create a new `App` over `tracks`, with the first one loaded.
    pub fn new(tracks: Vec<Track>, settings: &Settings) -> Self {
        let mut app = Self {
            playlist: Playlist::new(tracks),
            cursor: 0,
            playback: PlaybackState::Paused,
            energy: EnergyDriver::new(settings.energy.clone()),
            platters: [Platter::default(), Platter::default()],
            progress: Arc::new(Mutex::new(ProgressSimulator::new(settings.progress.step))),
            timer: None,

            status: None,
            metadata_window: false,

            motion: settings.motion.clone(),
            intake: settings.intake.clone(),
            progress_settings: settings.progress.clone(),
            default_bpm: settings.energy.default_bpm,
            mix_bars: settings.mix.bars,
        };
        app.select(0);
        app
    }

    pub fn has_tracks(&self) -> bool {
        !self.playlist.is_empty()
    }

    pub fn is_playing(&self) -> bool {
        self.playback == PlaybackState::Playing
    }

    pub fn toggle_metadata_window(&mut self) {
        self.metadata_window = !self.metadata_window;
    }

    /// Flip play/pause. The progress ticker only exists while playing.
    pub fn toggle_play(&mut self) {
        match self.playback {
            PlaybackState::Playing => {
                self.playback = PlaybackState::Paused;
                self.timer = None;
            }
            PlaybackState::Paused => {
                if !self.has_tracks() {
                    return;
                }
                self.playback = PlaybackState::Playing;
                self.timer = Some(ProgressTimer::start(
                    self.progress.clone(),
                    Duration::from_millis(self.progress_settings.tick_ms),
                ));
            }
        }
    }

    /// Load the track at `idx` (clamped) onto the current deck.
    pub fn select(&mut self, idx: usize) {
        self.playlist.select(idx);
        self.load_current();
    }

    /// Refresh cursor, progress and energy source for the loaded track.
    fn load_current(&mut self) {
        self.cursor = self.playlist.current();
        if let Ok(mut p) = self.progress.lock() {
            p.reset();
        }
        let path = self.playlist.current_track().and_then(|t| t.path.clone());
        self.energy.attach(path.as_deref());
    }

    /// Load the highlighted row.
    pub fn select_cursor(&mut self) {
        self.select(self.cursor);
    }

    /// Load whatever is queued on the next deck.
    pub fn advance(&mut self) {
        let before = self.playlist.current();
        self.playlist.advance();
        if self.playlist.current() != before {
            self.load_current();
        }
    }

    /// Move the cursor down, wrapping to the top.
    pub fn cursor_next(&mut self) {
        let len = self.playlist.len();
        if len > 0 {
            self.cursor = (self.cursor + 1) % len;
        }
    }

    /// Move the cursor up, wrapping to the bottom.
    pub fn cursor_prev(&mut self) {
        let len = self.playlist.len();
        if len > 0 {
            self.cursor = (self.cursor + len - 1) % len;
        }
    }

    pub fn cursor_first(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_last(&mut self) {
        self.cursor = self.playlist.len().saturating_sub(1);
    }

    /// Add dropped/passed paths to the end of the playlist.
    pub fn intake<I>(&mut self, paths: I)
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let was_empty = !self.has_tracks();
        let outcome = intake_paths(paths, &self.intake);
        let summary = outcome.summary();
        info!(
            accepted = outcome.accepted.len(),
            rejected = outcome.rejected,
            "intake"
        );

        self.playlist.extend(outcome.accepted);
        if was_empty && self.has_tracks() {
            self.select(0);
        }
        self.status = Some(summary);
    }

    /// Intake for text pasted into the terminal (how file drops arrive).
    pub fn intake_pasted(&mut self, text: &str) {
        self.intake(parse_dropped_text(text));
    }

    fn bpm_of(&self, track: Option<&Track>) -> f32 {
        track
            .and_then(|t| t.bpm)
            .filter(|b| b.is_finite() && *b > 0.0)
            .unwrap_or(self.default_bpm)
    }

    pub fn deck_track(&self, deck: Deck) -> Option<&Track> {
        match deck {
            Deck::Current => self.playlist.current_track(),
            Deck::Next => self.playlist.next_track(),
        }
    }

    pub fn deck_bpm(&self, deck: Deck) -> f32 {
        self.bpm_of(self.deck_track(deck))
    }

    /// Seconds per platter revolution for each deck.
    pub fn deck_period(&self, deck: Deck) -> f32 {
        seconds_per_revolution(self.deck_bpm(deck), &self.motion)
    }

    pub fn progress_value(&self) -> f32 {
        self.progress.lock().map(|p| p.value()).unwrap_or(0.0)
    }

    /// Transition the backend would be asked for, current -> next.
    pub fn mix_plan(&self) -> Option<MixPlan> {
        let from = self.playlist.current_track()?;
        let to = self.playlist.next_track()?;
        MixPlan::between(from, to, self.mix_bars)
    }

    /// Per-frame update called by the host loop before drawing.
    pub fn on_frame(&mut self, dt: Duration) {
        let playing = self.is_playing();
        let input = FrameInput {
            bpm: self.playlist.current_track().and_then(|t| t.bpm),
            playing,
            progress: self.progress.lock().map(|p| p.fraction()).unwrap_or(0.0),
        };
        self.energy.on_frame(dt, input);

        let bpms = [self.deck_bpm(Deck::Current), self.deck_bpm(Deck::Next)];
        for (platter, bpm) in self.platters.iter_mut().zip(bpms) {
            platter.on_frame(dt, bpm, playing, &self.motion);
        }
    }
}
