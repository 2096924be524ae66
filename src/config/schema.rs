use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/spindeck/config.toml` or `~/.config/spindeck/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `SPINDECK__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub energy: EnergySettings,
    pub motion: MotionSettings,
    pub progress: ProgressSettings,
    pub intake: IntakeSettings,
    pub playlist: PlaylistSettings,
    pub mix: MixSettings,
    pub ui: UiSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnergySettings {
    /// Weight kept from the previous frame (`value = s * prev + (1 - s) * raw`).
    pub smoothing: f32,
    /// Share of the lowest frequency bins summed as "bass".
    pub bass_fraction: f32,
    /// Lower bound on the number of bass bins.
    pub min_bass_bins: usize,
    /// FFT window length used by the live analyser. Must be a power of two.
    pub fft_size: usize,
    /// Tempo assumed for the synthetic pulse when a track has no BPM.
    pub default_bpm: f32,
}

impl Default for EnergySettings {
    fn default() -> Self {
        Self {
            smoothing: 0.8,
            bass_fraction: 0.06,
            min_bass_bins: 8,
            fft_size: 1024,
            default_bpm: 120.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MotionSettings {
    /// Platter speed at 120 BPM, in revolutions per minute.
    pub base_rpm: f32,
    /// BPM distance from 120 that would double (or stop) the platter
    /// before clamping. The speed factor is `(bpm - 120) / reference_span`.
    pub reference_span: f32,
    /// Largest relative speed change BPM may cause (0.35 = +/-35%).
    pub max_speed_delta: f32,
    /// Fraction of the remaining angle recovered per frame when paused.
    pub spring_return: f32,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            base_rpm: 33.3,
            reference_span: 300.0,
            max_speed_delta: 0.35,
            spring_return: 0.2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProgressSettings {
    /// Percentage points added per tick.
    pub step: f32,
    /// Interval between ticks (milliseconds).
    pub tick_ms: u64,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            step: 0.25,
            tick_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IntakeSettings {
    /// Accepted file extensions (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether dropped directories are walked recursively.
    pub recursive: bool,
}

impl Default for IntakeSettings {
    fn default() -> Self {
        Self {
            extensions: vec!["wav".into()],
            recursive: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaylistSettings {
    /// Start with the two demo tracks in the playlist.
    pub seed_demo_tracks: bool,
}

impl Default for PlaylistSettings {
    fn default() -> Self {
        Self {
            seed_demo_tracks: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MixSettings {
    /// Length of the suggested transition, in bars.
    pub bars: u32,
}

impl Default for MixSettings {
    fn default() -> Self {
        Self { bars: 16 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Upper bound on the time spent waiting for input per frame (milliseconds).
    pub frame_ms: u64,

    /// The text rendered inside the top header box.
    pub header_text: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            frame_ms: 16,
            header_text: " ~ drop .wav files here ~ ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Directory for the rolling log file. Defaults to the XDG state dir.
    pub dir: Option<PathBuf>,
    /// `tracing` filter directive used when `SPINDECK_LOG` is unset.
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            dir: None,
            filter: "info".to_string(),
        }
    }
}
