use std::f32::consts::TAU;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::EnergySettings;

use super::analyser::{FrequencyAnalyser, SpectrumAnalyser};

/// How the driver gets its raw samples. Chosen in [`EnergyDriver::attach`]
/// and kept until the next attach.
pub enum Capability {
    Live(Box<dyn FrequencyAnalyser>),
    Pulse,
}

impl Capability {
    pub fn label(&self) -> &'static str {
        match self {
            Capability::Live(_) => "live",
            Capability::Pulse => "pulse",
        }
    }
}

/// What the host loop knows about playback on a given frame.
#[derive(Debug, Copy, Clone)]
pub struct FrameInput {
    pub bpm: Option<f32>,
    pub playing: bool,
    /// Playhead as a fraction of the track, `0.0..1.0`.
    pub progress: f32,
}

pub struct EnergyDriver {
    settings: EnergySettings,
    capability: Capability,
    bins: Vec<u8>,
    /// Time since the driver was created; phase source for the pulse.
    clock: Duration,
    value: f32,
}

impl EnergyDriver {
    pub fn new(settings: EnergySettings) -> Self {
        Self {
            settings,
            capability: Capability::Pulse,
            bins: Vec::new(),
            clock: Duration::ZERO,
            value: 0.0,
        }
    }

    /// Point the driver at a new track. Any failure to build a live
    /// analyser quietly selects the tempo pulse.
    pub fn attach(&mut self, path: Option<&Path>) {
        let capability = match path {
            Some(p) => match SpectrumAnalyser::open(p, self.settings.fft_size) {
                Ok(a) => {
                    info!(path = %p.display(), "energy: live analysis");
                    Capability::Live(Box::new(a))
                }
                Err(e) => {
                    debug!(path = %p.display(), error = %e, "energy: falling back to tempo pulse");
                    Capability::Pulse
                }
            },
            None => Capability::Pulse,
        };
        self.set_capability(capability);
    }

    pub fn set_capability(&mut self, capability: Capability) {
        self.bins = match &capability {
            Capability::Live(a) => vec![0; a.bin_count()],
            Capability::Pulse => Vec::new(),
        };
        debug!(mode = capability.label(), bins = self.bins.len(), "energy: capability set");
        self.capability = capability;
    }

    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Advance one frame and return the new smoothed value.
    pub fn on_frame(&mut self, dt: Duration, input: FrameInput) -> f32 {
        self.clock += dt;

        if !input.playing {
            self.value = 0.0;
            return self.value;
        }

        let raw = self
            .live_sample(input.progress)
            .unwrap_or_else(|| tempo_pulse(self.bpm_or_default(input.bpm), self.clock.as_secs_f32()));
        self.value = smooth(self.value, raw, self.settings.smoothing);
        self.value
    }

    fn bpm_or_default(&self, bpm: Option<f32>) -> f32 {
        bpm.filter(|b| b.is_finite() && *b > 0.0)
            .unwrap_or(self.settings.default_bpm)
    }

    fn live_sample(&mut self, progress: f32) -> Option<f32> {
        let Capability::Live(analyser) = &mut self.capability else {
            return None;
        };

        let fraction = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let position = analyser.duration().mul_f32(fraction);
        match analyser.frequency_data(position, &mut self.bins) {
            Ok(()) => Some(bass_energy(
                &self.bins,
                analyser.max_magnitude(),
                self.settings.bass_fraction,
                self.settings.min_bass_bins,
            )),
            Err(e) => {
                debug!(error = %e, "energy: sampling failed, using pulse for this frame");
                None
            }
        }
    }
}

/// Sum of the lowest bins, normalised into `0..=1`.
///
/// Uses `max(min_bins, round(fraction * len))` bins, never more than exist.
pub fn bass_energy(bins: &[u8], max_magnitude: f32, fraction: f32, min_bins: usize) -> f32 {
    if bins.is_empty() || max_magnitude.is_nan() || max_magnitude <= 0.0 {
        return 0.0;
    }
    let wanted = (fraction.max(0.0) * bins.len() as f32).round() as usize;
    let count = wanted.max(min_bins).min(bins.len()).max(1);
    let sum: f32 = bins[..count].iter().map(|&b| b as f32).sum();
    (sum / (count as f32 * max_magnitude)).clamp(0.0, 1.0)
}

/// Sine pulse at `bpm` beats per minute, mapped from `-1..1` onto `0..1`.
pub fn tempo_pulse(bpm: f32, t_secs: f32) -> f32 {
    let phase = TAU * (bpm / 60.0) * t_secs;
    let v = (phase.sin() + 1.0) / 2.0;
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
}

/// One step of the first-order low-pass: `s * prev + (1 - s) * raw`.
pub fn smooth(prev: f32, raw: f32, smoothing: f32) -> f32 {
    let raw = if raw.is_finite() { raw.clamp(0.0, 1.0) } else { 0.0 };
    let v = smoothing * prev + (1.0 - smoothing) * raw;
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
}
