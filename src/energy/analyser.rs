//! Frequency analysis over a decoded track.
//!
//! `SpectrumAnalyser` mirrors what a browser `AnalyserNode` reports from
//! `getByteFrequencyData`: a Hann-windowed FFT whose magnitudes are mapped
//! from decibels onto `0..=255`.

use std::f32::consts::PI;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rodio::{Decoder, Source};
use rustfft::{Fft, FftPlanner, num_complex::Complex};

/// Decibel range mapped onto the byte scale.
const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;

pub const BYTE_MAX: f32 = 255.0;

#[derive(Debug)]
pub enum AnalyserError {
    Io(std::io::Error),
    Decode(String),
    /// The file decoded to zero samples.
    Empty,
    /// Caller's bin buffer does not match `bin_count()`.
    BinCount { expected: usize, found: usize },
}

impl fmt::Display for AnalyserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyserError::Io(e) => write!(f, "IO error: {}", e),
            AnalyserError::Decode(msg) => write!(f, "decode error: {}", msg),
            AnalyserError::Empty => write!(f, "audio contains no samples"),
            AnalyserError::BinCount { expected, found } => {
                write!(f, "expected {} frequency bins, got {}", expected, found)
            }
        }
    }
}

impl std::error::Error for AnalyserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnalyserError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AnalyserError {
    fn from(e: std::io::Error) -> Self {
        AnalyserError::Io(e)
    }
}

/// A source of per-frame frequency magnitudes.
pub trait FrequencyAnalyser: Send {
    /// Number of magnitude bins filled by [`frequency_data`](Self::frequency_data).
    fn bin_count(&self) -> usize;

    /// Largest value a bin can hold.
    fn max_magnitude(&self) -> f32 {
        BYTE_MAX
    }

    /// Length of the analysed audio.
    fn duration(&self) -> Duration;

    /// Fill `bins` with magnitudes for the window starting at `position`.
    fn frequency_data(&mut self, position: Duration, bins: &mut [u8]) -> Result<(), AnalyserError>;
}

pub struct SpectrumAnalyser {
    samples: Vec<f32>,
    sample_rate: u32,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
}

impl SpectrumAnalyser {
    /// Decode `path` into mono samples ready for analysis.
    pub fn open(path: &Path, fft_size: usize) -> Result<Self, AnalyserError> {
        let file = File::open(path)?;
        let decoder =
            Decoder::new(BufReader::new(file)).map_err(|e| AnalyserError::Decode(e.to_string()))?;

        let channels = (decoder.channels() as usize).max(1);
        let sample_rate = decoder.sample_rate();
        let interleaved: Vec<f32> = decoder.collect();

        Self::from_samples(downmix(&interleaved, channels), sample_rate, fft_size)
    }

    pub fn from_samples(
        samples: Vec<f32>,
        sample_rate: u32,
        fft_size: usize,
    ) -> Result<Self, AnalyserError> {
        if samples.is_empty() || sample_rate == 0 {
            return Err(AnalyserError::Empty);
        }

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        Ok(Self {
            samples,
            sample_rate,
            fft,
            window: (0..fft_size).map(|i| hann_window(i, fft_size)).collect(),
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
        })
    }

    pub fn fft_size(&self) -> usize {
        self.buffer.len()
    }
}

impl FrequencyAnalyser for SpectrumAnalyser {
    fn bin_count(&self) -> usize {
        self.fft_size() / 2
    }

    fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }

    fn frequency_data(&mut self, position: Duration, bins: &mut [u8]) -> Result<(), AnalyserError> {
        let expected = self.bin_count();
        if bins.len() != expected {
            return Err(AnalyserError::BinCount {
                expected,
                found: bins.len(),
            });
        }

        let n = self.fft_size();
        let start = (position.as_secs_f64() * self.sample_rate as f64) as usize;
        for (i, slot) in self.buffer.iter_mut().enumerate() {
            // Past the end of the track reads as silence.
            let s = self.samples.get(start + i).copied().unwrap_or(0.0);
            *slot = Complex::new(s * self.window[i], 0.0);
        }

        self.fft.process(&mut self.buffer);

        for (bin, c) in bins.iter_mut().zip(&self.buffer) {
            *bin = magnitude_to_byte(c.norm() / n as f32);
        }
        Ok(())
    }
}

fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

fn magnitude_to_byte(magnitude: f32) -> u8 {
    if magnitude <= 0.0 || !magnitude.is_finite() {
        return 0;
    }
    let db = 20.0 * magnitude.log10();
    let scaled = BYTE_MAX * (db - MIN_DECIBELS) / (MAX_DECIBELS - MIN_DECIBELS);
    scaled.clamp(0.0, BYTE_MAX) as u8
}

/// Hann window function for FFT analysis
fn hann_window(index: usize, size: usize) -> f32 {
    0.5 * (1.0 - ((2.0 * PI * index as f32) / (size as f32 - 1.0)).cos())
}
