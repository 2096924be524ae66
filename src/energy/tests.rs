use std::f64::consts::TAU;
use std::path::Path;
use std::time::Duration;

use super::analyser::{AnalyserError, BYTE_MAX, FrequencyAnalyser, SpectrumAnalyser};
use super::driver::{bass_energy, smooth, tempo_pulse};
use super::*;
use crate::config::EnergySettings;

const FRAME: Duration = Duration::from_millis(16);

fn playing(bpm: Option<f32>) -> FrameInput {
    FrameInput {
        bpm,
        playing: true,
        progress: 0.0,
    }
}

fn paused() -> FrameInput {
    FrameInput {
        bpm: Some(128.0),
        playing: false,
        progress: 0.0,
    }
}

/// Analyser returning a fixed bin pattern, or failing every call.
struct FixedAnalyser {
    level: u8,
    fail: bool,
}

impl FrequencyAnalyser for FixedAnalyser {
    fn bin_count(&self) -> usize {
        512
    }

    fn duration(&self) -> Duration {
        Duration::from_secs(60)
    }

    fn frequency_data(&mut self, _position: Duration, bins: &mut [u8]) -> Result<(), AnalyserError> {
        if self.fail {
            return Err(AnalyserError::Decode("boom".into()));
        }
        bins.fill(self.level);
        Ok(())
    }
}

fn tone(freq: f64, sample_rate: u32, secs: f64) -> Vec<f32> {
    let n = (sample_rate as f64 * secs) as usize;
    // Phase in f64: f32 loses enough precision over a second of samples to
    // smear a high tone into the bass bins.
    (0..n)
        .map(|i| (0.8 * (TAU * freq * i as f64 / sample_rate as f64).sin()) as f32)
        .collect()
}

#[test]
fn smoothing_keeps_value_finite_and_in_unit_range() {
    let raws = [0.0, 1.0, 0.5, 1.0, 1.0, 0.0, 0.25, f32::NAN, 2.0, -1.0, f32::INFINITY];
    let mut v = 0.0;
    for _ in 0..50 {
        for &raw in &raws {
            v = smooth(v, raw, 0.8);
            assert!(v.is_finite());
            assert!((0.0..=1.0).contains(&v), "value {v} escaped [0, 1]");
        }
    }
}

#[test]
fn smoothing_is_first_order_low_pass() {
    let v = smooth(0.5, 1.0, 0.8);
    assert!((v - 0.6).abs() < 1e-6);
    let v = smooth(0.0, 1.0, 0.8);
    assert!((v - 0.2).abs() < 1e-6);
}

#[test]
fn bass_energy_uses_lowest_bins_with_minimum() {
    // 512 bins * 0.06 = 30.72 -> 31 bins.
    let mut bins = vec![0u8; 512];
    bins[..31].fill(255);
    assert!((bass_energy(&bins, BYTE_MAX, 0.06, 8) - 1.0).abs() < 1e-6);

    // Only 64 bins: 0.06 * 64 rounds to 4, the minimum of 8 wins.
    let mut small = vec![0u8; 64];
    small[..4].fill(255);
    assert!((bass_energy(&small, BYTE_MAX, 0.06, 8) - 0.5).abs() < 1e-6);

    // Fewer bins than the minimum: use what exists.
    assert!((bass_energy(&[255, 255, 255], BYTE_MAX, 0.06, 8) - 1.0).abs() < 1e-6);
    assert_eq!(bass_energy(&[], BYTE_MAX, 0.06, 8), 0.0);
    assert_eq!(bass_energy(&[255], 0.0, 0.06, 8), 0.0);
}

#[test]
fn tempo_pulse_follows_beats() {
    // 120 BPM = 2 beats per second: a quarter beat in is the crest.
    assert!((tempo_pulse(120.0, 0.125) - 1.0).abs() < 1e-5);
    assert!((tempo_pulse(120.0, 0.0) - 0.5).abs() < 1e-6);
    assert!((tempo_pulse(120.0, 0.375) - 0.0).abs() < 1e-5);
    assert_eq!(tempo_pulse(f32::NAN, 1.0), 0.0);
}

#[test]
fn paused_frame_resets_to_exactly_zero() {
    let mut d = EnergyDriver::new(EnergySettings::default());
    d.set_capability(Capability::Live(Box::new(FixedAnalyser {
        level: 255,
        fail: false,
    })));
    for _ in 0..30 {
        d.on_frame(FRAME, playing(Some(128.0)));
    }
    assert!(d.value() > 0.9);

    assert_eq!(d.on_frame(FRAME, paused()), 0.0);
    assert_eq!(d.value(), 0.0);

    // Resumes on the very next playing frame.
    assert!(d.on_frame(FRAME, playing(Some(128.0))) > 0.0);
}

#[test]
fn live_capability_drives_value_toward_bass_level() {
    let mut d = EnergyDriver::new(EnergySettings::default());
    d.set_capability(Capability::Live(Box::new(FixedAnalyser {
        level: 51,
        fail: false,
    })));
    assert_eq!(d.capability().label(), "live");

    let mut v = 0.0;
    for _ in 0..100 {
        v = d.on_frame(FRAME, playing(None));
    }
    assert!((v - 0.2).abs() < 1e-3, "got {v}");
}

#[test]
fn failing_sample_falls_back_to_pulse_for_that_frame() {
    let mut d = EnergyDriver::new(EnergySettings::default());
    d.set_capability(Capability::Live(Box::new(FixedAnalyser {
        level: 0,
        fail: true,
    })));

    // 120 BPM crest is at 0.125 s: one frame of that length gives raw = 1.
    let v = d.on_frame(Duration::from_millis(125), playing(Some(120.0)));
    assert!((v - 0.2).abs() < 1e-4, "got {v}");
    // The capability itself is not downgraded.
    assert_eq!(d.capability().label(), "live");
}

#[test]
fn unknown_bpm_uses_default_tempo() {
    let mut a = EnergyDriver::new(EnergySettings::default());
    let mut b = EnergyDriver::new(EnergySettings::default());
    for _ in 0..20 {
        let va = a.on_frame(FRAME, playing(None));
        let vb = b.on_frame(FRAME, playing(Some(120.0)));
        assert_eq!(va, vb);
    }
    let mut c = EnergyDriver::new(EnergySettings::default());
    let vc = c.on_frame(FRAME, playing(Some(-10.0)));
    let mut e = EnergyDriver::new(EnergySettings::default());
    assert_eq!(vc, e.on_frame(FRAME, playing(Some(120.0))));
}

#[test]
fn attach_without_usable_audio_selects_pulse() {
    let mut d = EnergyDriver::new(EnergySettings::default());
    d.attach(None);
    assert_eq!(d.capability().label(), "pulse");

    d.attach(Some(Path::new("/definitely/not/here.wav")));
    assert_eq!(d.capability().label(), "pulse");

    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("bogus.wav");
    std::fs::write(&bogus, b"this is not a riff file").unwrap();
    d.attach(Some(&bogus));
    assert_eq!(d.capability().label(), "pulse");

    // Still produces a value.
    let v = d.on_frame(FRAME, playing(Some(124.0)));
    assert!((0.0..=1.0).contains(&v));
}

#[test]
fn spectrum_sees_more_bass_in_low_tone() {
    let settings = EnergySettings::default();
    let measure = |freq: f64| {
        let mut a =
            SpectrumAnalyser::from_samples(tone(freq, 44_100, 1.0), 44_100, settings.fft_size)
                .unwrap();
        let mut bins = vec![0u8; a.bin_count()];
        a.frequency_data(Duration::from_millis(250), &mut bins).unwrap();
        bass_energy(
            &bins,
            a.max_magnitude(),
            settings.bass_fraction,
            settings.min_bass_bins,
        )
    };

    let low = measure(60.0);
    let high = measure(6_000.0);
    assert!(low > 0.05, "low tone energy {low}");
    assert!(low > high * 4.0, "low {low} vs high {high}");
}

#[test]
fn attach_decodes_wav_for_live_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kick.wav");
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 44_100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for s in tone(60.0, 44_100, 1.0) {
        let v = (s * i16::MAX as f32) as i16;
        writer.write_sample(v).unwrap();
        writer.write_sample(v).unwrap();
    }
    writer.finalize().unwrap();

    let analyser = SpectrumAnalyser::open(&path, 1024).unwrap();
    let secs = analyser.duration().as_secs_f32();
    assert!((secs - 1.0).abs() < 0.01, "duration {secs}");

    let mut d = EnergyDriver::new(EnergySettings::default());
    d.attach(Some(&path));
    assert_eq!(d.capability().label(), "live");

    let input = FrameInput {
        bpm: None,
        playing: true,
        progress: 0.25,
    };
    let mut v = 0.0;
    for _ in 0..40 {
        v = d.on_frame(FRAME, input);
    }
    assert!(v > 0.05, "energy {v}");
}
