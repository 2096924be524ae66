//! Camelot wheel helpers and the transition strategy suggested for a pair of
//! tracks.
//!
//! The mixing itself is left to a backend. This module only decides what
//! such a backend would be asked to do, so the deck can show it.

use std::fmt;
use std::str::FromStr;

use crate::playlist::{Track, TrackId};

/// BPM gap under which a looped transition is considered.
const LOOP_BPM_WINDOW: f32 = 10.0;
/// BPM gap that always allows a tight transition.
const TIGHT_BPM_WINDOW: f32 = 5.0;
/// BPM gap that allows a tight transition when keys agree.
const LOOSE_BPM_WINDOW: f32 = 15.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Scale {
    Major,
    Minor,
}

/// `A` is the minor ring, `B` the major ring.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Ring {
    A,
    B,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Camelot {
    number: u8,
    ring: Ring,
}

impl Camelot {
    pub fn new(number: u8, ring: Ring) -> Option<Self> {
        (1..=12).contains(&number).then_some(Self { number, ring })
    }

    /// Map a key name (`"C"`, `"F#"`, `"Bb"`) and scale onto the wheel.
    pub fn from_key(name: &str, scale: Scale) -> Option<Self> {
        let pitch = sharp_name(name.trim())?;
        // Walking the circle of fifths from B major (1B) / G# minor (1A).
        const MAJOR: [&str; 12] = [
            "B", "F#", "C#", "G#", "D#", "A#", "F", "C", "G", "D", "A", "E",
        ];
        const MINOR: [&str; 12] = [
            "G#", "D#", "A#", "F", "C", "G", "D", "A", "E", "B", "F#", "C#",
        ];
        let (table, ring) = match scale {
            Scale::Major => (&MAJOR, Ring::B),
            Scale::Minor => (&MINOR, Ring::A),
        };
        let pos = table.iter().position(|p| *p == pitch)?;
        Self::new(pos as u8 + 1, ring)
    }

    /// Parse `"A minor"`, `"C# major"` or `"Ebm"` style key labels.
    pub fn from_key_label(label: &str) -> Option<Self> {
        let label = label.trim();
        let mut parts = label.split_whitespace();
        let first = parts.next()?;
        match parts.next().map(|s| s.to_ascii_lowercase()) {
            Some(s) if s == "major" || s == "maj" => Self::from_key(first, Scale::Major),
            Some(s) if s == "minor" || s == "min" => Self::from_key(first, Scale::Minor),
            Some(_) => None,
            None => match first.strip_suffix('m') {
                Some(root) if !root.is_empty() => Self::from_key(root, Scale::Minor),
                _ => Self::from_key(first, Scale::Major),
            },
        }
    }

    /// Harmonic compatibility on the wheel: same slot, a neighbour on the
    /// same ring (12 and 1 are neighbours), or the relative major/minor.
    pub fn compatible(&self, other: &Camelot) -> bool {
        if self.ring == other.ring {
            let diff = self.number.abs_diff(other.number);
            diff <= 1 || diff == 11
        } else {
            self.number == other.number
        }
    }
}

fn sharp_name(name: &str) -> Option<&'static str> {
    let pitch = match name {
        "C" | "B#" => "C",
        "C#" | "Db" => "C#",
        "D" => "D",
        "D#" | "Eb" => "D#",
        "E" | "Fb" => "E",
        "F" | "E#" => "F",
        "F#" | "Gb" => "F#",
        "G" => "G",
        "G#" | "Ab" => "G#",
        "A" => "A",
        "A#" | "Bb" => "A#",
        "B" | "Cb" => "B",
        _ => return None,
    };
    Some(pitch)
}

impl fmt::Display for Camelot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ring = match self.ring {
            Ring::A => 'A',
            Ring::B => 'B',
        };
        write!(f, "{}{}", self.number, ring)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCamelotError(String);

impl fmt::Display for ParseCamelotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid Camelot code: {:?}", self.0)
    }
}

impl std::error::Error for ParseCamelotError {}

impl FromStr for Camelot {
    type Err = ParseCamelotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCamelotError(s.to_string());
        let mut chars = s.trim().chars();
        let ring = match chars.next_back() {
            Some('A' | 'a') => Ring::A,
            Some('B' | 'b') => Ring::B,
            _ => return Err(err()),
        };
        let number: u8 = chars.as_str().parse().map_err(|_| err())?;
        Camelot::new(number, ring).ok_or_else(err)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MixStrategy {
    /// Loop a section of the outgoing track under the incoming one.
    Loop,
    /// Beat-matched stem swap over a short window.
    Tight,
    /// Long blend that tolerates tempo and key clashes.
    Loose,
}

impl MixStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            MixStrategy::Loop => "loop",
            MixStrategy::Tight => "tight",
            MixStrategy::Loose => "loose",
        }
    }
}

/// Pick a transition style from tempo and key. Unknown keys count as
/// incompatible. Without both tempos there is nothing to suggest.
pub fn suggest_strategy(
    bpm_a: Option<f32>,
    bpm_b: Option<f32>,
    key_a: Option<Camelot>,
    key_b: Option<Camelot>,
) -> Option<MixStrategy> {
    let (a, b) = (bpm_a?, bpm_b?);
    if !a.is_finite() || !b.is_finite() {
        return None;
    }
    let diff = (a - b).abs();
    let keys_ok = matches!((key_a, key_b), (Some(x), Some(y)) if x.compatible(&y));

    let strategy = if keys_ok && diff <= LOOP_BPM_WINDOW {
        MixStrategy::Loop
    } else if diff <= TIGHT_BPM_WINDOW || (keys_ok && diff <= LOOSE_BPM_WINDOW) {
        MixStrategy::Tight
    } else {
        MixStrategy::Loose
    };
    Some(strategy)
}

/// What a mix request for `from -> to` would carry.
#[derive(Debug, Clone, PartialEq)]
pub struct MixPlan {
    pub from: TrackId,
    pub to: TrackId,
    pub strategy: MixStrategy,
    pub bars: u32,
    /// Tempo gap, `to - from`.
    pub bpm_delta: f32,
}

impl MixPlan {
    pub fn between(from: &Track, to: &Track, bars: u32) -> Option<Self> {
        if from.id == to.id {
            return None;
        }
        let strategy = suggest_strategy(from.bpm, to.bpm, from.camelot, to.camelot)?;
        Some(Self {
            from: from.id,
            to: to.id,
            strategy,
            bars,
            bpm_delta: to.bpm? - from.bpm?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cam(s: &str) -> Camelot {
        s.parse().unwrap()
    }

    #[test]
    fn parses_and_displays_codes() {
        assert_eq!(cam("8A").to_string(), "8A");
        assert_eq!(cam(" 12b ").to_string(), "12B");
        assert!("13A".parse::<Camelot>().is_err());
        assert!("0B".parse::<Camelot>().is_err());
        assert!("8C".parse::<Camelot>().is_err());
        assert!("".parse::<Camelot>().is_err());
        assert!("A".parse::<Camelot>().is_err());
    }

    #[test]
    fn keys_map_onto_wheel() {
        assert_eq!(Camelot::from_key("C", Scale::Major), Some(cam("8B")));
        assert_eq!(Camelot::from_key("A", Scale::Minor), Some(cam("8A")));
        assert_eq!(Camelot::from_key("Db", Scale::Major), Some(cam("3B")));
        assert_eq!(Camelot::from_key("Ab", Scale::Minor), Some(cam("1A")));
        assert_eq!(Camelot::from_key("E", Scale::Major), Some(cam("12B")));
        assert_eq!(Camelot::from_key("H", Scale::Major), None);

        assert_eq!(Camelot::from_key_label("A minor"), Some(cam("8A")));
        assert_eq!(Camelot::from_key_label("F# major"), Some(cam("2B")));
        assert_eq!(Camelot::from_key_label("Ebm"), Some(cam("2A")));
        assert_eq!(Camelot::from_key_label("G"), Some(cam("9B")));
        assert_eq!(Camelot::from_key_label("G lydian"), None);
    }

    #[test]
    fn compatibility_rules() {
        assert!(cam("8A").compatible(&cam("8A")));
        assert!(cam("8A").compatible(&cam("9A")));
        assert!(cam("8A").compatible(&cam("7A")));
        assert!(cam("12B").compatible(&cam("1B")));
        assert!(cam("8A").compatible(&cam("8B")));
        assert!(!cam("8A").compatible(&cam("9B")));
        assert!(!cam("8A").compatible(&cam("10A")));
    }

    #[test]
    fn strategy_selection() {
        let a = Some(cam("8A"));
        let b = Some(cam("8B"));
        let far = Some(cam("3A"));

        assert_eq!(suggest_strategy(Some(128.0), Some(124.0), a, b), Some(MixStrategy::Loop));
        assert_eq!(suggest_strategy(Some(128.0), Some(124.0), a, far), Some(MixStrategy::Tight));
        assert_eq!(suggest_strategy(Some(128.0), Some(115.0), a, b), Some(MixStrategy::Tight));
        assert_eq!(suggest_strategy(Some(128.0), Some(115.0), a, far), Some(MixStrategy::Loose));
        assert_eq!(suggest_strategy(Some(128.0), Some(100.0), a, b), Some(MixStrategy::Loose));
        assert_eq!(suggest_strategy(Some(128.0), Some(126.0), None, None), Some(MixStrategy::Tight));
        assert_eq!(suggest_strategy(None, Some(126.0), a, b), None);
        assert_eq!(suggest_strategy(Some(f32::NAN), Some(126.0), a, b), None);
    }
}
