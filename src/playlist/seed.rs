//! Demo tracks shown before anything has been dropped in. Their metadata
//! stands in for what an analysis backend would report.

use crate::harmony::Camelot;

use super::model::{SectionMap, Track, next_track_id};

fn sections(spans: &[(&str, f32, f32)]) -> SectionMap {
    spans
        .iter()
        .map(|(name, start, end)| (name.to_string(), [*start, *end]))
        .collect()
}

fn demo(
    filename: &str,
    title: &str,
    artist: &str,
    bpm: f32,
    key: &str,
    spans: &[(&str, f32, f32)],
) -> Track {
    Track {
        id: next_track_id(),
        filename: filename.to_string(),
        title: title.to_string(),
        artist: artist.to_string(),
        bpm: Some(bpm),
        key: Some(key.to_string()),
        camelot: Camelot::from_key_label(key),
        sections: Some(sections(spans)),
        path: None,
    }
}

pub fn demo_tracks() -> Vec<Track> {
    vec![
        demo(
            "night_drive.wav",
            "Night Drive",
            "Demo Artist",
            128.0,
            "A minor",
            &[
                ("intro", 0.0, 15.0),
                ("verse", 15.0, 45.0),
                ("chorus", 45.0, 75.0),
                ("outro", 75.0, 95.0),
            ],
        ),
        demo(
            "sunrise.wav",
            "Sunrise",
            "Demo Artist",
            124.0,
            "C major",
            &[
                ("intro", 0.0, 16.0),
                ("verse", 16.0, 48.0),
                ("chorus", 48.0, 80.0),
                ("outro", 80.0, 100.0),
            ],
        ),
    ]
}
