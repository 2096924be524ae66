use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::harmony::Camelot;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(pub u64);

/// Hand out a process-wide unique track id.
pub fn next_track_id() -> TrackId {
    TrackId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Section name -> `[start, end]` in seconds.
pub type SectionMap = BTreeMap<String, [f32; 2]>;

/// One playlist entry. Metadata stays `None` until a backend fills it in.
#[derive(Clone, Debug)]
pub struct Track {
    pub id: TrackId,
    pub filename: String,
    pub title: String,
    pub artist: String,
    pub bpm: Option<f32>,
    pub key: Option<String>,
    pub camelot: Option<Camelot>,
    pub sections: Option<SectionMap>,
    /// Source file on disk; demo tracks have none.
    pub path: Option<PathBuf>,
}

impl Track {
    /// A fresh record for a file that has not been analysed yet.
    pub fn pending(path: PathBuf) -> Self {
        let filename = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&filename)
            .to_string();

        Self {
            id: next_track_id(),
            filename,
            title,
            artist: "Unknown artist".to_string(),
            bpm: None,
            key: None,
            camelot: None,
            sections: None,
            path: Some(path),
        }
    }

    /// `"Artist - Title"` for list rows.
    pub fn display(&self) -> String {
        let artist = self.artist.trim();
        if artist.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", artist, self.title)
        }
    }

    /// Sections ordered by start time.
    pub fn sections_by_start(&self) -> Vec<(&str, [f32; 2])> {
        let mut out: Vec<(&str, [f32; 2])> = self
            .sections
            .iter()
            .flat_map(|m| m.iter().map(|(k, v)| (k.as_str(), *v)))
            .collect();
        out.sort_by(|a, b| a.1[0].total_cmp(&b.1[0]));
        out
    }
}
