//! Ordered, append-only playlist with clamped current/next positions.

use super::model::Track;

#[derive(Debug, Default)]
pub struct Playlist {
    tracks: Vec<Track>,
    current: usize,
    next: usize,
}

impl Playlist {
    pub fn new(tracks: Vec<Track>) -> Self {
        let mut playlist = Self {
            tracks,
            current: 0,
            next: 0,
        };
        playlist.select(0);
        playlist
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Track> {
        self.tracks.get(idx)
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn next(&self) -> usize {
        self.next
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.tracks.get(self.current)
    }

    pub fn next_track(&self) -> Option<&Track> {
        self.tracks.get(self.next)
    }

    fn clamp(&self, idx: usize) -> usize {
        idx.min(self.tracks.len().saturating_sub(1))
    }

    /// Jump to `idx` (clamped) and point `next` at the following track.
    pub fn select(&mut self, idx: usize) {
        self.current = self.clamp(idx);
        self.next = self.clamp(self.current.saturating_add(1));
    }

    /// Move to the queued next track. Stays put on the last one.
    pub fn advance(&mut self) {
        self.select(self.next);
    }

    /// Append records to the end. Positions are refreshed so that `next`
    /// picks up a newly available follower.
    pub fn extend(&mut self, tracks: impl IntoIterator<Item = Track>) {
        self.tracks.extend(tracks);
        self.select(self.current);
    }
}
