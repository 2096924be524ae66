//! File intake: turn dropped or passed paths into pending playlist entries.
//!
//! Only the file name is checked. Content is never opened here; a later
//! analysis step (or the energy analyser) deals with unreadable files.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::config::IntakeSettings;

use super::model::Track;

/// Result of one intake batch.
#[derive(Debug, Default)]
pub struct IntakeOutcome {
    pub accepted: Vec<Track>,
    pub rejected: usize,
}

impl IntakeOutcome {
    pub fn summary(&self) -> String {
        match (self.accepted.len(), self.rejected) {
            (0, 0) => "nothing to add".to_string(),
            (a, 0) => format!("added {a} track(s)"),
            (a, r) => format!("added {a} track(s), skipped {r} file(s)"),
        }
    }
}

fn normalized_extensions(settings: &IntakeSettings) -> Vec<String> {
    settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .map(|e| format!(".{e}"))
        .collect()
}

fn has_accepted_suffix(path: &Path, suffixes: &[String]) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| {
            let name = name.to_ascii_lowercase();
            suffixes.iter().any(|s| name.ends_with(s.as_str()))
        })
        .unwrap_or(false)
}

/// Filter `paths` down to accepted audio files and build a pending
/// [`Track`] for each. Directories are expanded in sorted order.
pub fn intake_paths<I>(paths: I, settings: &IntakeSettings) -> IntakeOutcome
where
    I: IntoIterator<Item = PathBuf>,
{
    let suffixes = normalized_extensions(settings);
    let mut outcome = IntakeOutcome::default();

    for path in paths {
        if path.is_dir() {
            let mut walker = WalkDir::new(&path).sort_by_file_name();
            if !settings.recursive {
                walker = walker.max_depth(1);
            }
            for entry in walker.into_iter().filter_map(Result::ok) {
                if !entry.file_type().is_file() {
                    continue;
                }
                accept_or_reject(entry.into_path(), &suffixes, &mut outcome);
            }
        } else {
            accept_or_reject(path, &suffixes, &mut outcome);
        }
    }

    outcome
}

fn accept_or_reject(path: PathBuf, suffixes: &[String], outcome: &mut IntakeOutcome) {
    if has_accepted_suffix(&path, suffixes) {
        outcome.accepted.push(Track::pending(path));
    } else {
        debug!(path = %path.display(), "intake skipped file");
        outcome.rejected += 1;
    }
}

/// Split text pasted into the terminal (file drops arrive this way) into
/// paths. Handles quoting, backslash escapes and `file://` URIs.
pub fn parse_dropped_text(text: &str) -> Vec<PathBuf> {
    split_shell_words(text)
        .into_iter()
        .map(|word| match word.strip_prefix("file://") {
            Some(rest) => percent_decode(rest),
            None => word,
        })
        .filter(|w| !w.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn split_shell_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut cur = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') => {
                if let Some(n) = chars.next() {
                    cur.push(n);
                }
            }
            (Some(_), c) => cur.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_word = true;
            }
            (None, '\\') => {
                if let Some(n) = chars.next() {
                    cur.push(n);
                    in_word = true;
                }
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut cur));
                    in_word = false;
                }
            }
            (None, c) => {
                cur.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(cur);
    }
    words
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(b) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
