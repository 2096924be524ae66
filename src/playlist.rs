//! Playlist state: track records, the current/next queue and file intake.

mod intake;
mod model;
mod queue;
mod seed;

pub use intake::{intake_paths, parse_dropped_text};
pub use model::*;
pub use queue::Playlist;
pub use seed::demo_tracks;
