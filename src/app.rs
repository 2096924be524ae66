//! Application module: exposes the deck model driven by the TUI runtime.
//!
//! The `App` model lives in `app::model` and holds the playlist, the
//! list cursor, playback state and the per-frame animation state.

mod model;

pub use model::*;
