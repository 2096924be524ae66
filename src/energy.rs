//! Energy driver: a smoothed 0..1 "how hard is the bass hitting" value,
//! recomputed once per frame for the visuals.
//!
//! The driver runs in one of two modes, picked when a track is attached:
//! live spectrum analysis of the track's audio, or a synthetic pulse at the
//! track's tempo when no analysis is possible.

mod analyser;
mod driver;

pub use driver::{Capability, EnergyDriver, FrameInput};

#[cfg(test)]
mod tests;
