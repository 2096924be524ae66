//! Simulated playback progress.
//!
//! Nothing is actually played. A background ticker nudges a percentage
//! forward while the deck is "playing", wrapping at 100.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::trace;

#[derive(Debug, Clone)]
pub struct ProgressSimulator {
    value: f32,
    step: f32,
}

impl ProgressSimulator {
    pub fn new(step: f32) -> Self {
        let step = if step.is_finite() { step.abs() } else { 0.0 };
        Self { value: 0.0, step }
    }

    /// Current position in `[0, 100)`.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Position as a fraction in `[0, 1)`.
    pub fn fraction(&self) -> f32 {
        self.value / 100.0
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }

    pub fn tick(&mut self) {
        let next = (self.value + self.step).rem_euclid(100.0);
        // rem_euclid can round up to exactly 100.0 for tiny negatives.
        self.value = if next.is_finite() && next < 100.0 { next } else { 0.0 };
    }
}

pub type ProgressHandle = Arc<Mutex<ProgressSimulator>>;

/// Ticks a shared simulator on its own thread for as long as it lives.
///
/// Dropping the timer stops and joins the thread, so pausing (or leaving
/// the UI by any path) never leaves a ticker behind.
pub struct ProgressTimer {
    stop: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl ProgressTimer {
    pub fn start(progress: ProgressHandle, interval: Duration) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();

        let join = thread::spawn(move || {
            loop {
                thread::park_timeout(interval);
                if stop_flag.load(Ordering::Acquire) {
                    break;
                }
                if let Ok(mut p) = progress.lock() {
                    p.tick();
                    trace!(progress = p.value(), "progress tick");
                }
            }
        });

        Self {
            stop,
            join: Some(join),
        }
    }
}

impl Drop for ProgressTimer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(h) = self.join.take() {
            h.thread().unpark();
            let _ = h.join();
        }
    }
}
