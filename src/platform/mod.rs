//! Platform abstraction layer
//!
//! Everything the game loop needs from the outside world:
//! - Quit requests and key state
//! - Presenting a frame
//! - Frame pacing and pauses

pub mod headless;
pub mod terminal;

use std::thread;
use std::time::{Duration, Instant};

use crate::settings::Settings;
use crate::sim::World;

pub use headless::ScriptedFrontend;
pub use terminal::TerminalFrontend;

/// Logical keys sampled once per frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

/// Everything read from the platform at the start of a frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameInput {
    /// Window closed or quit key pressed
    pub quit: bool,
    pub keys: KeyState,
}

impl FrameInput {
    pub fn keys(keys: KeyState) -> Self {
        Self { quit: false, keys }
    }

    pub fn quit() -> Self {
        Self {
            quit: true,
            keys: KeyState::default(),
        }
    }
}

/// Window/terminal surface driven by the game loop
pub trait Frontend {
    /// Drain pending events and sample the keys
    fn poll_input(&mut self) -> anyhow::Result<FrameInput>;

    /// Draw one frame of the world plus the score/time overlay
    fn present(&mut self, world: &World, settings: &Settings) -> anyhow::Result<()>;

    /// Replace the playfield with the end-of-run message
    fn show_final_score(&mut self, message: &str) -> anyhow::Result<()>;

    /// Block until the next frame is due
    fn wait_frame(&mut self);

    /// Hold the current screen
    fn pause(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Fixed-rate frame limiter
#[derive(Debug, Clone)]
pub struct FrameClock {
    frame: Duration,
    next: Instant,
}

impl FrameClock {
    pub fn new(fps: u32) -> Self {
        let frame = Duration::from_secs(1) / fps.max(1);
        Self {
            frame,
            next: Instant::now() + frame,
        }
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame
    }

    /// Time left until the next frame is due
    pub fn remaining(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }

    /// Sleep until the next frame; a late frame resets the schedule
    pub fn wait(&mut self) {
        let now = Instant::now();
        let remaining = self.remaining(now);
        if remaining.is_zero() {
            self.next = now + self.frame;
        } else {
            thread::sleep(remaining);
            self.next += self.frame;
        }
    }
}
