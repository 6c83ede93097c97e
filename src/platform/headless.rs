//! Scripted frontend
//!
//! Replays a fixed list of inputs and records what would have been drawn.
//! Used for tests and for driving the game without a terminal.

use std::collections::VecDeque;
use std::thread;
use std::time::Duration;

use super::{FrameInput, Frontend, KeyState};
use crate::settings::Settings;
use crate::sim::World;

#[derive(Debug, Default)]
pub struct ScriptedFrontend {
    script: VecDeque<FrameInput>,
    /// Real time spent per frame
    frame_delay: Duration,
    /// Every world presented, in order
    pub frames: Vec<World>,
    pub final_message: Option<String>,
    /// Total pause requested (not slept)
    pub paused: Duration,
}

impl ScriptedFrontend {
    /// Play `script`, then request quit
    pub fn new(script: impl IntoIterator<Item = FrameInput>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Self::default()
        }
    }

    /// `frames` frames with no keys held
    pub fn idle(frames: usize) -> Self {
        Self::new(std::iter::repeat_n(FrameInput::keys(KeyState::default()), frames))
    }

    pub fn with_frame_delay(mut self, delay: Duration) -> Self {
        self.frame_delay = delay;
        self
    }
}

impl Frontend for ScriptedFrontend {
    fn poll_input(&mut self) -> anyhow::Result<FrameInput> {
        Ok(self.script.pop_front().unwrap_or_else(FrameInput::quit))
    }

    fn present(&mut self, world: &World, _settings: &Settings) -> anyhow::Result<()> {
        self.frames.push(world.clone());
        Ok(())
    }

    fn show_final_score(&mut self, message: &str) -> anyhow::Result<()> {
        self.final_message = Some(message.to_string());
        Ok(())
    }

    fn wait_frame(&mut self) {
        if !self.frame_delay.is_zero() {
            thread::sleep(self.frame_delay);
        }
    }

    fn pause(&mut self, duration: Duration) {
        self.paused += duration;
    }
}
