//! Mortadella Hop - a coin-collecting platformer
//!
//! Core modules:
//! - `sim`: World state and the per-cycle logic of every background task
//! - `scheduler`: Shared world lock and the periodic simulation threads
//! - `game_loop`: Fixed-rate input/render loop
//! - `platform`: Window/terminal, input and frame timing abstraction
//! - `audio`: Background music
//! - `settings`: Data-driven tuning and variant selection

pub mod audio;
pub mod game_loop;
pub mod platform;
pub mod scheduler;
pub mod settings;
pub mod sim;

pub use game_loop::{GameLoop, GameOutcome};
pub use scheduler::Simulation;
pub use settings::{GameVariant, Settings};

/// Game configuration constants
pub mod consts {
    /// Drawing surface width in world units
    pub const SCREEN_WIDTH: f32 = 800.0;
    /// Drawing surface height in world units
    pub const SCREEN_HEIGHT: f32 = 600.0;
    /// Target presentation rate
    pub const DEFAULT_FPS: u32 = 60;

    /// Ground strip thickness
    pub const GROUND_HEIGHT: f32 = 20.0;
    /// Player spawns this far above the bottom edge
    pub const PLAYER_SPAWN_OFFSET: f32 = 100.0;
}
