//! Simulation module
//!
//! All gameplay logic lives here, one function per background task cycle.
//! Every function takes `&mut World` and expects the caller to hold the
//! world lock:
//! - No sleeping or locking inside
//! - Seeded RNG passed in by the caller
//! - No rendering or platform dependencies

pub mod coins;
pub mod collision;
pub mod countdown;
pub mod physics;
pub mod platforms;
pub mod scroll;
pub mod state;

pub use coins::spawn_coins;
pub use collision::Rect;
pub use countdown::countdown_tick;
pub use physics::{ControlIntent, TickReport, apply_intent, physics_tick};
pub use platforms::{generator_tick, move_platforms, spawn_platform};
pub use scroll::scroll_tick;
pub use state::{Coin, Platform, Player, Termination, World, task_rng};
