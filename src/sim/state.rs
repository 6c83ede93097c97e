//! World state and core simulation types
//!
//! Plain data shared by every simulation task. Nothing here takes the lock;
//! callers hold it and keep the invariants.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::platforms;
use crate::consts::*;
use crate::settings::{PlatformMode, Settings, TerminationPolicy};

/// The player sprite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Vertical velocity, positive is down
    pub velocity: f32,
    /// Airborne; a jump is only accepted while false
    pub jumping: bool,
}

impl Player {
    /// Centered horizontally near the bottom of the screen, airborne
    pub fn new(size: Vec2) -> Self {
        Self {
            pos: Vec2::new(SCREEN_WIDTH / 2.0, SCREEN_HEIGHT - PLAYER_SPAWN_OFFSET),
            size,
            velocity: 0.0,
            jumping: true,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }
}

/// A platform rectangle
///
/// Width and height never change after creation. Terrain has no direction;
/// moving platforms carry `Some(±1.0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub pos: Vec2,
    pub size: Vec2,
    pub direction: Option<f32>,
}

impl Platform {
    pub fn terrain(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
            direction: None,
        }
    }

    pub fn moving(x: f32, y: f32, w: f32, h: f32, direction: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
            direction: Some(direction),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }
}

/// A coin; all coins share the size from settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub pos: Vec2,
}

impl Coin {
    pub fn new(x: f32, y: f32) -> Self {
        Self { pos: Vec2::new(x, y) }
    }

    pub fn rect(&self, size: f32) -> Rect {
        Rect::new(self.pos, Vec2::splat(size))
    }
}

/// How (and whether) the run has ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Seconds left; the run is over at zero
    Countdown { remaining: u32 },
    /// Latched once the player drops below the screen
    FallOff { fallen: bool },
}

impl Termination {
    pub fn is_over(&self) -> bool {
        match *self {
            Termination::Countdown { remaining } => remaining == 0,
            Termination::FallOff { fallen } => fallen,
        }
    }
}

/// Complete shared world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub player: Player,
    /// Fixed platforms, ground first
    pub terrain: Vec<Platform>,
    /// Spawned platforms, oldest first
    pub moving: Vec<Platform>,
    pub coins: Vec<Coin>,
    pub score: u32,
    pub termination: Termination,
}

impl World {
    /// Create the starting world for the configured variant
    ///
    /// Moving-platform variants get their initial population from `rng`.
    pub fn new(settings: &Settings, rng: &mut impl Rng) -> Self {
        let terrain = settings
            .variant
            .initial_terrain()
            .into_iter()
            .map(|[x, y, w, h]| Platform::terrain(x, y, w, h))
            .collect();

        let termination = match settings.termination() {
            TerminationPolicy::Countdown => Termination::Countdown {
                remaining: settings.countdown_secs,
            },
            TerminationPolicy::FallOff => Termination::FallOff { fallen: false },
        };

        let mut world = Self {
            player: Player::new(settings.physics.player_size),
            terrain,
            moving: Vec::new(),
            coins: Vec::new(),
            score: 0,
            termination,
        };

        if settings.platform_mode() == PlatformMode::Moving {
            for _ in 0..settings.platforms.target_count {
                platforms::spawn_platform(&mut world, &settings.platforms, rng);
            }
        }

        world
    }

    /// An empty world with the given termination state (for tests and tools)
    pub fn empty(player_size: Vec2, termination: Termination) -> Self {
        Self {
            player: Player::new(player_size),
            terrain: Vec::new(),
            moving: Vec::new(),
            coins: Vec::new(),
            score: 0,
            termination,
        }
    }

    pub fn is_over(&self) -> bool {
        self.termination.is_over()
    }

    /// Every platform in collision order: terrain first, then moving
    pub fn platforms(&self) -> impl Iterator<Item = &Platform> {
        self.terrain.iter().chain(self.moving.iter())
    }

    /// Seconds left on the clock, if this run has one
    pub fn countdown(&self) -> Option<u32> {
        match self.termination {
            Termination::Countdown { remaining } => Some(remaining),
            Termination::FallOff { .. } => None,
        }
    }
}

/// Independent RNG stream per simulation task
pub fn task_rng(seed: u64, stream: u64) -> Pcg32 {
    Pcg32::new(seed, stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GameVariant;

    #[test]
    fn test_new_endless_world() {
        let settings = Settings::for_variant(GameVariant::Endless);
        let mut rng = task_rng(7, 0);
        let world = World::new(&settings, &mut rng);

        assert_eq!(world.player.pos, Vec2::new(400.0, 500.0));
        assert!(world.player.jumping);
        assert_eq!(world.terrain.len(), 1);
        assert_eq!(world.moving.len(), 8);
        assert!(world.coins.is_empty());
        assert_eq!(world.score, 0);
        assert!(!world.is_over());
        assert_eq!(world.countdown(), None);
    }

    #[test]
    fn test_new_time_attack_world() {
        let settings = Settings::for_variant(GameVariant::TimeAttack);
        let mut rng = task_rng(7, 0);
        let world = World::new(&settings, &mut rng);

        assert_eq!(world.terrain.len(), 5);
        assert!(world.moving.is_empty());
        assert_eq!(world.countdown(), Some(33));
        assert!(world.terrain.iter().all(|p| p.direction.is_none()));
    }

    #[test]
    fn test_termination() {
        assert!(!Termination::Countdown { remaining: 1 }.is_over());
        assert!(Termination::Countdown { remaining: 0 }.is_over());
        assert!(!Termination::FallOff { fallen: false }.is_over());
        assert!(Termination::FallOff { fallen: true }.is_over());
    }

    #[test]
    fn test_platform_order_terrain_first() {
        let mut world = World::empty(Vec2::splat(50.0), Termination::FallOff { fallen: false });
        world.moving.push(Platform::moving(0.0, 100.0, 100.0, 20.0, 1.0));
        world.terrain.push(Platform::terrain(0.0, 580.0, 800.0, 20.0));

        let tops: Vec<f32> = world.platforms().map(Platform::top).collect();
        assert_eq!(tops, vec![580.0, 100.0]);
    }
}
