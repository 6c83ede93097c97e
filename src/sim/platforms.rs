//! Moving platform generator
//!
//! Keeps a fixed population of horizontally oscillating platforms. New
//! platforms stack upward from the newest one; in scroll mode the oldest
//! platform is recycled once it leaves the bottom of the screen.

use rand::Rng;

use super::state::{Platform, World};
use crate::consts::*;
use crate::settings::PlatformSettings;

/// Append a new moving platform above the newest one
pub fn spawn_platform(world: &mut World, tuning: &PlatformSettings, rng: &mut impl Rng) {
    let reference = world.moving.last().map_or(SCREEN_HEIGHT, Platform::top);
    let gap_max = tuning.gap_max.max(tuning.gap_min);
    let gap = rng.random_range(tuning.gap_min..=gap_max) as f32;
    let y = (reference - gap).max(tuning.min_height);

    let max_x = (SCREEN_WIDTH - tuning.width).max(0.0) as u32;
    let x = rng.random_range(0..=max_x) as f32;
    let direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };

    world
        .moving
        .push(Platform::moving(x, y, tuning.width, tuning.height, direction));
}

/// Shift every moving platform and reflect at the screen edges
///
/// A platform that touches or crosses an edge is placed on it and reverses.
pub fn move_platforms(world: &mut World, tuning: &PlatformSettings) {
    for platform in &mut world.moving {
        let Some(direction) = platform.direction.as_mut() else {
            continue;
        };
        let max_x = (SCREEN_WIDTH - platform.size.x).max(0.0);
        platform.pos.x += *direction * tuning.speed;

        if platform.pos.x <= 0.0 {
            platform.pos.x = 0.0;
            *direction = -*direction;
        } else if platform.pos.x >= max_x {
            platform.pos.x = max_x;
            *direction = -*direction;
        }
    }
}

/// One generator cycle: motion, top-up, and (in scroll mode) recycling
///
/// Returns the number of platforms created.
pub fn generator_tick(
    world: &mut World,
    tuning: &PlatformSettings,
    scrolling: bool,
    rng: &mut impl Rng,
) -> usize {
    move_platforms(world, tuning);

    let mut created = 0;
    if world.moving.len() < tuning.target_count {
        spawn_platform(world, tuning, rng);
        created += 1;
    }

    if scrolling && world.moving.first().is_some_and(|p| p.top() >= SCREEN_HEIGHT) {
        world.moving.remove(0);
        spawn_platform(world, tuning, rng);
        created += 1;
    }

    if created > 0 {
        log::debug!("Spawned {created} platform(s), {} active", world.moving.len());
    }
    created
}
