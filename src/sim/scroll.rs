//! Screen scroll
//!
//! Shifts the whole world down at a constant rate so the player has to keep
//! climbing, and drops anything that has left the bottom of the screen.

use super::state::World;
use crate::consts::*;

/// One scroll cycle; returns the number of entities pruned
pub fn scroll_tick(world: &mut World, speed: f32) -> usize {
    world.player.pos.y += speed;
    for platform in world.terrain.iter_mut().chain(world.moving.iter_mut()) {
        platform.pos.y += speed;
    }
    for coin in &mut world.coins {
        coin.pos.y += speed;
    }

    let before = world.terrain.len() + world.moving.len() + world.coins.len();
    world.terrain.retain(|p| p.top() < SCREEN_HEIGHT);
    world.moving.retain(|p| p.top() < SCREEN_HEIGHT);
    world.coins.retain(|c| c.pos.y < SCREEN_HEIGHT);
    before - (world.terrain.len() + world.moving.len() + world.coins.len())
}
