//! Player physics tick
//!
//! Gravity, platform landing, termination and coin pickup. Runs every
//! `physics.tick_ms` with the world lock held.

use super::state::{Termination, World};
use crate::consts::*;
use crate::settings::Settings;

/// Player control sent by the game loop, applied by the physics task
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlIntent {
    /// Horizontal displacement in world units
    Move(f32),
    /// Jump request; ignored while airborne
    Jump,
}

/// What happened during one physics tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Player rests on a platform this tick
    pub standing: bool,
    /// Coins collected this tick
    pub coins_collected: u32,
    /// The player fell off the screen this tick
    pub fell: bool,
}

/// Apply one control intent
pub fn apply_intent(world: &mut World, intent: ControlIntent, settings: &Settings) {
    let player = &mut world.player;
    match intent {
        ControlIntent::Move(dx) => {
            let max_x = (SCREEN_WIDTH - player.size.x).max(0.0);
            player.pos.x = (player.pos.x + dx).clamp(0.0, max_x);
        }
        ControlIntent::Jump => {
            if !player.jumping {
                player.jumping = true;
                player.velocity = settings.physics.jump_impulse;
            }
        }
    }
}

/// Advance the player by one physics tick
pub fn physics_tick(world: &mut World, settings: &Settings) -> TickReport {
    let mut report = TickReport::default();
    if world.is_over() {
        return report;
    }

    let gravity = settings.physics.gravity;
    // Pickup below tests against this pre-move rectangle
    let player_rect = world.player.rect();
    let velocity = world.player.velocity;

    // First qualifying platform wins: terrain, then moving, in list order
    let landing = world.platforms().map(|p| p.rect()).find(|r| {
        velocity >= 0.0
            && player_rect.intersects(r)
            && world.player.bottom() <= r.top() + (velocity + gravity)
    });

    let player = &mut world.player;
    match landing {
        Some(platform) => {
            player.jumping = false;
            player.velocity = 0.0;
            player.pos.y = platform.top() - player.size.y;
            report.standing = true;
        }
        None => {
            player.jumping = true;
            player.velocity += gravity;
            player.pos.y += player.velocity;
        }
    }

    match &mut world.termination {
        Termination::FallOff { fallen } => {
            if player.pos.y > SCREEN_HEIGHT {
                *fallen = true;
                report.fell = true;
                log::info!("Player fell off the screen with score {}", world.score);
                return report;
            }
        }
        Termination::Countdown { .. } => {
            let ground = SCREEN_HEIGHT - player.size.y;
            if player.pos.y >= ground {
                player.pos.y = ground;
                player.jumping = false;
                player.velocity = 0.0;
            }
        }
    }

    let coin_size = settings.coins.size;
    let before = world.coins.len();
    world
        .coins
        .retain(|coin| !player_rect.intersects(&coin.rect(coin_size)));
    let collected = (before - world.coins.len()) as u32;
    if collected > 0 {
        world.score += collected * settings.coin_value();
        log::debug!("Collected {collected} coin(s), score {}", world.score);
    }
    report.coins_collected = collected;

    report
}
