//! Coin spawner
//!
//! Two placement strategies, chosen by platform mode:
//! - moving platforms: top up to the target, each coin hovering over a
//!   randomly chosen platform
//! - static terrain: once the field is cleared, scatter a full batch anywhere
//!   that does not overlap terrain
//!
//! Both reject candidates outside the jump window of every platform and give
//! up on a coin after `max_attempts` candidates.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::collision::Rect;
use super::state::{Coin, Platform, World};
use crate::consts::*;
use crate::settings::{CoinSettings, PlatformMode};

/// Candidate lies strictly within the jump window of some platform
fn reachable(y: f32, platforms: &[Platform], max_jump_height: f32) -> bool {
    platforms
        .iter()
        .any(|p| p.top() - max_jump_height < y && y < p.top() + max_jump_height)
}

/// Candidate above a random platform
fn candidate_over_platform(platforms: &[Platform], tuning: &CoinSettings, rng: &mut impl Rng) -> Option<Vec2> {
    let platform = platforms.choose(rng)?;
    let lo = platform.pos.x;
    let hi = (platform.pos.x + platform.size.x - tuning.size).max(lo);
    let x = rng.random_range(lo..=hi);
    let y = platform.top() - tuning.size - tuning.margin_above;
    Some(Vec2::new(x, y))
}

/// Candidate anywhere in the spawn band that stays clear of terrain
fn candidate_in_field(terrain: &[Platform], tuning: &CoinSettings, rng: &mut impl Rng) -> Option<Vec2> {
    let max_x = (SCREEN_WIDTH - tuning.size).max(0.0) as u32;
    let max_y = (SCREEN_HEIGHT - tuning.spawn_band_bottom).max(0.0) as u32;
    let pos = Vec2::new(
        rng.random_range(0..=max_x) as f32,
        rng.random_range(0..=max_y) as f32,
    );
    let rect = Rect::new(pos, Vec2::splat(tuning.size));
    if terrain.iter().any(|p| rect.intersects(&p.rect())) {
        return None;
    }
    Some(pos)
}

/// Draw candidates until one is reachable or attempts run out
fn place_coin(
    platforms: &[Platform],
    tuning: &CoinSettings,
    mode: PlatformMode,
    rng: &mut impl Rng,
) -> Option<Coin> {
    for _ in 0..tuning.max_attempts {
        let candidate = match mode {
            PlatformMode::Moving => candidate_over_platform(platforms, tuning, rng),
            PlatformMode::Static => candidate_in_field(platforms, tuning, rng),
        };
        if let Some(pos) = candidate {
            if reachable(pos.y, platforms, tuning.max_jump_height) {
                return Some(Coin { pos });
            }
        }
    }
    None
}

/// One spawner cycle; returns the number of coins placed
///
/// Does nothing while the source platform list is empty.
pub fn spawn_coins(
    world: &mut World,
    tuning: &CoinSettings,
    mode: PlatformMode,
    rng: &mut impl Rng,
) -> usize {
    let (source, wanted) = match mode {
        PlatformMode::Moving => (
            &world.moving,
            tuning.target_count.saturating_sub(world.coins.len()),
        ),
        PlatformMode::Static if world.coins.is_empty() => (&world.terrain, tuning.target_count),
        PlatformMode::Static => return 0,
    };
    if source.is_empty() || wanted == 0 {
        return 0;
    }

    let mut placed = Vec::with_capacity(wanted);
    for _ in 0..wanted {
        match place_coin(source, tuning, mode, rng) {
            Some(coin) => placed.push(coin),
            None => log::warn!(
                "Gave up placing a coin after {} attempts",
                tuning.max_attempts
            ),
        }
    }

    let count = placed.len();
    world.coins.extend(placed);
    if count > 0 {
        log::debug!("Spawned {count} coin(s), {} on screen", world.coins.len());
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Termination, task_rng};
    use proptest::prelude::*;

    fn world() -> World {
        World::empty(Vec2::splat(50.0), Termination::FallOff { fallen: false })
    }

    #[test]
    fn test_no_platforms_no_coins() {
        let tuning = CoinSettings::default();
        let mut world = world();
        let mut rng = task_rng(1, 2);
        assert_eq!(spawn_coins(&mut world, &tuning, PlatformMode::Moving, &mut rng), 0);
        assert_eq!(spawn_coins(&mut world, &tuning, PlatformMode::Static, &mut rng), 0);
        assert!(world.coins.is_empty());
    }

    #[test]
    fn test_moving_coins_hover_over_platforms() {
        let tuning = CoinSettings::default();
        let mut world = world();
        world.moving.push(Platform::moving(100.0, 400.0, 100.0, 20.0, 1.0));
        world.moving.push(Platform::moving(500.0, 300.0, 100.0, 20.0, -1.0));
        let mut rng = task_rng(1, 2);

        assert_eq!(spawn_coins(&mut world, &tuning, PlatformMode::Moving, &mut rng), 5);
        for coin in &world.coins {
            let over = world.moving.iter().any(|p| {
                coin.pos.y == p.top() - 50.0
                    && coin.pos.x >= p.pos.x
                    && coin.pos.x <= p.pos.x + p.size.x - 20.0
            });
            assert!(over, "coin {:?} not above a platform", coin.pos);
        }
    }

    #[test]
    fn test_moving_tops_up_to_target() {
        let tuning = CoinSettings::default();
        let mut world = world();
        world.moving.push(Platform::moving(100.0, 400.0, 100.0, 20.0, 1.0));
        world.coins.push(Coin::new(0.0, 0.0));
        world.coins.push(Coin::new(0.0, 0.0));
        let mut rng = task_rng(1, 2);

        assert_eq!(spawn_coins(&mut world, &tuning, PlatformMode::Moving, &mut rng), 3);
        assert_eq!(world.coins.len(), 5);
        assert_eq!(spawn_coins(&mut world, &tuning, PlatformMode::Moving, &mut rng), 0);
    }

    #[test]
    fn test_static_batch_only_when_cleared() {
        let tuning = CoinSettings::default();
        let mut world = world();
        world.terrain.push(Platform::terrain(0.0, 580.0, 800.0, 20.0));
        world.terrain.push(Platform::terrain(150.0, 500.0, 100.0, 20.0));
        let mut rng = task_rng(5, 2);

        let placed = spawn_coins(&mut world, &tuning, PlatformMode::Static, &mut rng);
        assert_eq!(placed, 5);
        for coin in &world.coins {
            let rect = coin.rect(tuning.size);
            assert!(world.terrain.iter().all(|p| !rect.intersects(&p.rect())));
            assert!(coin.pos.y <= 480.0);
            assert!(reachable(coin.pos.y, &world.terrain, 150.0));
        }

        world.coins.pop();
        assert_eq!(spawn_coins(&mut world, &tuning, PlatformMode::Static, &mut rng), 0);
        assert_eq!(world.coins.len(), 4);
    }

    #[test]
    fn test_unreachable_field_gives_up() {
        let tuning = CoinSettings {
            max_attempts: 8,
            ..CoinSettings::default()
        };
        let mut world = world();
        // Terrain far below the spawn band: nothing is ever reachable
        world.terrain.push(Platform::terrain(0.0, 5000.0, 800.0, 20.0));
        let mut rng = task_rng(5, 2);

        assert_eq!(spawn_coins(&mut world, &tuning, PlatformMode::Static, &mut rng), 0);
        assert!(world.coins.is_empty());
    }

    #[test]
    fn test_reachable_window_is_strict() {
        let platforms = vec![Platform::terrain(0.0, 400.0, 100.0, 20.0)];
        assert!(reachable(300.0, &platforms, 150.0));
        assert!(!reachable(250.0, &platforms, 150.0));
        assert!(!reachable(550.0, &platforms, 150.0));
    }

    proptest! {
        #[test]
        fn prop_never_exceeds_target(seed in any::<u64>(), existing in 0usize..8, platforms in 0usize..6) {
            let tuning = CoinSettings::default();
            let mut world = world();
            for i in 0..platforms {
                world.moving.push(Platform::moving(i as f32 * 120.0, 500.0 - i as f32 * 60.0, 100.0, 20.0, 1.0));
            }
            for _ in 0..existing {
                world.coins.push(Coin::new(0.0, 0.0));
            }
            let mut rng = task_rng(seed, 2);

            spawn_coins(&mut world, &tuning, PlatformMode::Moving, &mut rng);
            prop_assert!(world.coins.len() <= tuning.target_count.max(existing));
            if platforms == 0 {
                prop_assert_eq!(world.coins.len(), existing);
            }
        }
    }
}
