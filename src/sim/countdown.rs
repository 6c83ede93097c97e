//! Time-attack clock

use super::state::{Termination, World};

/// Take one second off the clock; returns true when this tick ended the run
pub fn countdown_tick(world: &mut World) -> bool {
    match &mut world.termination {
        Termination::Countdown { remaining } if *remaining > 0 => {
            *remaining -= 1;
            if *remaining == 0 {
                log::info!("Time is up with score {}", world.score);
                return true;
            }
            false
        }
        _ => false,
    }
}
