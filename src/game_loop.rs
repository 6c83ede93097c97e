//! Fixed-rate game loop
//!
//! Reads input, steers the player through the control channel, snapshots
//! the world under the lock and hands the copy to the frontend. The lock is
//! held only for the copy, never while drawing.

use std::sync::Arc;

use crate::platform::{FrameInput, Frontend};
use crate::scheduler::{SharedWorld, Simulation, lock_world};
use crate::settings::Settings;
use crate::sim::{ControlIntent, World};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    /// The player closed the game
    Quit { score: u32 },
    /// The run reached its end condition
    Finished { score: u32 },
}

impl GameOutcome {
    pub fn score(&self) -> u32 {
        match *self {
            GameOutcome::Quit { score } | GameOutcome::Finished { score } => score,
        }
    }
}

pub struct GameLoop {
    world: SharedWorld,
    settings: Arc<Settings>,
    controls: flume::Sender<ControlIntent>,
    /// Jump key state last frame, for edge detection
    jump_held: bool,
}

impl GameLoop {
    pub fn new(simulation: &Simulation) -> Self {
        Self {
            world: simulation.world(),
            settings: simulation.shared_settings(),
            controls: simulation.controls(),
            jump_held: false,
        }
    }

    fn snapshot(&self) -> World {
        lock_world(&self.world).clone()
    }

    /// Turn held keys into control intents
    fn steer(&mut self, input: &FrameInput, world: &World) {
        let keys = input.keys;
        let direction = keys.right as i8 - keys.left as i8;
        if direction != 0 {
            let dx = f32::from(direction) * self.settings.player_speed();
            let _ = self.controls.send(ControlIntent::Move(dx));
        }

        let jump_pressed = keys.jump && !self.jump_held;
        self.jump_held = keys.jump;
        if jump_pressed && !world.player.jumping {
            let _ = self.controls.send(ControlIntent::Jump);
        }
    }

    /// Run one frame; `Some` once the game should exit
    pub fn frame(&mut self, frontend: &mut impl Frontend) -> anyhow::Result<Option<GameOutcome>> {
        let input = frontend.poll_input()?;
        let world = self.snapshot();

        if input.quit {
            log::info!("Quit requested with score {}", world.score);
            return Ok(Some(GameOutcome::Quit { score: world.score }));
        }

        if world.is_over() {
            let variant = self.settings.variant;
            log::info!("Run finished with score {}", world.score);
            frontend.show_final_score(&variant.final_message(world.score))?;
            frontend.pause(variant.final_screen_pause());
            return Ok(Some(GameOutcome::Finished { score: world.score }));
        }

        self.steer(&input, &world);
        frontend.present(&world, &self.settings)?;
        frontend.wait_frame();
        Ok(None)
    }

    /// Run frames until the player quits or the run ends
    pub fn run(&mut self, frontend: &mut impl Frontend) -> anyhow::Result<GameOutcome> {
        loop {
            if let Some(outcome) = self.frame(frontend)? {
                return Ok(outcome);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{KeyState, ScriptedFrontend};
    use crate::settings::GameVariant;
    use crate::sim::Termination;
    use glam::Vec2;

    fn simulation(variant: GameVariant) -> Simulation {
        Simulation::new(Settings {
            seed: Some(9),
            ..Settings::for_variant(variant)
        })
    }

    fn ground_player(sim: &Simulation) {
        let world = sim.world();
        let mut world = lock_world(&world);
        world.player.pos = Vec2::new(400.0, 550.0);
        world.player.jumping = false;
        world.player.velocity = 0.0;
    }

    fn jump() -> FrameInput {
        FrameInput::keys(KeyState {
            jump: true,
            ..KeyState::default()
        })
    }

    #[test]
    fn test_held_jump_sends_one_intent() {
        let sim = simulation(GameVariant::TimeAttack);
        ground_player(&sim);
        let mut game = GameLoop::new(&sim);
        let mut frontend = ScriptedFrontend::new([jump(), jump(), jump()]);

        assert_eq!(game.run(&mut frontend).unwrap(), GameOutcome::Quit { score: 0 });
        assert_eq!(frontend.frames.len(), 3);

        sim.step_physics();
        let world = sim.snapshot();
        assert!(world.player.jumping);
        assert_eq!(world.player.velocity, -10.0 + 0.5);

        // A second press lands only after the player is grounded again
        ground_player(&sim);
        let mut frontend = ScriptedFrontend::new([
            FrameInput::keys(KeyState::default()),
            jump(),
        ]);
        game.run(&mut frontend).unwrap();
        sim.step_physics();
        assert_eq!(sim.snapshot().player.velocity, -10.0 + 0.5);
    }

    #[test]
    fn test_no_jump_while_airborne() {
        let sim = simulation(GameVariant::TimeAttack);
        {
            let world = sim.world();
            let mut world = lock_world(&world);
            world.player.pos = Vec2::new(400.0, 300.0);
            world.player.jumping = true;
            world.player.velocity = 2.0;
        }
        let mut game = GameLoop::new(&sim);
        game.run(&mut ScriptedFrontend::new([jump()])).unwrap();

        sim.step_physics();
        assert_eq!(sim.snapshot().player.velocity, 2.5);
    }

    #[test]
    fn test_horizontal_movement() {
        let sim = simulation(GameVariant::TimeAttack);
        let mut game = GameLoop::new(&sim);
        let right = FrameInput::keys(KeyState {
            right: true,
            ..KeyState::default()
        });
        let both = FrameInput::keys(KeyState {
            left: true,
            right: true,
            jump: false,
        });
        game.run(&mut ScriptedFrontend::new([right, right, both])).unwrap();

        sim.step_physics();
        assert_eq!(sim.snapshot().player.pos.x, 410.0);
    }

    #[test]
    fn test_finished_run_shows_final_score() {
        let sim = simulation(GameVariant::Endless);
        {
            let world = sim.world();
            let mut world = lock_world(&world);
            world.score = 7;
            world.termination = Termination::FallOff { fallen: true };
        }
        let mut game = GameLoop::new(&sim);
        let mut frontend = ScriptedFrontend::idle(10);

        let outcome = game.run(&mut frontend).unwrap();
        assert_eq!(outcome, GameOutcome::Finished { score: 7 });
        assert!(frontend.frames.is_empty());
        assert_eq!(
            frontend.final_message.as_deref(),
            Some("You fell and collected 7 mortadellas")
        );
        assert_eq!(frontend.paused, GameVariant::Endless.final_screen_pause());
    }
}
