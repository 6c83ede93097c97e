//! Mortadella Hop entry point
//!
//! Loads settings, starts the music and the simulation threads, then runs
//! the game loop in the terminal until the run ends or the player quits.

use mortadella_hop::audio::AudioManager;
use mortadella_hop::platform::TerminalFrontend;
use mortadella_hop::{GameLoop, GameOutcome, GameVariant, Settings, Simulation};

/// Overrides the variant from the settings file
const VARIANT_ENV: &str = "HOP_VARIANT";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut settings = Settings::load(&Settings::default_path());
    if let Ok(name) = std::env::var(VARIANT_ENV) {
        match GameVariant::from_str(&name) {
            Some(variant) => settings.variant = variant,
            None => log::warn!("Unknown {VARIANT_ENV}={name}, keeping {}", settings.variant.as_str()),
        }
    }
    log::info!("Mortadella Hop starting ({})", settings.variant.as_str());

    let audio = AudioManager::new(settings.music_volume);
    if let Some(track) = &settings.music {
        audio.play_background_loop(track)?;
    }

    let simulation = Simulation::new(settings);
    let mut frontend = TerminalFrontend::new(simulation.settings().fps)?;
    // Detached: the threads end with the run or with the process
    simulation.start()?;

    let outcome = GameLoop::new(&simulation).run(&mut frontend);
    drop(frontend);
    log::info!("Replay this run with \"seed\": {}", simulation.seed());

    match outcome? {
        GameOutcome::Finished { score } => {
            println!("{}", simulation.settings().variant.final_message(score));
        }
        GameOutcome::Quit { score } => {
            println!("Quit with score {score}");
        }
    }
    Ok(())
}
