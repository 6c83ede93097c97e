//! Simulation scheduler
//!
//! Owns the world lock and runs every background task on its own thread:
//!
//! | task      | period                                   | runs when                |
//! |-----------|------------------------------------------|--------------------------|
//! | physics   | `physics.tick_ms`                        | always                   |
//! | platforms | `platforms.tick_ms`                      | moving platform variants |
//! | coins     | `coins.period_ms`                        | always                   |
//! | scroll    | `scroll.tick_ms` after `scroll.delay_ms` | scroll enabled           |
//! | countdown | 1 s                                      | countdown variants       |
//!
//! Each cycle takes the lock once, checks the termination flag and exits
//! the thread when the run is over. The binary drops the join handles, so
//! the threads end with the run or with the process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::settings::{PlatformMode, Settings, TerminationPolicy};
use crate::sim::{
    ControlIntent, TickReport, World, apply_intent, countdown_tick, generator_tick, physics_tick,
    scroll_tick, spawn_coins, task_rng,
};

/// World shared between the background tasks and the game loop
pub type SharedWorld = Arc<Mutex<World>>;

/// Longest uninterrupted sleep, so shutdown requests are noticed promptly
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// RNG stream per consumer, all derived from the run seed
const WORLD_STREAM: u64 = 0;
const PLATFORM_STREAM: u64 = 1;
const COIN_STREAM: u64 = 2;

/// Lock the world, recovering the data if a task panicked while holding it
pub fn lock_world(world: &Mutex<World>) -> MutexGuard<'_, World> {
    world.lock().unwrap_or_else(|poisoned| {
        log::warn!("World lock poisoned, continuing with last state");
        poisoned.into_inner()
    })
}

/// Apply queued control intents, then advance physics by one tick
fn physics_cycle(
    world: &mut World,
    intents: &flume::Receiver<ControlIntent>,
    settings: &Settings,
) -> TickReport {
    for intent in intents.try_iter() {
        apply_intent(world, intent, settings);
    }
    physics_tick(world, settings)
}

/// Timing of one background task
#[derive(Debug, Clone, Copy)]
struct PeriodicTask {
    name: &'static str,
    /// Wait before the first cycle
    delay: Duration,
    period: Duration,
}

/// The running (or runnable) simulation
pub struct Simulation {
    world: SharedWorld,
    settings: Arc<Settings>,
    seed: u64,
    shutdown: Arc<AtomicBool>,
    intents_tx: flume::Sender<ControlIntent>,
    intents_rx: flume::Receiver<ControlIntent>,
}

impl Simulation {
    /// Build the starting world; no threads run until [`Simulation::start`]
    pub fn new(settings: Settings) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        let mut rng = task_rng(seed, WORLD_STREAM);
        let world = World::new(&settings, &mut rng);
        let (intents_tx, intents_rx) = flume::unbounded();

        log::info!("New {} run with seed {seed}", settings.variant.as_str());

        Self {
            world: Arc::new(Mutex::new(world)),
            settings: Arc::new(settings),
            seed,
            shutdown: Arc::new(AtomicBool::new(false)),
            intents_tx,
            intents_rx,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn shared_settings(&self) -> Arc<Settings> {
        Arc::clone(&self.settings)
    }

    /// Handle to the shared world
    pub fn world(&self) -> SharedWorld {
        Arc::clone(&self.world)
    }

    /// Channel the game loop uses to steer the player
    pub fn controls(&self) -> flume::Sender<ControlIntent> {
        self.intents_tx.clone()
    }

    /// Copy of the world taken under the lock
    pub fn snapshot(&self) -> World {
        lock_world(&self.world).clone()
    }

    pub fn is_over(&self) -> bool {
        lock_world(&self.world).is_over()
    }

    /// Run one physics cycle on the calling thread
    pub fn step_physics(&self) -> TickReport {
        let mut world = lock_world(&self.world);
        physics_cycle(&mut world, &self.intents_rx, &self.settings)
    }

    /// Ask every task to stop at its next wake-up
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Spawn every background task for the configured variant
    ///
    /// The handles may be dropped; tasks stop on their own once the run is
    /// over or [`Simulation::shutdown`] is called.
    pub fn start(&self) -> anyhow::Result<Vec<JoinHandle<()>>> {
        let settings = &self.settings;
        let mut handles = Vec::new();

        {
            let intents = self.intents_rx.clone();
            let task_settings = Arc::clone(settings);
            handles.push(self.spawn_periodic(
                PeriodicTask {
                    name: "physics",
                    delay: Duration::ZERO,
                    period: settings.physics_period(),
                },
                move |world| {
                    physics_cycle(world, &intents, &task_settings);
                },
            )?);
        }

        if settings.platform_mode() == PlatformMode::Moving {
            let mut rng = task_rng(self.seed, PLATFORM_STREAM);
            let task_settings = Arc::clone(settings);
            let scrolling = settings.scroll_enabled();
            handles.push(self.spawn_periodic(
                PeriodicTask {
                    name: "platforms",
                    delay: Duration::ZERO,
                    period: settings.platform_period(),
                },
                move |world| {
                    generator_tick(world, &task_settings.platforms, scrolling, &mut rng);
                },
            )?);
        }

        {
            let mut rng = task_rng(self.seed, COIN_STREAM);
            let task_settings = Arc::clone(settings);
            let mode = settings.platform_mode();
            handles.push(self.spawn_periodic(
                PeriodicTask {
                    name: "coins",
                    delay: Duration::ZERO,
                    period: settings.coin_period(),
                },
                move |world| {
                    spawn_coins(world, &task_settings.coins, mode, &mut rng);
                },
            )?);
        }

        if settings.scroll_enabled() {
            let speed = settings.scroll.speed;
            handles.push(self.spawn_periodic(
                PeriodicTask {
                    name: "scroll",
                    delay: settings.scroll_delay(),
                    period: settings.scroll_period(),
                },
                move |world| {
                    scroll_tick(world, speed);
                },
            )?);
        }

        if settings.termination() == TerminationPolicy::Countdown {
            handles.push(self.spawn_periodic(
                PeriodicTask {
                    name: "countdown",
                    delay: Duration::from_secs(1),
                    period: Duration::from_secs(1),
                },
                |world| {
                    countdown_tick(world);
                },
            )?);
        }

        log::info!("Started {} simulation tasks", handles.len());
        Ok(handles)
    }

    fn spawn_periodic<F>(&self, task: PeriodicTask, mut cycle: F) -> anyhow::Result<JoinHandle<()>>
    where
        F: FnMut(&mut World) + Send + 'static,
    {
        let world = Arc::clone(&self.world);
        let shutdown = Arc::clone(&self.shutdown);

        let handle = thread::Builder::new()
            .name(task.name.to_string())
            .spawn(move || {
                log::debug!("{} task started", task.name);
                let mut alive = idle(task.delay, &shutdown);
                while alive {
                    {
                        let mut world = lock_world(&world);
                        if world.is_over() {
                            break;
                        }
                        cycle(&mut world);
                    }
                    alive = idle(task.period, &shutdown);
                }
                log::debug!("{} task stopped", task.name);
            })?;
        Ok(handle)
    }
}

/// Sleep for `duration` in slices; false if shutdown was requested
fn idle(duration: Duration, shutdown: &AtomicBool) -> bool {
    let deadline = Instant::now() + duration;
    loop {
        if shutdown.load(Ordering::Relaxed) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep((deadline - now).min(SLEEP_SLICE));
    }
}
