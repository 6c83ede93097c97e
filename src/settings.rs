//! Game settings and tuning
//!
//! Loaded from a JSON file in the working directory; every field falls back
//! to the defaults below, so a settings file only needs the values it changes.

use std::path::{Path, PathBuf};
use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Which ruleset to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameVariant {
    /// Static ledges, collect as much as possible before the clock runs out
    TimeAttack,
    /// Moving platforms on a scrolling screen, game ends when the player falls
    #[default]
    Endless,
}

/// How a run ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationPolicy {
    /// Countdown reaching zero; the player is clamped to the ground
    Countdown,
    /// Player dropping below the bottom edge
    FallOff,
}

/// How platforms behave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformMode {
    /// Fixed terrain only
    Static,
    /// Procedurally spawned oscillating platforms on top of the terrain
    Moving,
}

impl GameVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameVariant::TimeAttack => "time_attack",
            GameVariant::Endless => "endless",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "time_attack" | "countdown" => Some(GameVariant::TimeAttack),
            "endless" | "fall" => Some(GameVariant::Endless),
            _ => None,
        }
    }

    pub fn termination(&self) -> TerminationPolicy {
        match self {
            GameVariant::TimeAttack => TerminationPolicy::Countdown,
            GameVariant::Endless => TerminationPolicy::FallOff,
        }
    }

    pub fn platform_mode(&self) -> PlatformMode {
        match self {
            GameVariant::TimeAttack => PlatformMode::Static,
            GameVariant::Endless => PlatformMode::Moving,
        }
    }

    /// Points awarded per coin
    pub fn coin_value(&self) -> u32 {
        match self {
            GameVariant::TimeAttack => 10,
            GameVariant::Endless => 1,
        }
    }

    /// Horizontal displacement per frame while a direction key is held
    pub fn player_speed(&self) -> f32 {
        match self {
            GameVariant::TimeAttack => 5.0,
            GameVariant::Endless => 7.6,
        }
    }

    /// How long the final score stays on screen
    pub fn final_screen_pause(&self) -> Duration {
        match self {
            GameVariant::TimeAttack => Duration::from_secs(5),
            GameVariant::Endless => Duration::from_millis(1500),
        }
    }

    pub fn final_message(&self, score: u32) -> String {
        match self {
            GameVariant::TimeAttack => format!("Final Score: {score}"),
            GameVariant::Endless => format!("You fell and collected {score} mortadellas"),
        }
    }

    /// Terrain present at the start of a run, as `[x, y, width, height]`
    pub fn initial_terrain(&self) -> Vec<[f32; 4]> {
        let ground = [0.0, SCREEN_HEIGHT - GROUND_HEIGHT, SCREEN_WIDTH, GROUND_HEIGHT];
        match self {
            GameVariant::TimeAttack => vec![
                ground,
                [150.0, SCREEN_HEIGHT - 100.0, 100.0, 20.0],
                [350.0, SCREEN_HEIGHT - 180.0, 120.0, 20.0],
                [550.0, SCREEN_HEIGHT - 250.0, 80.0, 20.0],
                [150.0, SCREEN_HEIGHT - 250.0, 100.0, 20.0],
            ],
            GameVariant::Endless => vec![ground],
        }
    }
}

/// Player physics tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Added to vertical velocity every physics tick
    pub gravity: f32,
    /// Vertical velocity set by a jump (negative is up)
    pub jump_impulse: f32,
    pub player_size: Vec2,
    /// Overrides the variant's horizontal speed
    pub player_speed: Option<f32>,
    pub tick_ms: u64,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            jump_impulse: -10.0,
            player_size: Vec2::new(50.0, 50.0),
            player_speed: None,
            tick_ms: 20,
        }
    }
}

/// Moving platform generation and motion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformSettings {
    /// Population the generator keeps topped up
    pub target_count: usize,
    pub width: f32,
    pub height: f32,
    /// Vertical spacing between consecutive platforms, inclusive range
    pub gap_min: u32,
    pub gap_max: u32,
    /// New platforms never spawn above this y
    pub min_height: f32,
    /// Horizontal displacement per generator tick
    pub speed: f32,
    pub tick_ms: u64,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            target_count: 8,
            width: 100.0,
            height: 20.0,
            gap_min: 50,
            gap_max: 80,
            min_height: 50.0,
            speed: 11.0,
            tick_ms: 50,
        }
    }
}

/// Coin spawning and scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinSettings {
    pub target_count: usize,
    /// Coins are square
    pub size: f32,
    /// Gap between a coin's bottom edge and its platform's top edge
    pub margin_above: f32,
    /// Reachability window around a platform top
    pub max_jump_height: f32,
    /// Static-terrain coins never spawn lower than `SCREEN_HEIGHT - spawn_band_bottom`
    pub spawn_band_bottom: f32,
    pub period_ms: u64,
    /// Placement attempts per coin before giving up for this cycle
    pub max_attempts: u32,
    /// Overrides the variant's points per coin
    pub value: Option<u32>,
}

impl Default for CoinSettings {
    fn default() -> Self {
        Self {
            target_count: 5,
            size: 20.0,
            margin_above: 30.0,
            max_jump_height: 150.0,
            spawn_band_bottom: 120.0,
            period_ms: 2000,
            max_attempts: 64,
            value: None,
        }
    }
}

/// Screen scrolling (moving-platform variants only)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollSettings {
    pub enabled: bool,
    /// Downward shift per scroll tick
    pub speed: f32,
    /// Grace period before scrolling starts
    pub delay_ms: u64,
    pub tick_ms: u64,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            speed: 1.0,
            delay_ms: 4500,
            tick_ms: 20,
        }
    }
}

/// Complete game settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub variant: GameVariant,
    /// RNG seed; random when absent
    pub seed: Option<u64>,
    pub fps: u32,
    pub physics: PhysicsSettings,
    pub platforms: PlatformSettings,
    pub coins: CoinSettings,
    pub scroll: ScrollSettings,
    /// Length of a time-attack run
    pub countdown_secs: u32,
    /// Background track, looped for the whole run
    pub music: Option<PathBuf>,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            variant: GameVariant::default(),
            seed: None,
            fps: DEFAULT_FPS,
            physics: PhysicsSettings::default(),
            platforms: PlatformSettings::default(),
            coins: CoinSettings::default(),
            scroll: ScrollSettings::default(),
            countdown_secs: 33,
            music: None,
            music_volume: 0.7,
        }
    }
}

impl Settings {
    /// Environment variable naming the settings file
    pub const PATH_ENV: &'static str = "HOP_SETTINGS";
    /// Settings file used when the environment variable is unset
    pub const DEFAULT_PATH: &'static str = "hop.json";

    /// Create default settings for a variant
    pub fn for_variant(variant: GameVariant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn termination(&self) -> TerminationPolicy {
        self.variant.termination()
    }

    pub fn platform_mode(&self) -> PlatformMode {
        self.variant.platform_mode()
    }

    /// Effective scrolling (only moving platforms scroll)
    pub fn scroll_enabled(&self) -> bool {
        self.scroll.enabled && self.platform_mode() == PlatformMode::Moving
    }

    pub fn coin_value(&self) -> u32 {
        self.coins.value.unwrap_or_else(|| self.variant.coin_value())
    }

    pub fn player_speed(&self) -> f32 {
        self.physics
            .player_speed
            .unwrap_or_else(|| self.variant.player_speed())
    }

    pub fn physics_period(&self) -> Duration {
        Duration::from_millis(self.physics.tick_ms)
    }

    pub fn platform_period(&self) -> Duration {
        Duration::from_millis(self.platforms.tick_ms)
    }

    pub fn coin_period(&self) -> Duration {
        Duration::from_millis(self.coins.period_ms)
    }

    pub fn scroll_period(&self) -> Duration {
        Duration::from_millis(self.scroll.tick_ms)
    }

    pub fn scroll_delay(&self) -> Duration {
        Duration::from_millis(self.scroll.delay_ms)
    }

    /// Resolve the settings file path from the environment
    pub fn default_path() -> PathBuf {
        std::env::var_os(Self::PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_PATH))
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                return Self::default();
            }
            Err(e) => {
                log::warn!("Could not read {}: {e}; using defaults", path.display());
                return Self::default();
            }
        };

        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Malformed settings in {}: {e}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
