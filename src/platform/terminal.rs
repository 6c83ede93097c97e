//! Terminal frontend using crossterm
//!
//! The 800x600 world is scaled onto the terminal grid. Terminals that
//! support the keyboard enhancement protocol report key releases; on the
//! others a key counts as held for a short window after its last press or
//! autorepeat event.

use std::io::{Stdout, Write, stdout};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::style::Print;
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};

use super::{FrameClock, FrameInput, Frontend, KeyState};
use crate::consts::*;
use crate::settings::Settings;
use crate::sim::{Rect, World};

/// How long a press counts as held when releases are not reported
const HOLD_WINDOW: Duration = Duration::from_millis(200);

const TERRAIN_CHAR: char = '#';
const PLATFORM_CHAR: char = '=';
const COIN_CHAR: char = 'o';
const PLAYER_CHAR: char = '@';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Left = 0,
    Right = 1,
    Jump = 2,
}

/// Both binding sets: arrows and WAD (space also jumps)
fn key_for(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Key::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Key::Right),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Char(' ') => {
            Some(Key::Jump)
        }
        _ => None,
    }
}

fn is_quit(event: &KeyEvent) -> bool {
    event.kind == KeyEventKind::Press
        && match event.code {
            KeyCode::Esc | KeyCode::Char('q') => true,
            KeyCode::Char('c') => event.modifiers.contains(KeyModifiers::CONTROL),
            _ => false,
        }
}

/// Press/release bookkeeping for the logical keys
#[derive(Debug, Default)]
struct KeyTracker {
    pressed_at: [Option<Instant>; 3],
    reports_release: bool,
}

impl KeyTracker {
    fn handle(&mut self, key: Key, kind: KeyEventKind, now: Instant) {
        self.pressed_at[key as usize] = match kind {
            KeyEventKind::Press | KeyEventKind::Repeat => Some(now),
            KeyEventKind::Release => None,
        };
    }

    fn held(&self, key: Key, now: Instant) -> bool {
        self.pressed_at[key as usize].is_some_and(|at| {
            self.reports_release || now.saturating_duration_since(at) <= HOLD_WINDOW
        })
    }

    fn state(&self, now: Instant) -> KeyState {
        KeyState {
            left: self.held(Key::Left, now),
            right: self.held(Key::Right, now),
            jump: self.held(Key::Jump, now),
        }
    }
}

/// Fill the cells covered by `rect`
fn fill(grid: &mut [Vec<char>], cols: usize, rows: usize, rect: Rect, ch: char) {
    let sx = cols as f32 / SCREEN_WIDTH;
    let sy = rows as f32 / SCREEN_HEIGHT;

    let x0 = (rect.left() * sx).floor();
    let x1 = (rect.right() * sx).ceil().max(x0 + 1.0);
    let y0 = (rect.top() * sy).floor();
    let y1 = (rect.bottom() * sy).ceil().max(y0 + 1.0);

    let x0 = x0.clamp(0.0, cols as f32) as usize;
    let x1 = x1.clamp(0.0, cols as f32) as usize;
    let y0 = y0.clamp(0.0, rows as f32) as usize;
    let y1 = y1.clamp(0.0, rows as f32) as usize;

    for row in &mut grid[y0..y1] {
        for cell in &mut row[x0..x1] {
            *cell = ch;
        }
    }
}

/// Write `text` into a row starting at `col`, clipped to the grid
fn overlay(row: &mut [char], col: usize, text: &str) {
    for (cell, ch) in row.iter_mut().skip(col).zip(text.chars()) {
        *cell = ch;
    }
}

/// Render the world onto a `cols` x `rows` character grid
pub fn rasterize(world: &World, settings: &Settings, cols: u16, rows: u16) -> Vec<String> {
    let (cols, rows) = (cols.max(1) as usize, rows.max(1) as usize);
    let mut grid = vec![vec![' '; cols]; rows];

    for platform in &world.terrain {
        fill(&mut grid, cols, rows, platform.rect(), TERRAIN_CHAR);
    }
    for platform in &world.moving {
        fill(&mut grid, cols, rows, platform.rect(), PLATFORM_CHAR);
    }
    for coin in &world.coins {
        fill(&mut grid, cols, rows, coin.rect(settings.coins.size), COIN_CHAR);
    }
    fill(&mut grid, cols, rows, world.player.rect(), PLAYER_CHAR);

    overlay(&mut grid[0], 1, &format!("Score: {}", world.score));
    if let Some(remaining) = world.countdown() {
        let text = format!("Time: {remaining}");
        let col = cols.saturating_sub(text.len() + 1);
        overlay(&mut grid[0], col, &text);
    }

    grid.into_iter().map(|row| row.into_iter().collect()).collect()
}

pub struct TerminalFrontend {
    out: Stdout,
    keys: KeyTracker,
    clock: FrameClock,
    cols: u16,
    rows: u16,
}

impl TerminalFrontend {
    /// Switch the terminal to raw mode on the alternate screen
    pub fn new(fps: u32) -> anyhow::Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        execute!(out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;

        let reports_release = matches!(terminal::supports_keyboard_enhancement(), Ok(true));
        if reports_release {
            execute!(
                out,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        log::info!("Terminal frontend ready (key releases reported: {reports_release})");

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            keys: KeyTracker {
                reports_release,
                ..KeyTracker::default()
            },
            clock: FrameClock::new(fps),
            cols,
            rows,
        })
    }

    fn draw_lines(&mut self, lines: &[String]) -> anyhow::Result<()> {
        for (row, line) in lines.iter().enumerate() {
            queue!(self.out, MoveTo(0, row as u16), Print(line))?;
        }
        self.out.flush()?;
        Ok(())
    }
}

impl Frontend for TerminalFrontend {
    fn poll_input(&mut self) -> anyhow::Result<FrameInput> {
        let mut quit = false;
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key_event) => {
                    if is_quit(&key_event) {
                        quit = true;
                    } else if let Some(key) = key_for(key_event.code) {
                        self.keys.handle(key, key_event.kind, Instant::now());
                    }
                }
                Event::Resize(cols, rows) => {
                    self.cols = cols;
                    self.rows = rows;
                    queue!(self.out, Clear(ClearType::All))?;
                }
                _ => {}
            }
        }

        Ok(FrameInput {
            quit,
            keys: self.keys.state(Instant::now()),
        })
    }

    fn present(&mut self, world: &World, settings: &Settings) -> anyhow::Result<()> {
        let lines = rasterize(world, settings, self.cols, self.rows);
        self.draw_lines(&lines)
    }

    fn show_final_score(&mut self, message: &str) -> anyhow::Result<()> {
        let (cols, rows) = (self.cols.max(1) as usize, self.rows.max(1) as usize);
        let mut lines = vec![" ".repeat(cols); rows];
        let col = cols.saturating_sub(message.len()) / 2;
        let line: String = " ".repeat(col) + message;
        lines[rows / 2] = line.chars().take(cols).collect();
        queue!(self.out, Clear(ClearType::All))?;
        self.draw_lines(&lines)
    }

    fn wait_frame(&mut self) {
        self.clock.wait();
    }
}

impl Drop for TerminalFrontend {
    fn drop(&mut self) {
        if self.keys.reports_release {
            let _ = execute!(self.out, PopKeyboardEnhancementFlags);
        }
        let _ = execute!(self.out, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GameVariant;
    use crate::sim::{Coin, Platform, Termination};
    use glam::Vec2;

    fn cell(lines: &[String], col: usize, row: usize) -> char {
        lines[row].chars().nth(col).unwrap()
    }

    #[test]
    fn test_rasterize_scales_world() {
        let settings = Settings::for_variant(GameVariant::TimeAttack);
        let mut world = World::empty(Vec2::splat(50.0), Termination::Countdown { remaining: 12 });
        world.terrain.push(Platform::terrain(0.0, 580.0, 800.0, 20.0));
        world.moving.push(Platform::moving(100.0, 300.0, 100.0, 20.0, 1.0));
        world.coins.push(Coin::new(700.0, 200.0));
        world.score = 30;

        let lines = rasterize(&world, &settings, 80, 30);
        assert_eq!(lines.len(), 30);
        assert!(lines.iter().all(|l| l.chars().count() == 80));

        assert!(lines[29].chars().all(|c| c == TERRAIN_CHAR));
        assert_eq!(cell(&lines, 10, 15), PLATFORM_CHAR);
        assert_eq!(cell(&lines, 70, 10), COIN_CHAR);
        // Player at (400, 500) covers columns 40..45, rows 25..28
        assert_eq!(cell(&lines, 40, 25), PLAYER_CHAR);
        assert_eq!(cell(&lines, 44, 27), PLAYER_CHAR);
        assert_eq!(cell(&lines, 45, 25), ' ');

        assert!(lines[0].starts_with(" Score: 30"));
        assert!(lines[0].trim_end().ends_with("Time: 12"));
    }

    #[test]
    fn test_rasterize_clips_off_screen() {
        let settings = Settings::default();
        let mut world = World::empty(Vec2::splat(50.0), Termination::FallOff { fallen: false });
        world.player.pos = Vec2::new(-100.0, 700.0);
        world.coins.push(Coin::new(900.0, -50.0));

        let lines = rasterize(&world, &settings, 40, 10);
        assert!(lines.iter().skip(1).all(|l| l.trim().is_empty()));
        assert!(!lines[0].contains("Time"));
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(key_for(KeyCode::Left), Some(Key::Left));
        assert_eq!(key_for(KeyCode::Char('a')), Some(Key::Left));
        assert_eq!(key_for(KeyCode::Char('D')), Some(Key::Right));
        assert_eq!(key_for(KeyCode::Up), Some(Key::Jump));
        assert_eq!(key_for(KeyCode::Char('w')), Some(Key::Jump));
        assert_eq!(key_for(KeyCode::Char('x')), None);
    }

    #[test]
    fn test_quit_keys() {
        assert!(is_quit(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_key_hold_window_without_releases() {
        let mut tracker = KeyTracker::default();
        let t0 = Instant::now();
        tracker.handle(Key::Right, KeyEventKind::Press, t0);
        assert!(tracker.state(t0).right);
        assert!(tracker.state(t0 + Duration::from_millis(100)).right);
        assert!(!tracker.state(t0 + Duration::from_millis(500)).right);
    }

    #[test]
    fn test_key_release_reported() {
        let mut tracker = KeyTracker {
            reports_release: true,
            ..KeyTracker::default()
        };
        let t0 = Instant::now();
        tracker.handle(Key::Jump, KeyEventKind::Press, t0);
        assert!(tracker.state(t0 + Duration::from_secs(2)).jump);
        tracker.handle(Key::Jump, KeyEventKind::Release, t0);
        assert!(!tracker.state(t0).jump);
    }
}
