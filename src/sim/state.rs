//! Game state and core simulation types
//!
//! `GameState` is the single context object the tick loop and its
//! collaborators share. The UI never reads globals; it drains [`GameEvent`]s.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::collision::Rect;
use super::effects::EffectSystem;
use super::obstacles::ObstacleManager;
use super::scene::Scene;
use super::schedule::Scheduler;
use crate::ms_to_ticks;
use crate::settings::Settings;
use crate::tuning::{Bounds, PlayerTuning, Tuning};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Player hit an alien
    GameOver,
    /// Every coin collected
    Victory,
}

/// Notifications for the HUD / DOM layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    ScoreChanged { score: u64 },
    CoinCollected {
        index: usize,
        collected: usize,
        total: usize,
    },
    PlayerDied { x: f32, y: f32 },
    Victory,
    /// Delayed after death so the explosion can play
    ShowGameOverScreen,
    /// Delayed after victory so the fireworks can play
    ShowVictoryScreen,
    Restarted,
}

/// The player's runner
#[derive(Debug, Clone)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    pub on_ground: bool,
    pub visible: bool,
}

impl Player {
    pub fn new(tuning: &PlayerTuning) -> Self {
        Self {
            pos: tuning.start,
            size: tuning.size,
            vel: Vec2::ZERO,
            on_ground: false,
            visible: true,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }

    pub fn center(&self) -> Vec2 {
        self.rect().center()
    }
}

/// A collectible coin
#[derive(Debug, Clone)]
pub struct Coin {
    pub pos: Vec2,
    pub collected: bool,
}

/// Complete game state (deterministic for a given seed and input stream)
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub tuning: Tuning,
    /// Simulation tick counter (the shared frame clock)
    pub time_ticks: u64,
    pub phase: GamePhase,
    /// Fractional score; survival adds a little every tick
    pub score: f64,
    pub player: Player,
    pub ground: Rect,
    pub coins: Vec<Coin>,
    pub obstacles: ObstacleManager,
    pub effects: EffectSystem,
    /// Delayed UI notifications
    ui_queue: Scheduler<GameEvent>,
    events: Vec<GameEvent>,
    reported_score: u64,
}

impl GameState {
    /// Create a new game with the given seed
    pub fn new(seed: u64, tuning: Tuning, settings: Settings) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);

        let coins = tuning
            .coins
            .fixed
            .iter()
            .copied()
            .chain((0..tuning.coins.random_count).map(|_| {
                let area = tuning.coins.random_area;
                Vec2::new(
                    area.x + rng.random::<f32>() * area.w,
                    area.y + rng.random::<f32>() * area.h,
                )
            }))
            .map(|pos| Coin {
                pos,
                collected: false,
            })
            .collect();

        Self {
            seed,
            rng,
            player: Player::new(&tuning.player),
            ground: ground_rect(&tuning),
            coins,
            obstacles: ObstacleManager::new(tuning.obstacles.clone()),
            effects: EffectSystem::new(tuning.bounds, settings),
            tuning,
            time_ticks: 0,
            phase: GamePhase::Playing,
            score: 0.0,
            ui_queue: Scheduler::new(),
            events: Vec::new(),
            reported_score: 0,
        }
    }

    /// Default tuning and settings
    pub fn with_seed(seed: u64) -> Self {
        Self::new(seed, Tuning::default(), Settings::default())
    }

    /// Canvas resized mid-run: the ground and effect culling follow it
    pub fn resize(&mut self, bounds: Bounds) {
        log::info!("Resized to {}x{}", bounds.width, bounds.height);
        self.tuning.bounds = bounds;
        self.ground = ground_rect(&self.tuning);
        self.effects.set_bounds(bounds);
    }

    /// Whole-number score as shown on the HUD
    pub fn display_score(&self) -> u64 {
        self.score.floor() as u64
    }

    pub fn coins_collected(&self) -> usize {
        self.coins.iter().filter(|c| c.collected).count()
    }

    pub fn total_coins(&self) -> usize {
        self.coins.len()
    }

    /// Take every notification produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Move due delayed notifications into the event buffer
    pub(crate) fn flush_ui_queue(&mut self) {
        let due = self.ui_queue.drain_due(self.time_ticks);
        self.events.extend(due);
    }

    /// Add to the score and report it if the displayed value changed
    pub(crate) fn add_score(&mut self, amount: f64) {
        self.score += amount;
        let shown = self.display_score();
        if shown != self.reported_score {
            self.reported_score = shown;
            self.emit(GameEvent::ScoreChanged { score: shown });
        }
    }

    fn schedule_ui(&mut self, event: GameEvent) {
        let due = self.time_ticks + ms_to_ticks(self.tuning.end_screen_delay_ms);
        self.ui_queue.schedule(due, event);
    }

    /// Player hit an alien. No-op once the run has ended.
    pub fn trigger_death(&mut self, scene: &mut dyn Scene) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.player.visible = false;

        let at = self.player.center();
        log::info!(
            "Player died at tick {} with score {}",
            self.time_ticks,
            self.display_score()
        );
        self.effects.play_death_effect(scene, &mut self.rng, at);
        self.emit(GameEvent::PlayerDied { x: at.x, y: at.y });
        self.schedule_ui(GameEvent::ShowGameOverScreen);
    }

    /// Every coin collected. No-op once the run has ended.
    pub fn trigger_victory(&mut self, scene: &mut dyn Scene) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.phase = GamePhase::Victory;

        log::info!(
            "Victory at tick {} with score {}",
            self.time_ticks,
            self.display_score()
        );
        self.effects.play_victory_effect(scene, &mut self.rng);
        self.emit(GameEvent::Victory);
        self.schedule_ui(GameEvent::ShowVictoryScreen);
    }

    /// Start a fresh run on the same coin layout
    pub fn restart(&mut self, scene: &mut dyn Scene) {
        self.effects.stop_all(scene);
        self.obstacles.reset(scene);
        self.ui_queue.clear();

        self.player = Player::new(&self.tuning.player);
        for coin in &mut self.coins {
            coin.collected = false;
        }
        self.score = 0.0;
        self.reported_score = 0;
        self.phase = GamePhase::Playing;

        log::info!("Restarted at tick {}", self.time_ticks);
        self.emit(GameEvent::Restarted);
        self.emit(GameEvent::ScoreChanged { score: 0 });
    }
}

fn ground_rect(tuning: &Tuning) -> Rect {
    let b = tuning.bounds;
    Rect::new(
        0.0,
        b.height - tuning.ground_height,
        b.width,
        tuning.ground_height,
    )
}
