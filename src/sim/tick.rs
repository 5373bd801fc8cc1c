//! Fixed timestep simulation tick
//!
//! One call advances the shared frame clock, the effect system, the delayed UI
//! queue and (while the run is live) the player, aliens and coins.

use glam::Vec2;

use super::collision::{Rect, lands_on};
use super::scene::Scene;
use super::state::{GameEvent, GamePhase, GameState};

/// Autopilot: how far ahead an alien must be before it jumps
const DODGE_RANGE: f32 = 140.0;
/// Autopilot: horizontal slack before steering toward a coin
const STEER_DEADZONE: f32 = 6.0;
/// Autopilot: a coin this far above the player's center is worth a jump
const JUMP_FOR_COIN: f32 = 60.0;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Start a new run (only honored once the current one has ended)
    pub restart: bool,
    /// Idle/demo mode - autopilot chases coins and hops over aliens
    pub idle_mode: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, scene: &mut dyn Scene) {
    state.time_ticks += 1;
    let now = state.time_ticks;

    if input.restart && state.phase != GamePhase::Playing {
        state.restart(scene);
    }

    // Effects keep animating after the run ends
    state.effects.update(scene, &mut state.rng, now);
    state.flush_ui_queue();

    if state.phase != GamePhase::Playing {
        return;
    }

    let mut input = input.clone();
    if input.idle_mode {
        autopilot(state, &mut input);
    }

    step_player(state, &input);

    let bounds = state.tuning.bounds;
    state.obstacles.update(scene, &mut state.rng, &bounds, now);

    if state
        .obstacles
        .test_collision(&state.player.rect(), &state.tuning.obstacle_inset)
    {
        state.trigger_death(scene);
        return;
    }

    collect_coins(state, scene);

    if state.phase == GamePhase::Playing {
        let per_tick = state.tuning.survival_score_per_tick;
        state.add_score(per_tick);
    }
}

/// Horizontal input, jump, gravity, then ground and platform landing
fn step_player(state: &mut GameState, input: &TickInput) {
    let tuning = &state.tuning.player;
    let width = state.tuning.bounds.width;
    let player = &mut state.player;

    player.vel.x = 0.0;
    if input.left {
        player.vel.x = -tuning.move_speed;
    }
    if input.right {
        player.vel.x = tuning.move_speed;
    }
    if input.jump && player.on_ground {
        player.vel.y = tuning.jump_force;
        player.on_ground = false;
    }

    player.vel.y += tuning.gravity;
    player.pos += player.vel;
    player.pos.x = player.pos.x.clamp(0.0, (width - player.size.x).max(0.0));

    player.on_ground = false;
    if player.rect().bottom() > state.ground.top() {
        player.pos.y = state.ground.top() - player.size.y;
        player.vel.y = 0.0;
        player.on_ground = true;
    }

    for platform in &state.tuning.platforms {
        if lands_on(&player.rect(), player.vel.y, platform) {
            player.pos.y = platform.top() - player.size.y;
            player.vel.y = 0.0;
            player.on_ground = true;
        }
    }
}

fn collect_coins(state: &mut GameState, scene: &mut dyn Scene) {
    let body = state.tuning.coin_inset.apply(&state.player.rect());
    let half = Vec2::splat(state.tuning.coins.half_extent);
    let total = state.coins.len();

    let picked: Vec<usize> = state
        .coins
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.collected && body.overlaps(&Rect::centered(c.pos, half)))
        .map(|(i, _)| i)
        .collect();

    for index in picked {
        state.coins[index].collected = true;
        let collected = state.coins_collected();
        log::debug!("Coin {} collected ({}/{})", index, collected, total);
        state.emit(GameEvent::CoinCollected {
            index,
            collected,
            total,
        });
        let value = f64::from(state.tuning.coins.value);
        state.add_score(value);
    }

    if total > 0 && state.coins_collected() == total {
        state.trigger_victory(scene);
    }
}

/// Demo AI: steer toward the nearest coin, jump for high coins and over aliens
fn autopilot(state: &GameState, input: &mut TickInput) {
    let me = state.player.center();

    input.left = false;
    input.right = false;
    input.jump = false;

    let target = state
        .coins
        .iter()
        .filter(|c| !c.collected)
        .map(|c| c.pos)
        .min_by(|a, b| a.distance_squared(me).total_cmp(&b.distance_squared(me)));

    if let Some(coin) = target {
        let dx = coin.x - me.x;
        if dx > STEER_DEADZONE {
            input.right = true;
        } else if dx < -STEER_DEADZONE {
            input.left = true;
        }
        if me.y - coin.y > JUMP_FOR_COIN && dx.abs() < state.player.size.x * 2.0 {
            input.jump = true;
        }
    }

    let threatened = state.obstacles.obstacles().iter().any(|o| {
        let dx = o.pos.x - me.x;
        dx > 0.0 && dx < DODGE_RANGE && (o.pos.y - me.y).abs() < state.player.size.y
    });
    if threatened {
        input.jump = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::obstacles::AlienLook;
    use crate::sim::scene::{SceneGraph, Sprite};
    use crate::{Settings, Tuning};

    fn look() -> AlienLook {
        AlienLook {
            color: 0x27AE60,
            size: 30.0,
            teeth: 2,
            antennae: 1,
        }
    }

    /// Default layout with the spawn ramp pushed out of reach
    fn quiet_state() -> GameState {
        let mut tuning = Tuning::default();
        tuning.obstacles.initial_interval = u32::MAX;
        GameState::new(12345, tuning, Settings::default())
    }

    fn run(state: &mut GameState, scene: &mut SceneGraph, input: &TickInput, ticks: u32) {
        for _ in 0..ticks {
            tick(state, input, scene);
        }
    }

    #[test]
    fn test_player_falls_to_ground() {
        let mut scene = SceneGraph::new();
        let mut state = GameState::with_seed(12345);
        run(&mut state, &mut scene, &TickInput::default(), 60);

        assert!(state.player.on_ground);
        assert_eq!(state.player.pos.y, 500.0);
        assert_eq!(state.player.vel.y, 0.0);
        assert_eq!(state.time_ticks, 60);
    }

    #[test]
    fn test_jump_only_from_ground() {
        let mut scene = SceneGraph::new();
        let mut state = GameState::with_seed(12345);
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };

        // Mid-air on the first tick: no jump
        tick(&mut state, &jump, &mut scene);
        assert!(state.player.vel.y > 0.0);

        run(&mut state, &mut scene, &TickInput::default(), 60);
        tick(&mut state, &jump, &mut scene);
        assert_eq!(state.player.vel.y, -14.5);
        assert_eq!(state.player.pos.y, 485.5);
        assert!(!state.player.on_ground);
    }

    #[test]
    fn test_lands_on_platform() {
        let mut scene = SceneGraph::new();
        let mut state = GameState::with_seed(12345);
        state.player.pos = Vec2::new(350.0, 380.0);
        run(&mut state, &mut scene, &TickInput::default(), 30);

        assert!(state.player.on_ground);
        assert_eq!(state.player.pos.y, 400.0);
    }

    #[test]
    fn test_horizontal_clamp() {
        let mut scene = SceneGraph::new();
        let mut state = quiet_state();
        let left = TickInput {
            left: true,
            ..Default::default()
        };
        run(&mut state, &mut scene, &left, 40);
        assert_eq!(state.player.pos.x, 0.0);

        let right = TickInput {
            right: true,
            ..Default::default()
        };
        run(&mut state, &mut scene, &right, 200);
        assert_eq!(state.player.pos.x, 750.0);
    }

    #[test]
    fn test_alien_contact_kills_once() {
        let mut scene = SceneGraph::new();
        let mut state = GameState::with_seed(7);
        let center = state.player.center();
        assert!(state.obstacles.spawn_at(&mut scene, center, 0.0, look()).is_some());

        tick(&mut state, &TickInput::default(), &mut scene);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(!state.player.visible);

        run(&mut state, &mut scene, &TickInput::default(), 130);
        let events = state.drain_events();
        let deaths = events
            .iter()
            .filter(|e| matches!(e, GameEvent::PlayerDied { .. }))
            .count();
        assert_eq!(deaths, 1);
        assert_eq!(
            events
                .iter()
                .filter(|e| **e == GameEvent::ShowGameOverScreen)
                .count(),
            1
        );

        // Frozen world: the alien no longer moves, no score accrues
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.display_score(), 0);
    }

    #[test]
    fn test_game_over_screen_is_delayed() {
        let mut scene = SceneGraph::new();
        let mut state = GameState::with_seed(7);
        let center = state.player.center();
        state.obstacles.spawn_at(&mut scene, center, 0.0, look());

        tick(&mut state, &TickInput::default(), &mut scene);
        state.drain_events();

        run(&mut state, &mut scene, &TickInput::default(), 119);
        assert!(!state.drain_events().contains(&GameEvent::ShowGameOverScreen));
        tick(&mut state, &TickInput::default(), &mut scene);
        assert_eq!(state.drain_events(), vec![GameEvent::ShowGameOverScreen]);
    }

    #[test]
    fn test_coin_pickup_scores() {
        let mut scene = SceneGraph::new();
        let mut state = GameState::with_seed(7);
        let coin = state.coins[0].pos;
        state.player.pos = coin - state.player.size * 0.5;

        tick(&mut state, &TickInput::default(), &mut scene);
        assert!(state.coins[0].collected);
        assert_eq!(state.coins_collected(), 1);
        assert_eq!(state.display_score(), 50);

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::CoinCollected {
            index: 0,
            collected: 1,
            total: 19
        }));
        assert!(events.contains(&GameEvent::ScoreChanged { score: 50 }));
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_last_coin_wins() {
        let mut scene = SceneGraph::new();
        let mut state = GameState::with_seed(7);
        for coin in &mut state.coins[1..] {
            coin.collected = true;
        }
        let coin = state.coins[0].pos;
        state.player.pos = coin - state.player.size * 0.5;

        tick(&mut state, &TickInput::default(), &mut scene);
        assert_eq!(state.phase, GamePhase::Victory);
        assert!(state.drain_events().contains(&GameEvent::Victory));
        assert!(scene.count_where(|s| matches!(s, Sprite::Text { .. })) == 1);

        run(&mut state, &mut scene, &TickInput::default(), 120);
        assert!(state.drain_events().contains(&GameEvent::ShowVictoryScreen));
    }

    #[test]
    fn test_death_beats_victory_in_same_tick() {
        let mut scene = SceneGraph::new();
        let mut state = GameState::with_seed(7);
        for coin in &mut state.coins[1..] {
            coin.collected = true;
        }
        let coin = state.coins[0].pos;
        state.player.pos = coin - state.player.size * 0.5;
        state.obstacles.spawn_at(&mut scene, coin, 0.0, look());

        tick(&mut state, &TickInput::default(), &mut scene);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(!state.coins[0].collected);
        assert!(!state.drain_events().contains(&GameEvent::Victory));
    }

    #[test]
    fn test_restart_after_death() {
        let mut scene = SceneGraph::new();
        let mut state = GameState::with_seed(7);
        let center = state.player.center();
        state.obstacles.spawn_at(&mut scene, center, 0.0, look());
        tick(&mut state, &TickInput::default(), &mut scene);
        assert_eq!(state.phase, GamePhase::GameOver);

        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &restart, &mut scene);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.obstacles.is_empty());
        assert!(state.effects.is_empty());
        assert_eq!(scene.redundant_detaches(), 0);
        assert!(state.drain_events().contains(&GameEvent::Restarted));
    }

    #[test]
    fn test_restart_ignored_while_playing() {
        let mut scene = SceneGraph::new();
        let mut state = GameState::with_seed(7);
        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &restart, &mut scene);
        assert!(!state.drain_events().contains(&GameEvent::Restarted));
    }

    #[test]
    fn test_determinism() {
        let idle = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        let mut scene1 = SceneGraph::new();
        let mut scene2 = SceneGraph::new();
        let mut state1 = GameState::with_seed(99999);
        let mut state2 = GameState::with_seed(99999);

        for _ in 0..3000 {
            tick(&mut state1, &idle, &mut scene1);
            tick(&mut state2, &idle, &mut scene2);
        }

        assert_eq!(state1.phase, state2.phase);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.player.pos, state2.player.pos);
        assert_eq!(state1.coins_collected(), state2.coins_collected());
        assert_eq!(state1.obstacles.len(), state2.obstacles.len());
        assert_eq!(scene1.len(), scene2.len());
        assert_eq!(state1.drain_events(), state2.drain_events());
    }

    #[test]
    fn test_autopilot_moves_toward_coin() {
        let mut scene = SceneGraph::new();
        let mut state = GameState::with_seed(42);
        let idle = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        let start_x = state.player.pos.x;
        run(&mut state, &mut scene, &idle, 30);
        // Every coin sits to the right of the spawn point
        assert!(state.player.pos.x > start_x);
    }

    #[test]
    fn test_long_run_keeps_scene_in_sync() {
        let mut scene = SceneGraph::new();
        let mut state = GameState::with_seed(2024);
        let mut input = TickInput {
            idle_mode: true,
            ..Default::default()
        };

        for _ in 0..20_000 {
            tick(&mut state, &input, &mut scene);
            input.restart = false;
            for event in state.drain_events() {
                if matches!(
                    event,
                    GameEvent::ShowGameOverScreen | GameEvent::ShowVictoryScreen
                ) {
                    input.restart = true;
                }
            }

            let aliens = scene.count_where(|s| matches!(s, Sprite::Alien(_)));
            assert_eq!(aliens, state.obstacles.len());
            assert!(state.obstacles.spawn_interval() >= 60);
        }

        assert_eq!(scene.redundant_detaches(), 0);
    }

    #[test]
    fn test_short_canvas_spawns_without_panic() {
        // The spawn band [100, 90) is empty on a 140px tall screen
        let mut scene = SceneGraph::new();
        let mut state = GameState::new(1, Tuning::with_bounds(800.0, 140.0), Settings::default());
        run(&mut state, &mut scene, &TickInput::default(), 130);

        assert_eq!(state.obstacles.spawn_count(), 1);
        let alien = &state.obstacles.obstacles()[0];
        assert_eq!(alien.base_y, 100.0);
        assert!(alien.vx <= -3.0 && alien.vx >= -5.0);
    }
}
