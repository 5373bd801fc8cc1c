//! Whole-run scenarios through the public API

use alien_runner::platform::GameHost;
use alien_runner::sim::{
    AlienLook, EffectKind, GameEvent, GamePhase, GameState, SceneGraph, Sprite, TickInput, tick,
};
use alien_runner::{Settings, Tuning};

fn alien() -> AlienLook {
    AlienLook {
        color: 0x8E44AD,
        size: 30.0,
        teeth: 3,
        antennae: 2,
    }
}

#[test]
fn death_explosion_plays_out_and_leaves_the_scene() {
    let mut scene = SceneGraph::new();
    let mut state = GameState::with_seed(31337);
    let center = state.player.center();
    state.obstacles.spawn_at(&mut scene, center, 0.0, alien());

    tick(&mut state, &TickInput::default(), &mut scene);
    assert_eq!(state.phase, GamePhase::GameOver);
    let explosion = state.effects.effects()[0].group();
    assert_eq!(state.effects.effects()[0].kind(), EffectKind::Explosion);

    for _ in 0..600 {
        tick(&mut state, &TickInput::default(), &mut scene);
    }

    assert!(state.effects.is_empty());
    assert_eq!(scene.detach_count(explosion), 1);
    assert_eq!(scene.redundant_detaches(), 0);
    // Only the alien that killed the player is left on screen
    assert_eq!(scene.len(), 1);
}

#[test]
fn victory_show_retires_completely() {
    let mut scene = SceneGraph::new();
    let mut state = GameState::with_seed(8);
    for coin in &mut state.coins[1..] {
        coin.collected = true;
    }
    let coin = state.coins[0].pos;
    state.player.pos = coin - state.player.size * 0.5;

    tick(&mut state, &TickInput::default(), &mut scene);
    assert_eq!(state.phase, GamePhase::Victory);

    let mut saw_fireworks = false;
    let mut peak_particles = 0;
    for _ in 0..900 {
        tick(&mut state, &TickInput::default(), &mut scene);
        saw_fireworks |= state
            .effects
            .effects()
            .iter()
            .any(|e| e.kind() == EffectKind::Firework);
        peak_particles = peak_particles.max(state.effects.particle_count());
    }

    assert!(saw_fireworks);
    assert!(peak_particles > 100);
    assert!(state.effects.is_empty());
    assert_eq!(state.effects.pending_len(), 0);
    assert_eq!(scene.count_where(|s| matches!(s, Sprite::Particle { .. })), 0);
    assert_eq!(scene.redundant_detaches(), 0);
}

#[test]
fn restart_mid_victory_cancels_the_show() {
    // No aliens, so nothing else can spawn particles after the restart
    let mut tuning = Tuning::default();
    tuning.obstacles.initial_interval = u32::MAX;
    let mut scene = SceneGraph::new();
    let mut state = GameState::new(8, tuning, Settings::default());
    state.trigger_victory(&mut scene);
    for _ in 0..45 {
        tick(&mut state, &TickInput::default(), &mut scene);
    }
    assert!(state.effects.pending_len() > 0);

    let restart = TickInput {
        restart: true,
        ..Default::default()
    };
    tick(&mut state, &restart, &mut scene);
    assert!(state.effects.is_empty());
    assert_eq!(state.effects.pending_len(), 0);

    for _ in 0..300 {
        tick(&mut state, &TickInput::default(), &mut scene);
    }
    let events = state.drain_events();
    assert!(events.contains(&GameEvent::Restarted));
    assert!(!events.contains(&GameEvent::ShowVictoryScreen));
    assert_eq!(scene.count_where(|s| matches!(s, Sprite::Particle { .. })), 0);
}

#[test]
fn low_quality_scales_particles() {
    let settings = Settings::from_preset(alien_runner::QualityPreset::Low);
    let mut host = GameHost::new(4, Tuning::default(), settings);
    host.state.trigger_death(&mut host.scene);
    assert_eq!(host.state.effects.particle_count(), 8);
}

#[test]
fn tuning_override_changes_the_ramp() {
    let tuning = Tuning::from_json(r#"{"obstacles": {"initial_interval": 61}}"#).unwrap();
    let mut host = GameHost::new(4, tuning, Settings::default());
    for _ in 0..61 {
        host.step();
    }
    assert_eq!(host.state.obstacles.spawn_count(), 1);
    assert_eq!(host.state.obstacles.spawn_interval(), 60);
}
