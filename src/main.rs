//! Alien Runner entry point
//!
//! On the web the library's `WebGame` is driven from JS and this binary is
//! unused. Natively it plays a headless autopilot run and logs what happened:
//!
//! ```text
//! alien-runner [seed] [ticks]
//! ```

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use alien_runner::platform::GameHost;
    use alien_runner::sim::{GameEvent, GamePhase, Sprite};
    use alien_runner::{Settings, Tuning};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(12345);
    let ticks: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(3600);

    log::info!("Alien Runner (headless) seed {} for {} ticks", seed, ticks);

    let mut host = GameHost::new(seed, Tuning::default(), Settings::default());
    host.keys.set_idle_mode(true);

    let mut peak_nodes = 0;
    let mut peak_particles = 0;
    for _ in 0..ticks {
        host.step();
        peak_nodes = peak_nodes.max(host.scene.len());
        peak_particles = peak_particles.max(host.state.effects.particle_count());

        for event in host.drain_events() {
            match event {
                GameEvent::ScoreChanged { .. } => {}
                GameEvent::ShowGameOverScreen | GameEvent::ShowVictoryScreen => {
                    log::info!("{:?}; restarting", event);
                    host.keys.key_down("Enter");
                }
                other => log::info!("tick {}: {:?}", host.state.time_ticks, other),
            }
        }
    }

    let state = &host.state;
    let aliens = host.scene.count_where(|s| matches!(s, Sprite::Alien(_)));
    println!("\n=== Run summary (seed {}) ===", seed);
    println!("Ticks:          {}", state.time_ticks);
    println!(
        "Phase:          {}",
        match state.phase {
            GamePhase::Playing => "playing",
            GamePhase::GameOver => "game over",
            GamePhase::Victory => "victory",
        }
    );
    println!("Score:          {}", state.display_score());
    println!(
        "Coins:          {}/{}",
        state.coins_collected(),
        state.total_coins()
    );
    println!(
        "Aliens:         {} live, {} spawned, interval {} ticks",
        aliens,
        state.obstacles.spawn_count(),
        state.obstacles.spawn_interval()
    );
    println!("Peak nodes:     {}", peak_nodes);
    println!("Peak particles: {}", peak_particles);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}
