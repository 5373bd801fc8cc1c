//! wasm-bindgen bridge for the browser frontend
//!
//! JS owns the canvas and DOM. Each animation frame it calls [`WebGame::frame`],
//! draws the JSON scene snapshot and applies the drained HUD events.

use wasm_bindgen::prelude::*;

use super::GameHost;
use crate::settings::{QualityPreset, Settings};
use crate::sim::GamePhase;
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Already initialized by a previous module instance
        return;
    }
    log::info!("Alien Runner starting...");
}

#[wasm_bindgen]
pub struct WebGame {
    host: GameHost,
    settings: Settings,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32, tuning_json: Option<String>) -> WebGame {
        let seed = js_sys::Date::now() as u64;
        let settings = Settings::load();
        let tuning = Tuning::for_canvas(width, height, tuning_json.as_deref());
        WebGame {
            host: GameHost::new(seed, tuning, settings.clone()),
            settings,
        }
    }

    /// Advance to a `requestAnimationFrame` timestamp; returns ticks run
    pub fn frame(&mut self, time_ms: f64) -> u32 {
        self.host.frame(time_ms)
    }

    /// Returns true when the key was consumed (caller should preventDefault)
    pub fn key_down(&mut self, key: &str) -> bool {
        self.host.keys.key_down(key)
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        self.host.keys.key_up(key)
    }

    pub fn set_idle_mode(&mut self, on: bool) {
        self.host.keys.set_idle_mode(on);
    }

    /// Canvas resized: move the ground and effect culling bounds
    pub fn resize(&mut self, width: f32, height: f32) {
        self.host.resize(width, height);
    }

    /// Tab visible again: drop the time spent hidden
    pub fn resume(&mut self) {
        self.host.resume();
    }

    /// Restart button on the end screens
    pub fn restart(&mut self) {
        self.host.state.restart(&mut self.host.scene);
    }

    /// Flat list of visible nodes in world space
    pub fn scene_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.host.scene.snapshot())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn drain_events_json(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.host.drain_events())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Player box and coin states for the canvas layer
    pub fn world_json(&self) -> Result<String, JsValue> {
        let state = &self.host.state;
        let coins: Vec<_> = state
            .coins
            .iter()
            .filter(|c| !c.collected)
            .map(|c| (c.pos.x, c.pos.y))
            .collect();
        let world = serde_json::json!({
            "player": state.player.visible.then(|| state.player.rect()),
            "ground": state.ground,
            "platforms": state.tuning.platforms,
            "coins": coins,
        });
        serde_json::to_string(&world).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn score(&self) -> u32 {
        self.host.state.display_score() as u32
    }

    pub fn coins_collected(&self) -> u32 {
        self.host.state.coins_collected() as u32
    }

    pub fn total_coins(&self) -> u32 {
        self.host.state.total_coins() as u32
    }

    pub fn phase(&self) -> String {
        match self.host.state.phase {
            GamePhase::Playing => "playing",
            GamePhase::GameOver => "game_over",
            GamePhase::Victory => "victory",
        }
        .to_string()
    }

    pub fn quality(&self) -> String {
        self.settings.quality.as_str().to_string()
    }

    /// Switch quality preset and persist it; returns false for unknown names
    pub fn set_quality(&mut self, name: &str) -> bool {
        let Some(preset) = QualityPreset::from_str(name) else {
            return false;
        };
        self.settings.quality = preset;
        self.settings.save();
        self.host.state.effects.set_settings(self.settings.clone());
        true
    }

    pub fn set_reduced_motion(&mut self, on: bool) {
        self.settings.reduced_motion = on;
        self.settings.save();
        self.host.state.effects.set_settings(self.settings.clone());
    }
}
