//! One-shot visual effects: death explosion, fireworks, confetti, victory banner
//!
//! Every effect is the same shape: a group node in the scene, a set of
//! particles stepped with [`Particle::step`], an optional flash, and a
//! retirement rule. Staggered sub-bursts are queued on a tick-keyed
//! [`Scheduler`] and re-check that their effect is still attached before
//! spawning anything.

use std::f32::consts::TAU;
use std::ops::Range;

use glam::Vec2;
use rand::Rng;

use super::collision::Rect;
use super::particles::{Particle, ParticleShape, Wobble};
use super::scene::{NodeId, NodeProps, Scene, Sprite};
use super::rand_in;
use super::schedule::Scheduler;
use crate::settings::Settings;
use crate::tuning::Bounds;
use crate::{ms_to_ticks, ticks_to_ms};

/// Explosion palette: red, orange, yellow
pub const EXPLOSION_COLORS: [u32; 3] = [0xFF0000, 0xFF6600, 0xFFCC00];
/// One of these per firework
pub const FIREWORK_COLORS: [u32; 6] = [0xFF0000, 0x00FF00, 0x0000FF, 0xFF00FF, 0xFFFF00, 0x00FFFF];
pub const CONFETTI_COLORS: [u32; 8] = [
    0xFF0000, 0x00FF00, 0x0000FF, 0xFF00FF, 0xFFFF00, 0x00FFFF, 0xFF6600, 0xCC00FF,
];

const WHITE: u32 = 0xFFFFFF;
const GOLD: u32 = 0xFFD700;

const FIREWORK_PARTICLES: usize = 50;
const FIREWORK_STAGGER_MS: f32 = 500.0;
const VICTORY_FIREWORKS: usize = 5;
const TRAIL_STAGGER_MS: f32 = 50.0;
const CONFETTI_PIECES: usize = 200;
const CONFETTI_STAGGER_MS: f32 = 10.0;
const CONFETTI_CEILING_MS: f32 = 8000.0;
const BANNER_LIFETIME_MS: f32 = 5000.0;

/// Opaque handle to a running effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectHandle(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Explosion,
    Firework,
    Confetti,
    Banner,
}

/// Flash behind a burst
#[derive(Debug, Clone)]
pub struct FlashConfig {
    pub radius: f32,
    pub alpha: f32,
}

/// Parameters for a radial burst
#[derive(Debug, Clone)]
pub struct ExplosionConfig {
    pub count: usize,
    pub colors: Vec<u32>,
    /// Initial offset from the origin on each axis (+/-)
    pub jitter: f32,
    pub speed: Range<f32>,
    pub size: Range<f32>,
    /// Spin range is `-rotation_speed..rotation_speed`
    pub rotation_speed: f32,
    pub gravity: Range<f32>,
    pub alpha: Range<f32>,
    pub fade: Range<f32>,
    pub flash: Option<FlashConfig>,
    /// Minimum lifetime even once every particle is gone
    pub linger_ticks: u64,
}

impl ExplosionConfig {
    /// The player-death burst
    pub fn death() -> Self {
        Self {
            count: 30,
            colors: EXPLOSION_COLORS.to_vec(),
            jitter: 10.0,
            speed: 1.0..6.0,
            size: 2.0..6.0,
            rotation_speed: 0.1,
            gravity: 0.1..0.2,
            alpha: 0.7..1.0,
            fade: 0.01..0.04,
            flash: Some(FlashConfig {
                radius: 50.0,
                alpha: 0.8,
            }),
            linger_ticks: 60,
        }
    }
}

impl Default for ExplosionConfig {
    fn default() -> Self {
        Self::death()
    }
}

#[derive(Debug)]
struct Flash {
    node: NodeId,
    alpha: f32,
    scale: f32,
}

impl Flash {
    fn step(&mut self, scene: &mut dyn Scene) {
        if self.alpha > 0.0 {
            self.alpha -= 0.1;
            self.scale += 0.1;
            scene.set_props(
                self.node,
                NodeProps {
                    alpha: self.alpha.max(0.0),
                    scale: self.scale,
                    ..NodeProps::default()
                },
            );
        }
    }
}

/// Floating "Victory!" text
#[derive(Debug)]
struct Banner {
    node: NodeId,
    pos: Vec2,
    alpha: f32,
}

impl Banner {
    fn step(&mut self, scene: &mut dyn Scene, now: u64) {
        self.alpha = (self.alpha + 0.02).min(1.0);
        self.pos.y -= 0.2;
        let pulse = 1.0 + (ticks_to_ms(now) / 200.0).sin() * 0.05;
        scene.set_props(
            self.node,
            NodeProps {
                pos: self.pos,
                alpha: self.alpha,
                rotation: 0.0,
                scale: pulse,
            },
        );
    }
}

/// A running effect
#[derive(Debug)]
pub struct Effect {
    handle: EffectHandle,
    kind: EffectKind,
    group: NodeId,
    origin: Vec2,
    particles: Vec<Particle>,
    flash: Option<Flash>,
    banner: Option<Banner>,
    elapsed: u64,
    /// Retire only once `elapsed > linger`
    linger: u64,
    /// Hard stop regardless of live particles
    ceiling: Option<u64>,
    /// Staggered spawns still queued for this effect
    pending_spawns: u32,
}

impl Effect {
    pub fn handle(&self) -> EffectHandle {
        self.handle
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    pub fn group(&self) -> NodeId {
        self.group
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    /// Attach `particle` under this effect's group and start tracking it
    fn adopt(&mut self, scene: &mut dyn Scene, sprite: Sprite, mut particle: Particle) {
        if let Some(node) = scene.attach(self.group, sprite, particle.props()) {
            particle.node = node;
            self.particles.push(particle);
        }
    }

    /// Integrate, then cull dead particles
    fn step(&mut self, scene: &mut dyn Scene, now: u64, bounds: &Rect) {
        self.elapsed += 1;
        if let Some(flash) = self.flash.as_mut() {
            flash.step(scene);
        }
        if let Some(banner) = self.banner.as_mut() {
            banner.step(scene, now);
        }

        for p in &mut self.particles {
            p.step();
        }

        let origin = self.origin;
        self.particles.retain(|p| {
            if p.is_dead(origin, bounds) {
                release(scene, p.node);
                false
            } else {
                scene.set_props(p.node, p.props());
                true
            }
        });
    }

    fn should_retire(&self) -> bool {
        if self.ceiling.is_some_and(|c| self.elapsed >= c) {
            return true;
        }
        self.particles.is_empty() && self.pending_spawns == 0 && self.elapsed > self.linger
    }
}

/// Deferred work for the effect scheduler
#[derive(Debug, Clone, Copy)]
enum Pending {
    TrailSpark(EffectHandle),
    ConfettiPiece(EffectHandle),
    /// A firework at a random spot in the upper half of the screen
    Firework,
}

/// Owns and drives every live effect
pub struct EffectSystem {
    bounds: Bounds,
    settings: Settings,
    effects: Vec<Effect>,
    pending: Scheduler<Pending>,
    next_handle: u32,
    now: u64,
}

impl EffectSystem {
    pub fn new(bounds: Bounds, settings: Settings) -> Self {
        Self {
            bounds,
            settings,
            effects: Vec::new(),
            pending: Scheduler::new(),
            next_handle: 1,
            now: 0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    /// Live effects in creation order
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn get(&self, handle: EffectHandle) -> Option<&Effect> {
        self.effects.iter().find(|e| e.handle == handle)
    }

    pub fn is_active(&self, handle: EffectHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Queued staggered spawns and delayed fireworks
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Particles alive across all effects
    pub fn particle_count(&self) -> usize {
        self.effects.iter().map(|e| e.particles.len()).sum()
    }

    /// Player death: the standard explosion at `pos`
    pub fn play_death_effect<R: Rng + ?Sized>(
        &mut self,
        scene: &mut dyn Scene,
        rng: &mut R,
        pos: Vec2,
    ) -> Option<EffectHandle> {
        log::info!("Death explosion at ({:.0}, {:.0})", pos.x, pos.y);
        self.play_explosion(scene, rng, pos, &ExplosionConfig::death())
    }

    /// Victory: staggered fireworks, a confetti shower and a banner.
    ///
    /// Returns the confetti handle, the longest-running part of the show.
    pub fn play_victory_effect<R: Rng + ?Sized>(
        &mut self,
        scene: &mut dyn Scene,
        rng: &mut R,
    ) -> Option<EffectHandle> {
        log::info!("Victory show: {} fireworks + confetti", VICTORY_FIREWORKS);
        for i in 0..VICTORY_FIREWORKS {
            let due = self.now + ms_to_ticks(i as f32 * FIREWORK_STAGGER_MS);
            self.pending.schedule(due, Pending::Firework);
        }
        let confetti = self.play_confetti(scene);
        self.play_banner(scene, "Victory!");
        confetti
    }

    /// Radial burst of particles with an optional flash
    pub fn play_explosion<R: Rng + ?Sized>(
        &mut self,
        scene: &mut dyn Scene,
        rng: &mut R,
        origin: Vec2,
        config: &ExplosionConfig,
    ) -> Option<EffectHandle> {
        let flash = config.flash.as_ref().map(|f| (f.radius, f.alpha));
        let mut effect = self.begin(scene, EffectKind::Explosion, origin, flash)?;
        effect.linger = config.linger_ticks;

        let count = self.settings.scaled_count(config.count);
        for _ in 0..count {
            let color = pick(rng, &config.colors);
            let shape = if rng.random::<f32>() > 0.5 {
                ParticleShape::Circle {
                    radius: rng.random_range(config.size.clone()),
                }
            } else {
                let side = rng.random_range(config.size.clone());
                ParticleShape::Rect { w: side, h: side }
            };

            let jitter = Vec2::new(
                rand_in(rng, -config.jitter, config.jitter),
                rand_in(rng, -config.jitter, config.jitter),
            );
            let angle = rng.random_range(0.0..TAU);
            let speed = rng.random_range(config.speed.clone());

            let mut p = Particle::new(NodeId::ROOT, jitter);
            p.vel = Vec2::new(angle.cos(), angle.sin()) * speed;
            p.rotation = rng.random_range(0.0..TAU);
            p.rotation_speed = rand_in(rng, -config.rotation_speed, config.rotation_speed);
            p.gravity = rng.random_range(config.gravity.clone());
            p.alpha = rng.random_range(config.alpha.clone());
            p.fade_speed = rng.random_range(config.fade.clone());
            effect.adopt(scene, Sprite::Particle { shape, color }, p);
        }

        Some(self.register(effect))
    }

    /// Ring burst in one color, followed by trailing white sparks
    pub fn play_firework<R: Rng + ?Sized>(
        &mut self,
        scene: &mut dyn Scene,
        rng: &mut R,
        origin: Vec2,
    ) -> Option<EffectHandle> {
        let mut effect = self.begin(scene, EffectKind::Firework, origin, Some((20.0, 1.0)))?;
        let color = pick(rng, &FIREWORK_COLORS);

        let count = self.settings.scaled_count(FIREWORK_PARTICLES);
        for i in 0..count {
            let radius = rng.random_range(2.0..4.0);
            let angle = (i as f32 / count as f32) * TAU;
            let variance = rng.random_range(0.5..1.0);
            let speed = rng.random_range(3.0..6.0);

            let mut p = Particle::new(NodeId::ROOT, Vec2::ZERO);
            p.vel = Vec2::new(angle.cos(), angle.sin()) * speed * variance;
            p.gravity = 0.05;
            p.fade_speed = rng.random_range(0.01..0.03);
            let shape = ParticleShape::Circle { radius };
            effect.adopt(scene, Sprite::Particle { shape, color }, p);
        }

        let handle = effect.handle;
        let trails = count / 2;
        effect.pending_spawns = trails as u32;
        for i in 0..trails {
            let due = self.now + ms_to_ticks(i as f32 * TRAIL_STAGGER_MS);
            self.pending.schedule(due, Pending::TrailSpark(handle));
        }

        Some(self.register(effect))
    }

    /// Confetti raining from above the screen, created in a steady trickle
    pub fn play_confetti(&mut self, scene: &mut dyn Scene) -> Option<EffectHandle> {
        let mut effect = self.begin(scene, EffectKind::Confetti, Vec2::ZERO, None)?;
        effect.ceiling = Some(ms_to_ticks(CONFETTI_CEILING_MS));

        let handle = effect.handle;
        let pieces = self.settings.scaled_count(CONFETTI_PIECES);
        effect.pending_spawns = pieces as u32;
        for i in 0..pieces {
            let due = self.now + ms_to_ticks(i as f32 * CONFETTI_STAGGER_MS);
            self.pending.schedule(due, Pending::ConfettiPiece(handle));
        }

        Some(self.register(effect))
    }

    fn play_banner(&mut self, scene: &mut dyn Scene, text: &str) -> Option<EffectHandle> {
        let mut effect = self.begin(scene, EffectKind::Banner, Vec2::ZERO, None)?;
        let lifetime = ms_to_ticks(BANNER_LIFETIME_MS);
        effect.linger = lifetime;
        effect.ceiling = Some(lifetime);

        let pos = Vec2::new(self.bounds.width / 2.0, self.bounds.height / 2.0 - 100.0);
        let sprite = Sprite::Text {
            text: text.to_string(),
            size: 64.0,
            color: GOLD,
        };
        let props = NodeProps {
            alpha: 0.0,
            ..NodeProps::at(pos)
        };
        if let Some(node) = scene.attach(effect.group, sprite, props) {
            effect.banner = Some(Banner {
                node,
                pos,
                alpha: 0.0,
            });
        }

        Some(self.register(effect))
    }

    /// Force-stop an effect, detaching its group now.
    ///
    /// Returns false if it had already retired.
    pub fn stop(&mut self, scene: &mut dyn Scene, handle: EffectHandle) -> bool {
        let Some(idx) = self.effects.iter().position(|e| e.handle == handle) else {
            return false;
        };
        let effect = self.effects.remove(idx);
        release(scene, effect.group);
        log::debug!("{:?} {:?} stopped early", effect.kind, handle);
        true
    }

    /// Stop everything, including effects that have not started yet
    pub fn stop_all(&mut self, scene: &mut dyn Scene) {
        for effect in self.effects.drain(..) {
            release(scene, effect.group);
        }
        self.pending.clear();
    }

    /// Advance every effect by one tick.
    ///
    /// Due staggered spawns run first, then each effect integrates and culls
    /// its particles, then finished effects are retired.
    pub fn update<R: Rng + ?Sized>(&mut self, scene: &mut dyn Scene, rng: &mut R, now: u64) {
        self.now = now;
        while let Some(event) = self.pending.pop_due(now) {
            self.fire(scene, rng, event);
        }

        let bounds = self.bounds.rect();
        for effect in &mut self.effects {
            effect.step(scene, now, &bounds);
        }

        self.effects.retain(|effect| {
            if effect.should_retire() {
                release(scene, effect.group);
                log::debug!(
                    "{:?} {:?} retired after {} ticks",
                    effect.kind,
                    effect.handle,
                    effect.elapsed
                );
                false
            } else {
                true
            }
        });
    }

    fn fire<R: Rng + ?Sized>(&mut self, scene: &mut dyn Scene, rng: &mut R, event: Pending) {
        match event {
            Pending::Firework => {
                let x = rand_in(rng, 100.0, self.bounds.width - 100.0);
                let y = rand_in(rng, 100.0, 100.0 + self.bounds.height / 2.0);
                self.play_firework(scene, rng, Vec2::new(x, y));
            }
            Pending::TrailSpark(handle) => {
                if let Some(effect) = self.attached_mut(scene, handle) {
                    let angle = rng.random_range(0.0..TAU);
                    let distance = rng.random_range(0.0..30.0);
                    let mut p = Particle::new(
                        NodeId::ROOT,
                        Vec2::new(angle.cos(), angle.sin()) * distance,
                    );
                    p.alpha = 0.7;
                    p.fade_speed = 0.05;
                    let shape = ParticleShape::Circle {
                        radius: rng.random_range(1.0..2.0),
                    };
                    effect.adopt(scene, Sprite::Particle { shape, color: WHITE }, p);
                }
            }
            Pending::ConfettiPiece(handle) => {
                let width = self.bounds.width;
                if let Some(effect) = self.attached_mut(scene, handle) {
                    let color = pick(rng, &CONFETTI_COLORS);
                    let shape = if rng.random::<f32>() > 0.5 {
                        ParticleShape::Rect {
                            w: rng.random_range(5.0..15.0),
                            h: rng.random_range(5.0..15.0),
                        }
                    } else {
                        ParticleShape::Circle {
                            radius: rng.random_range(3.0..8.0),
                        }
                    };

                    let start = Vec2::new(rand_in(rng, 0.0, width), -20.0);
                    let mut p = Particle::new(NodeId::ROOT, start);
                    p.rotation = rng.random_range(0.0..TAU);
                    p.vel = Vec2::new(rng.random_range(-1.0..1.0), rng.random_range(1.0..4.0));
                    p.rotation_speed = rng.random_range(-0.1..0.1);
                    p.wobble = Some(Wobble {
                        speed: rng.random_range(0.01..0.06),
                        strength: rng.random_range(0.5..2.0),
                        phase: rng.random_range(0.0..TAU),
                    });
                    effect.adopt(scene, Sprite::Particle { shape, color }, p);
                }
            }
        }
    }

    /// The effect behind a staggered spawn, if it is still live and attached.
    ///
    /// Consumes one of the effect's outstanding spawns either way.
    fn attached_mut(&mut self, scene: &dyn Scene, handle: EffectHandle) -> Option<&mut Effect> {
        let Some(effect) = self.effects.iter_mut().find(|e| e.handle == handle) else {
            log::debug!("Staggered spawn for retired {:?} dropped", handle);
            return None;
        };
        effect.pending_spawns = effect.pending_spawns.saturating_sub(1);
        if !scene.is_attached(effect.group) {
            log::debug!("Staggered spawn for detached {:?} dropped", handle);
            return None;
        }
        Some(effect)
    }

    /// Create the group (and flash) for a new effect
    fn begin(
        &mut self,
        scene: &mut dyn Scene,
        kind: EffectKind,
        origin: Vec2,
        flash: Option<(f32, f32)>,
    ) -> Option<Effect> {
        let group = scene.create_group(origin)?;
        let handle = EffectHandle(self.next_handle);
        self.next_handle += 1;

        let flash = flash
            .filter(|_| self.settings.effective_flashes())
            .and_then(|(radius, alpha)| {
                let sprite = Sprite::Flash {
                    radius,
                    color: WHITE,
                };
                let props = NodeProps {
                    alpha,
                    ..NodeProps::default()
                };
                scene.attach(group, sprite, props).map(|node| Flash {
                    node,
                    alpha,
                    scale: 1.0,
                })
            });

        Some(Effect {
            handle,
            kind,
            group,
            origin,
            particles: Vec::new(),
            flash,
            banner: None,
            elapsed: 0,
            linger: 0,
            ceiling: None,
            pending_spawns: 0,
        })
    }

    fn register(&mut self, effect: Effect) -> EffectHandle {
        let handle = effect.handle;
        self.effects.push(effect);
        handle
    }
}

/// Detach a node unless the presentation layer already removed it
fn release(scene: &mut dyn Scene, node: NodeId) {
    if scene.is_attached(node) {
        scene.detach(node);
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, colors: &[u32]) -> u32 {
    if colors.is_empty() {
        return WHITE;
    }
    colors[rng.random_range(0..colors.len())]
}
