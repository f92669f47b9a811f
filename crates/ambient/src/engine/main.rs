//! The particle engine. It owns the live set, advances it once per tick and draws it onto a
//! surface.

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng as _;

use super::{config::Config, particle::Particle};
use crate::surface::Surface;

/// The ambient particle engine.
///
/// There are no failure modes here. The only resource to worry about is the live set, which is
/// bounded by [`Config::max_live`] and emptied by [`Engine::tick`].
#[derive(Debug)]
pub struct Engine {
    /// All the config for the engine.
    pub(crate) config: Config,
    /// The particles that haven't expired yet. The newest are at the front.
    pub(crate) particles: VecDeque<Particle>,
    /// The last known position of the pointer.
    pub(crate) pointer: Option<Vec2>,
    /// Source of all the randomness at spawn time.
    pub(crate) rng: rand::rngs::StdRng,
}

impl Engine {
    /// Instantiate with fresh randomness.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_rng(config, rand::rngs::StdRng::from_entropy())
    }

    /// Instantiate with reproducible randomness.
    #[must_use]
    pub fn with_seed(config: Config, seed: u64) -> Self {
        Self::with_rng(config, rand::rngs::StdRng::seed_from_u64(seed))
    }

    /// Instantiate from one of the named presets.
    #[must_use]
    pub fn from_preset(preset: super::config::Preset) -> Self {
        Self::new(preset.config())
    }

    /// Instantiate with the given random number generator.
    const fn with_rng(config: Config, rng: rand::rngs::StdRng) -> Self {
        Self {
            config,
            particles: VecDeque::new(),
            pointer: None,
            rng,
        }
    }

    /// The engine's config.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The live set, newest first.
    #[must_use]
    pub const fn particles(&self) -> &VecDeque<Particle> {
        &self.particles
    }

    /// How many particles are currently alive.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.particles.len()
    }

    /// The last known position of the pointer.
    #[must_use]
    pub const fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    /// Forget everything, ready to start from scratch.
    pub fn reset(&mut self) {
        self.particles.clear();
        self.pointer = None;
    }

    /// Advance every live particle by `dt` ticks and remove any that expire.
    ///
    /// A `dt` of 1.0 is one nominal frame. Negative or non-finite values are treated as 0.
    pub fn tick(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let evolution = self.config.size_evolution;

        for particle in &mut self.particles {
            particle.step(dt, evolution);
        }

        let before = self.particles.len();
        self.particles.retain(|particle| !particle.is_expired());
        let expired = before - self.particles.len();
        if expired > 0 {
            tracing::trace!("Removed {expired} expired particles");
        }
    }

    /// Draw the current state of the engine onto a surface. This never changes the engine, so
    /// drawing the same state twice gives the same output.
    #[expect(
        clippy::cast_precision_loss,
        clippy::as_conversions,
        reason = "Surface dimensions are far below the precision limits of f32"
    )]
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        let (width, height) = surface.dimensions();
        surface.clear_rect(0.0, 0.0, width as f32, height as f32);

        if let (Some(core), Some(pointer)) = (self.config.core, self.pointer) {
            if let Some(glow) = core.glow {
                surface.fill_circle(pointer.into(), glow.radius, glow.colour);
            }
            surface.fill_circle(pointer.into(), core.radius, core.colour);
        }

        // Oldest first so that fresh particles are drawn on top.
        for particle in self.particles.iter().rev() {
            surface.fill_circle(
                particle.position.into(),
                particle.size,
                particle.fill_colour(self.config.alpha_scale),
            );
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::engine::config::{Preset, SizeEvolution};
    use crate::surface::Recorder;
    use ambient_protocol::DrawCall;

    /// A config with no randomness at all.
    fn deterministic(decay: f32) -> Config {
        Config {
            spawn_per_move: 3,
            jitter: 0.0,
            velocity_range_x: (0.0, 0.0),
            velocity_range_y: (-1.0, -1.0),
            size_range: (4.0, 4.0),
            decay_range: (decay, decay),
            ..Config::ember()
        }
    }

    #[test]
    fn spawn_count_without_ticks() {
        let mut engine = Engine::with_seed(Config::smoke(), 1);
        for i in 0u8..7 {
            engine.on_pointer_move(f32::from(i), 0.0);
        }
        assert_eq!(engine.live_count(), 14);
    }

    #[test]
    fn removed_after_exactly_ceil_ticks() {
        for (decay, expected_ticks) in [(0.01, 100), (0.25, 4), (0.3, 4), (0.03, 34), (0.1, 10)] {
            let mut engine = Engine::with_seed(deterministic(decay), 1);
            engine.on_pointer_move(0.0, 0.0);

            for tick in 1..expected_ticks {
                engine.tick(1.0);
                assert_eq!(
                    engine.live_count(),
                    3,
                    "decay {decay} removed particles early at tick {tick}"
                );
                assert!(engine.particles().iter().all(|particle| particle.life > 0.0));
            }

            engine.tick(1.0);
            assert_eq!(
                engine.live_count(),
                0,
                "decay {decay} didn't remove particles at tick {expected_ticks}"
            );
        }
    }

    #[test]
    fn rising_particles_scenario() {
        let mut engine = Engine::with_seed(deterministic(0.01), 1);
        engine.on_pointer_move(100.0, 100.0);
        assert_eq!(engine.live_count(), 3);

        for _ in 0..99 {
            engine.tick(1.0);
        }
        for particle in engine.particles() {
            assert!((particle.position.y - 1.0).abs() < 0.001);
            assert!((particle.position.x - 100.0).abs() < 0.001);
            assert!(particle.life < 0.02);
        }

        engine.tick(1.0);
        assert_eq!(engine.live_count(), 0);
    }

    #[test]
    fn embers_strictly_shrink() {
        let mut engine = Engine::with_seed(Preset::Ember.config(), 7);
        engine.on_pointer_move(50.0, 50.0);
        let mut sizes: Vec<f32> = engine.particles().iter().map(|p| p.size).collect();

        while engine.live_count() > 0 {
            engine.tick(1.0);
            if engine.live_count() < sizes.len() {
                break;
            }
            let next: Vec<f32> = engine.particles().iter().map(|p| p.size).collect();
            for (before, after) in sizes.iter().zip(&next) {
                assert!(after < before, "{after} should be smaller than {before}");
            }
            sizes = next;
        }
    }

    #[test]
    fn smoke_strictly_grows() {
        let mut engine = Engine::with_seed(Preset::Smoke.config(), 7);
        engine.on_pointer_move(50.0, 50.0);
        let mut sizes: Vec<f32> = engine.particles().iter().map(|p| p.size).collect();

        while engine.live_count() > 0 {
            engine.tick(1.0);
            if engine.live_count() < sizes.len() {
                break;
            }
            let next: Vec<f32> = engine.particles().iter().map(|p| p.size).collect();
            for (before, after) in sizes.iter().zip(&next) {
                assert!(after > before, "{after} should be bigger than {before}");
            }
            sizes = next;
        }
    }

    #[test]
    fn render_is_idempotent() {
        let mut engine = Engine::with_seed(Preset::Ember.config(), 3);
        engine.on_pointer_move(10.0, 10.0);
        engine.on_pointer_move(12.0, 14.0);
        engine.tick(1.0);

        let mut first = Recorder::new(80, 48);
        let mut second = Recorder::new(80, 48);
        engine.render(&mut first);
        engine.render(&mut second);
        assert_eq!(first.calls(), second.calls());
        assert_eq!(engine.live_count(), 6);
    }

    #[test]
    fn render_draws_core_then_particles() {
        let config = Config {
            size_evolution: SizeEvolution::Grow { rate: 0.0 },
            ..deterministic(0.5)
        };
        let mut engine = Engine::with_seed(config, 3);
        engine.on_pointer_move(10.0, 20.0);
        engine.tick(1.0);

        let mut recorder = Recorder::new(80, 48);
        engine.render(&mut recorder);
        let calls = recorder.calls();

        assert_eq!(
            calls[0],
            DrawCall::ClearRect {
                x: 0.0,
                y: 0.0,
                width: 80.0,
                height: 48.0
            }
        );
        // Clear, glow, core, then the 3 particles.
        assert_eq!(calls.len(), 6);
        let DrawCall::FillCircle { centre, radius, .. } = calls[2] else {
            panic!("Expected the core marker, got {:?}", calls[2]);
        };
        assert_eq!(centre, (10.0, 20.0));
        assert_eq!(radius, 4.0);
        for call in &calls[3..] {
            let DrawCall::FillCircle { colour, centre, .. } = call else {
                panic!("Expected a circle, got {call:?}");
            };
            assert_eq!(colour.3, 0.5);
            assert_eq!(*centre, (10.0, 19.0));
        }
    }

    #[test]
    fn no_core_before_the_pointer_is_known() {
        let engine = Engine::with_seed(Preset::Ember.config(), 3);
        let mut recorder = Recorder::new(10, 10);
        engine.render(&mut recorder);
        assert_eq!(recorder.calls().len(), 1);
    }

    #[test]
    fn smoke_has_no_core() {
        let mut engine = Engine::with_seed(Preset::Smoke.config(), 3);
        engine.on_pointer_move(5.0, 5.0);
        let mut recorder = Recorder::new(10, 10);
        engine.render(&mut recorder);
        assert_eq!(recorder.calls().len(), 3);
    }

    #[test]
    fn bad_dt_is_ignored() {
        let mut engine = Engine::with_seed(deterministic(0.5), 3);
        engine.on_pointer_move(5.0, 5.0);
        engine.tick(f32::NAN);
        engine.tick(-3.0);
        engine.tick(f32::INFINITY);
        assert_eq!(engine.live_count(), 3);
        assert!(engine.particles().iter().all(|particle| particle.life == 1.0));
    }

    #[test]
    fn reset_empties_everything() {
        let mut engine = Engine::with_seed(Preset::Ember.config(), 3);
        engine.on_pointer_move(5.0, 5.0);
        engine.reset();
        assert_eq!(engine.live_count(), 0);
        assert!(engine.pointer().is_none());
    }
}
