//! A single particle of ember or smoke.

use ambient_protocol::Colour;
use glam::Vec2;

use super::config::SizeEvolution;

/// A single particle.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Particle {
    /// Screen-space position. The y-axis grows downwards.
    pub position: Vec2,
    /// Distance travelled per tick. Constant for the particle's lifetime.
    pub velocity: Vec2,
    /// Radius.
    pub size: f32,
    /// Starts at 1.0. The particle is removed once this reaches 0.
    pub life: f32,
    /// Life lost per tick.
    pub decay: f32,
    /// Base colour, the alpha channel is replaced by the particle's life when rendering.
    pub colour: Colour,
    /// The most rounding error that `life` can have picked up so far. Repeatedly subtracting
    /// `f32` decay rates drifts a little every step, so a decay of exactly `d` would otherwise
    /// sometimes need one tick more than `ceil(1 / d)`.
    rounding: f32,
}

impl Particle {
    /// A brand new particle with full life.
    #[must_use]
    pub const fn new(position: Vec2, velocity: Vec2, size: f32, decay: f32, colour: Colour) -> Self {
        Self {
            position,
            velocity,
            size,
            life: 1.0,
            decay,
            colour,
            rounding: f32::EPSILON,
        }
    }

    /// Advance the particle by `dt` ticks.
    pub fn step(&mut self, dt: f32, evolution: SizeEvolution) {
        self.position += self.velocity * dt;
        if dt > 0.0 {
            self.life -= self.decay * dt;
            self.rounding += f32::EPSILON;
        }
        self.size = match evolution {
            SizeEvolution::Shrink { factor } => self.size * factor.powf(dt),
            SizeEvolution::Grow { rate } => rate.mul_add(dt, self.size),
        };
    }

    /// Whether the particle has run out of life. Anything left within the accumulated rounding
    /// error counts as nothing.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.life <= self.rounding
    }

    /// The colour to draw the particle with.
    #[must_use]
    pub fn fill_colour(&self, alpha_scale: f32) -> Colour {
        let alpha = (self.life * alpha_scale).clamp(0.0, 1.0);
        (self.colour.0, self.colour.1, self.colour.2, alpha)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn particle(decay: f32) -> Particle {
        Particle::new(
            Vec2::new(10.0, 10.0),
            Vec2::new(1.0, -1.0),
            4.0,
            decay,
            (1.0, 1.0, 1.0, 1.0),
        )
    }

    #[test]
    fn step_moves_and_decays() {
        let mut particle = particle(0.25);
        particle.step(1.0, SizeEvolution::Grow { rate: 0.5 });
        assert_eq!(particle.position, Vec2::new(11.0, 9.0));
        assert_eq!(particle.life, 0.75);
        assert_eq!(particle.size, 4.5);
    }

    #[test]
    fn step_scales_with_dt() {
        let mut particle = particle(0.25);
        particle.step(2.0, SizeEvolution::Shrink { factor: 0.5 });
        assert_eq!(particle.position, Vec2::new(12.0, 8.0));
        assert_eq!(particle.life, 0.5);
        assert_eq!(particle.size, 1.0);
    }

    #[test]
    fn expires_at_zero() {
        let mut particle = particle(0.5);
        particle.step(1.0, SizeEvolution::Grow { rate: 0.0 });
        assert!(!particle.is_expired());
        particle.step(1.0, SizeEvolution::Grow { rate: 0.0 });
        assert!(particle.is_expired());
    }

    /// Ticks until a particle with the given decay is expired.
    fn lifetime(decay: f32) -> usize {
        let mut particle = particle(decay);
        let mut ticks = 0;
        while !particle.is_expired() {
            particle.step(1.0, SizeEvolution::Grow { rate: 0.0 });
            ticks += 1;
        }
        ticks
    }

    #[test]
    fn lives_for_exactly_the_ceiling_of_its_inverse_decay() {
        assert_eq!(lifetime(0.01), 100);
        assert_eq!(lifetime(0.03), 34);
        assert_eq!(lifetime(0.1), 10);
        assert_eq!(lifetime(0.3), 4);
    }

    #[test]
    fn a_sliver_of_life_is_still_life() {
        let mut particle = particle(0.333_31);
        for _ in 0..3 {
            particle.step(1.0, SizeEvolution::Grow { rate: 0.0 });
        }
        assert!(particle.life > 0.0);
        assert!(!particle.is_expired());

        particle.step(1.0, SizeEvolution::Grow { rate: 0.0 });
        assert!(particle.is_expired());
        assert_eq!(lifetime(0.333_31), 4);
    }

    #[test]
    fn zero_dt_changes_nothing() {
        let mut particle = particle(0.5);
        let before = particle.clone();
        particle.step(0.0, SizeEvolution::Grow { rate: 0.0 });
        assert_eq!(particle, before);
    }

    #[test]
    fn fill_colour_uses_life_as_alpha() {
        let mut particle = particle(0.5);
        particle.step(1.0, SizeEvolution::Grow { rate: 0.0 });
        assert_eq!(particle.fill_colour(1.0), (1.0, 1.0, 1.0, 0.5));
        assert_eq!(particle.fill_colour(0.3), (1.0, 1.0, 1.0, 0.15));
    }
}
