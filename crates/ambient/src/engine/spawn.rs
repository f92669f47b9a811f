//! Functions that add and remove particles

use glam::Vec2;
use rand::seq::SliceRandom as _;
use rand::Rng as _;

use super::{config::Range, main::Engine, particle::Particle};

/// Used when a palette is empty. Validated configs never have an empty palette.
const WHITE: ambient_protocol::Colour = (1.0, 1.0, 1.0, 1.0);

impl Engine {
    /// The pointer moved, so record where it is and spawn a new batch of particles there.
    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        let pointer = Vec2::new(x, y);
        self.pointer = Some(pointer);

        let batch = self
            .config
            .max_live
            .map_or(self.config.spawn_per_move, |max_live| {
                self.config.spawn_per_move.min(max_live)
            });
        for _ in 0..batch {
            let particle = self.new_particle(pointer);
            self.particles.push_front(particle);
        }

        self.remove_old_particles();
    }

    /// Remove first-in particles until the live set is within its cap.
    pub fn remove_old_particles(&mut self) {
        let Some(max_live) = self.config.max_live else {
            return;
        };

        if self.particles.len() <= max_live {
            return;
        }

        let excess = self.particles.len() - max_live;
        tracing::trace!("Live set over its cap, dropping the {excess} oldest particles");
        self.particles.truncate(max_live);
    }

    /// A particle with all its properties randomised within the configured ranges.
    fn new_particle(&mut self, pointer: Vec2) -> Particle {
        let half_jitter = self.config.jitter / 2.0;
        let jitter_range = (-half_jitter, half_jitter);
        let position = pointer
            + Vec2::new(
                self.sample(jitter_range),
                self.sample(jitter_range),
            );
        let velocity = Vec2::new(
            self.sample(self.config.velocity_range_x),
            self.sample(self.config.velocity_range_y),
        );
        let size = self.sample(self.config.size_range);
        let decay = self.sample(self.config.decay_range);
        let colour = self
            .config
            .palette
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(WHITE);

        Particle::new(position, velocity, size, decay, colour)
    }

    /// A uniformly random value between the bounds of the range, inclusive.
    #[expect(
        clippy::float_cmp,
        reason = "Identical bounds have only one possible value"
    )]
    fn sample(&mut self, range: Range) -> f32 {
        let low = range.0.min(range.1);
        let high = range.0.max(range.1);

        if low == high {
            return low;
        }

        self.rng.gen_range(low..=high)
    }
}
