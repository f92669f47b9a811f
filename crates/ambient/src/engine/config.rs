//! All the variables that can be configured for the particle engine.
//!
//! None of these values carry any meaning beyond how the effect looks. The two presets were tuned
//! by eye.

use ambient_protocol::Colour;
use color_eyre::eyre::{bail, Result};

/// Inclusive lower and upper bounds for a randomised value. The order of the bounds doesn't
/// matter.
pub type Range = (f32, f32);

/// The named bundles of configuration.
#[derive(
    serde::Serialize, serde::Deserialize, clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq,
)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Preset {
    /// Small gold and orange sparks that float up and shrink, with a white-hot core at the
    /// pointer.
    Ember,
    /// Large, faint, grey puffs that float up and expand.
    Smoke,
}

impl Preset {
    /// The engine config for this preset.
    #[must_use]
    pub fn config(self) -> Config {
        match self {
            Self::Ember => Config::ember(),
            Self::Smoke => Config::smoke(),
        }
    }
}

/// How the size of a particle changes every tick.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum SizeEvolution {
    /// Multiply the size by `factor` every tick.
    Shrink {
        /// Must be between 0 and 1, exclusive.
        factor: f32,
    },
    /// Add `rate` to the size every tick.
    Grow {
        /// Must be positive.
        rate: f32,
    },
}

/// A soft halo drawn underneath the core marker.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    /// Radius of the halo.
    pub radius: f32,
    /// Colour of the halo, the alpha channel is its opacity.
    pub colour: Colour,
}

/// The persistent marker drawn at the last known pointer position. It is not a particle and never
/// expires.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct CoreMarker {
    /// Radius of the marker.
    pub radius: f32,
    /// Fill colour.
    pub colour: Colour,
    /// Optional halo.
    pub glow: Option<Glow>,
}

/// All the config for the particle engine.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
#[non_exhaustive]
pub struct Config {
    /// Particles appended per pointer-move event.
    pub spawn_per_move: usize,
    /// Width of the square area around the pointer in which particles are spawned.
    pub jitter: f32,
    /// Bounds for the initial horizontal drift.
    pub velocity_range_x: Range,
    /// Bounds for the initial vertical drift. Negative values rise up the screen.
    pub velocity_range_y: Range,
    /// Bounds for the initial radius.
    pub size_range: Range,
    /// How the radius changes every tick.
    pub size_evolution: SizeEvolution,
    /// Bounds for the amount of life lost every tick.
    pub decay_range: Range,
    /// The colours that particles are randomly given.
    pub palette: Vec<Colour>,
    /// Multiplied with a particle's life to get its opacity.
    pub alpha_scale: f32,
    /// The persistent marker at the pointer.
    pub core: Option<CoreMarker>,
    /// The maximum number of live particles. The oldest are dropped first.
    pub max_live: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self::ember()
    }
}

/// Convert the familiar 0-255 RGB notation into a colour.
#[expect(
    clippy::as_conversions,
    reason = "`f32::from(u8)` isn't const, and every u8 fits losslessly in an f32"
)]
const fn rgb(red: u8, green: u8, blue: u8) -> Colour {
    (
        red as f32 / 255.0,
        green as f32 / 255.0,
        blue as f32 / 255.0,
        1.0,
    )
}

impl Config {
    /// The default cap on live particles for the presets.
    pub const DEFAULT_MAX_LIVE: usize = 2000;

    /// Gold and orange sparks.
    #[must_use]
    pub fn ember() -> Self {
        Self {
            spawn_per_move: 3,
            jitter: 0.0,
            velocity_range_x: (-0.75, 0.75),
            velocity_range_y: (-2.0, -0.5),
            size_range: (1.0, 4.0),
            size_evolution: SizeEvolution::Shrink { factor: 0.95 },
            decay_range: (0.01, 0.04),
            palette: vec![rgb(255, 215, 0), rgb(245, 127, 23)],
            alpha_scale: 1.0,
            core: Some(CoreMarker {
                radius: 4.0,
                colour: rgb(255, 255, 255),
                glow: Some(Glow {
                    radius: 15.0,
                    colour: (1.0, 215.0 / 255.0, 0.0, 0.35),
                }),
            }),
            max_live: Some(Self::DEFAULT_MAX_LIVE),
        }
    }

    /// Grey and blue-grey smoke.
    #[must_use]
    pub fn smoke() -> Self {
        Self {
            spawn_per_move: 2,
            jitter: 10.0,
            velocity_range_x: (-0.5, 0.5),
            velocity_range_y: (-2.5, -0.5),
            size_range: (5.0, 20.0),
            size_evolution: SizeEvolution::Grow { rate: 0.2 },
            decay_range: (0.01, 0.03),
            palette: vec![rgb(150, 150, 150), rgb(100, 120, 140)],
            alpha_scale: 0.3,
            core: None,
            max_live: Some(Self::DEFAULT_MAX_LIVE),
        }
    }

    /// Check that the config describes an effect that actually terminates and renders.
    ///
    /// # Errors
    /// When any value is out of its allowed range.
    pub fn validate(&self) -> Result<()> {
        let ranges = [
            ("velocity_range_x", self.velocity_range_x),
            ("velocity_range_y", self.velocity_range_y),
            ("size_range", self.size_range),
            ("decay_range", self.decay_range),
        ];
        for (name, range) in ranges {
            if !range.0.is_finite() || !range.1.is_finite() {
                bail!("`{name}` must only contain finite numbers, got {range:?}");
            }
            if !(range.1 - range.0).is_finite() {
                bail!("`{name}` is too wide to sample from, got {range:?}");
            }
        }

        if self.palette.is_empty() {
            bail!("`palette` needs at least one colour");
        }

        if self.decay_range.0.min(self.decay_range.1) <= 0.0 {
            bail!(
                "`decay_range` must be strictly positive, otherwise particles never expire, got {:?}",
                self.decay_range
            );
        }

        if self.size_range.0.min(self.size_range.1) < 0.0 {
            bail!("`size_range` can't be negative, got {:?}", self.size_range);
        }

        if !self.jitter.is_finite() || self.jitter < 0.0 {
            bail!("`jitter` must be a positive number, got {}", self.jitter);
        }

        if !self.alpha_scale.is_finite() || self.alpha_scale < 0.0 {
            bail!(
                "`alpha_scale` must be a positive number, got {}",
                self.alpha_scale
            );
        }

        match self.size_evolution {
            SizeEvolution::Shrink { factor } => {
                if !(factor > 0.0 && factor < 1.0) {
                    bail!("A shrink factor must be between 0 and 1, got {factor}");
                }
            }
            SizeEvolution::Grow { rate } => {
                if !rate.is_finite() || rate < 0.0 {
                    bail!("A growth rate must be a positive number, got {rate}");
                }
            }
        }

        if self.max_live == Some(0) {
            bail!("`max_live` must allow at least one particle");
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn presets_are_valid() {
        Preset::Ember.config().validate().unwrap();
        Preset::Smoke.config().validate().unwrap();
    }

    #[test]
    fn presets_differ_in_size_evolution() {
        assert!(matches!(
            Preset::Ember.config().size_evolution,
            SizeEvolution::Shrink { .. }
        ));
        assert!(matches!(
            Preset::Smoke.config().size_evolution,
            SizeEvolution::Grow { .. }
        ));
    }

    #[test]
    fn rejects_empty_palette() {
        let config = Config {
            palette: Vec::new(),
            ..Config::ember()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_decay() {
        let config = Config {
            decay_range: (0.0, 0.01),
            ..Config::ember()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_shrink_factor() {
        for factor in [0.0, 1.0, 1.5, f32::NAN] {
            let config = Config {
                size_evolution: SizeEvolution::Shrink { factor },
                ..Config::ember()
            };
            assert!(config.validate().is_err(), "{factor} should be rejected");
        }
    }

    #[test]
    fn rejects_negative_growth() {
        let config = Config {
            size_evolution: SizeEvolution::Grow { rate: -0.1 },
            ..Config::smoke()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_max_live() {
        let config = Config {
            max_live: Some(0),
            ..Config::ember()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_infinite_velocity() {
        let config = Config {
            velocity_range_x: (f32::NEG_INFINITY, 1.0),
            ..Config::ember()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_overflowing_range() {
        let config = Config {
            velocity_range_x: (-3e38, 3e38),
            ..Config::ember()
        };
        assert!(config.validate().is_err());

        let wide = Config {
            velocity_range_x: (-1e38, 1e38),
            ..Config::ember()
        };
        assert!(wide.validate().is_ok());
        let mut engine = crate::engine::main::Engine::with_seed(wide, 1);
        engine.on_pointer_move(0.0, 0.0);
        assert_eq!(engine.live_count(), 3);
    }

    #[test]
    fn missing_max_live_keeps_the_default_cap() {
        let config: Config = toml::from_str("spawn_per_move = 1").unwrap();
        assert_eq!(config.max_live, Some(Config::DEFAULT_MAX_LIVE));
    }

    #[test]
    fn deserialises_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            spawn_per_move = 5
            size_evolution = { kind = "grow", rate = 0.5 }
            palette = [[1.0, 0.0, 0.0, 1.0]]
            "#,
        )
        .unwrap();

        assert_eq!(config.spawn_per_move, 5);
        assert_eq!(config.size_evolution, SizeEvolution::Grow { rate: 0.5 });
        assert_eq!(config.palette, vec![(1.0, 0.0, 0.0, 1.0)]);
        assert_eq!(config.decay_range, Config::ember().decay_range);
    }
}
