//! All of the user config for Ambient.

use color_eyre::eyre::ContextCompat as _;
use color_eyre::eyre::Result;

use crate::engine::config::Preset;
use crate::runner::OutputMode;

/// A copy of the default config file. It gets copied to the user's config folder the first time
/// they start Ambient.
static DEFAULT_CONFIG: &str = include_str!("../../default_config.toml");

/// The name of the main config file.
pub const DEFAULT_CONFIG_FILE_NAME: &str = "ambient.toml";

/// The valid log levels. Based on our `tracing` crate.
#[derive(serde::Serialize, serde::Deserialize, clap::ValueEnum, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error
    Error,
    /// Warnings
    Warn,
    /// Info
    Info,
    /// Debug
    Debug,
    /// Trace
    Trace,
    /// No logging
    Off,
}

/// Managing user config.
#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
#[non_exhaustive]
pub struct Config {
    /// The maximum log level
    pub log_level: LogLevel,
    /// The location of the log file.
    pub log_path: std::path::PathBuf,
    /// Target frame rate
    pub frame_rate: u32,
    /// The named particle effect to use.
    pub preset: Preset,
    /// How frames are sent out.
    pub output: OutputMode,
    /// A complete particle config that replaces the preset.
    pub particles: Option<crate::engine::config::Config>,
    /// The mock feeds.
    pub feeds: crate::feeds::main::Config,
}

impl Default for Config {
    fn default() -> Self {
        let log_directory = match dirs::state_dir() {
            Some(directory) => directory,
            None => std::path::PathBuf::new().join("./"),
        };
        let log_path = log_directory.join("ambient").join("ambient.log");

        Self {
            log_level: LogLevel::Off,
            log_path,
            frame_rate: 60,
            preset: Preset::Ember,
            output: OutputMode::DrawCalls,
            particles: None,
            feeds: crate::feeds::main::Config::default(),
        }
    }
}

impl Config {
    /// Get the stable location of Ambient's config directory on the user's system.
    ///
    /// # Errors
    /// When the system doesn't have a standard config directory.
    pub fn default_directory() -> Result<std::path::PathBuf> {
        Ok(dirs::config_dir()
            .context("Couldn't get standard config directory")?
            .join("ambient"))
    }

    /// Figure out where our config is being stored, and create the directory if needed.
    ///
    /// # Errors
    /// When the directory can't be created.
    pub fn setup_directory(
        maybe_custom_path: Option<std::path::PathBuf>,
    ) -> Result<std::path::PathBuf> {
        let path = match maybe_custom_path {
            None => Self::default_directory()?,
            Some(path_string) => std::path::PathBuf::new().join(path_string),
        };

        std::fs::create_dir_all(path.clone())?;

        Ok(path)
    }

    /// Load the main config. The default config file is written first if there isn't one yet.
    ///
    /// # Errors
    /// When the file can't be read or isn't valid.
    pub fn load(directory: &std::path::Path, file_name: &std::path::Path) -> Result<Self> {
        let config_path = directory.join(file_name);
        let is_default_config = file_name == std::path::Path::new(DEFAULT_CONFIG_FILE_NAME);
        if is_default_config && !config_path.exists() {
            tracing::info!("Writing default config to: {config_path:?}");
            std::fs::write(config_path.clone(), DEFAULT_CONFIG)?;
        }

        tracing::info!("Loading the main Ambient config from: {config_path:?}");
        let result = std::fs::read_to_string(config_path.clone());
        match result {
            Ok(data) => {
                tracing::trace!("Using config file:\n{data}");
                let config = toml::from_str::<Self>(&data)?;
                config.engine_config().validate()?;
                Ok(config)
            }
            Err(err) => {
                tracing::error!("Loading config: {err:?}");
                color_eyre::eyre::bail!(
                    "Couldn't load config at {config_path:?}: {}",
                    err.to_string()
                );
            }
        }
    }

    /// The particle engine config: either the complete `[particles]` table, or the preset.
    #[must_use]
    pub fn engine_config(&self) -> crate::engine::config::Config {
        match &self.particles {
            Some(particles) => particles.clone(),
            None => self.preset.config(),
        }
    }

    /// Apply any overrides from the command line.
    pub fn apply_cli_args(&mut self, cli_args: &crate::cli_args::CliArgs) {
        if let Some(preset) = cli_args.preset {
            self.preset = preset;
            self.particles = None;
        }
        if let Some(output) = cli_args.output {
            self.output = output;
        }
        if let Some(level) = cli_args.log_level.clone() {
            self.log_level = level;
        }
        if let Some(path) = cli_args.log_path.clone() {
            self.log_path = path;
        }
    }

    /// Everything the runner needs.
    ///
    /// # Errors
    /// When the resulting particle config isn't valid.
    pub fn settings(&self, max_live: Option<usize>) -> Result<crate::runner::Settings> {
        let mut engine = self.engine_config();
        if max_live.is_some() {
            engine.max_live = max_live;
        }
        engine.validate()?;

        Ok(crate::runner::Settings::new(
            engine,
            self.frame_rate,
            self.output,
            self.feeds.clone(),
        ))
    }
}
