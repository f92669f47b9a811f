//! All the CLI arguments for Ambient

use crate::config::main::{LogLevel, DEFAULT_CONFIG_FILE_NAME};
use crate::engine::config::Preset;
use crate::runner::OutputMode;

/// Pointer-trailing ember and smoke particles. Reads pointer events as JSON lines on STDIN and
/// writes frames as JSON lines to STDOUT.
#[derive(clap::Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
#[non_exhaustive]
pub struct CliArgs {
    /// The particle effect to use. Overrides the config file, including any `[particles]` table.
    #[arg(short, long)]
    pub preset: Option<Preset>,

    /// How frames are sent out.
    #[arg(short, long)]
    pub output: Option<OutputMode>,

    /// The maximum number of live particles.
    #[arg(long)]
    pub max_live: Option<usize>,

    /// Use a custom config directory.
    #[arg(long)]
    pub config_dir: Option<std::path::PathBuf>,

    /// Name of the main config file in the config directory.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE_NAME)]
    pub main_config: std::path::PathBuf,

    /// Override the log level from the config file.
    #[arg(long)]
    pub log_level: Option<LogLevel>,

    /// Override the log file location from the config file.
    #[arg(long)]
    pub log_path: Option<std::path::PathBuf>,
}
