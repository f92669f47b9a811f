//! Main entrypoint for running Ambient as a host-driven process

use clap::Parser as _;
use color_eyre::eyre::{ContextCompat as _, Result};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, Layer as _};

use crate::cli_args::CliArgs;
use crate::config::main::Config;
use crate::input::Input;
use crate::output::Output;
use crate::runner::Runner;

/// How many parsed input messages can be waiting for the runner.
const INPUT_BUFFER: usize = 256;

/// How many frames can be waiting to be written. Frames beyond this are dropped.
const OUTPUT_BUFFER: usize = 8;

/// Main entrypoint
///
/// # Errors
/// When setup fails, or when any of the running systems fail.
pub async fn run() -> Result<Config> {
    let cli_args = CliArgs::parse();
    let config = setup(&cli_args)?;
    let settings = config.settings(cli_args.max_live)?;

    let (inputs_tx, inputs_rx) = tokio::sync::mpsc::channel(INPUT_BUFFER);
    let (output_tx, output_rx) = tokio::sync::mpsc::channel(OUTPUT_BUFFER);

    let input_thread_handle = Input::start(inputs_tx);
    let output_thread_handle = Output::start(output_rx);
    let runner = Runner::start(settings, inputs_rx, output_tx);

    runner.wait().await?;
    tracing::debug!("Runner finished, exiting Ambient...");

    output_thread_handle
        .join()
        .map_err(|err| color_eyre::eyre::eyre!("STDOUT handle: {err:?}"))??;
    if input_thread_handle.is_finished() {
        // A blocking read on STDIN can't be interrupted, so only join the thread when it has
        // already ended, either because STDIN closed or because of its own error.
        input_thread_handle
            .join()
            .map_err(|err| color_eyre::eyre::eyre!("STDIN handle: {err:?}"))??;
    }

    tracing::trace!("Leaving Ambient's main `run()` function");
    Ok(config)
}

/// Prepare the application to start.
fn setup(cli_args: &CliArgs) -> Result<Config> {
    let directory = match Config::setup_directory(cli_args.config_dir.clone()) {
        Ok(directory) => directory,
        Err(directory_error) => {
            color_eyre::eyre::bail!("Error setting up config directory: {directory_error:?}");
        }
    };

    let mut config = match Config::load(&directory, &cli_args.main_config) {
        Ok(config) => config,
        Err(config_error) => {
            let path = directory.join(&cli_args.main_config);
            color_eyre::eyre::bail!(
                "Bad config file: {config_error:?}\n\nConfig path: {}",
                path.display()
            );
        }
    };
    config.apply_cli_args(cli_args);

    setup_logging(&config)?;

    tracing::info!("Starting Ambient");
    tracing::debug!("Loaded config: {config:?}");

    Ok(config)
}

/// Setup logging
fn setup_logging(config: &Config) -> Result<()> {
    let are_log_filters_manually_set = std::env::var("AMBIENT_LOG").is_ok();
    let level = config.log_level.clone();
    let level_as_string = format!("{level:?}").to_lowercase();

    let is_loggable =
        !matches!(level, crate::config::main::LogLevel::Off) || are_log_filters_manually_set;

    if !is_loggable {
        return Ok(());
    }

    let directory = config
        .log_path
        .parent()
        .context("Couldn't get log path's parent")?;
    std::fs::create_dir_all(directory)?;
    let file = std::fs::File::create(&config.log_path)?;

    let filters = if are_log_filters_manually_set {
        let user_filters = std::env::var("AMBIENT_LOG").unwrap_or_default();
        tracing_subscriber::EnvFilter::builder()
            .with_default_directive("error".parse()?)
            .parse_lossy(user_filters)
    } else {
        tracing_subscriber::EnvFilter::builder()
            .with_default_directive("off".parse()?)
            .from_env_lossy()
            .add_directive(format!("ambient={level_as_string}").parse()?)
            .add_directive(format!("tests={level_as_string}").parse()?)
    };

    // STDOUT is the protocol channel, so logs can only ever go to a file.
    let logfile_layer = tracing_subscriber::fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_filter(filters);

    tracing_subscriber::registry().with(logfile_layer).init();

    Ok(())
}
