//! Just `main()`. Keep as small as possible.

use color_eyre::eyre::Result;

#[expect(
    clippy::print_stderr,
    reason = "It's our central place for communicating with the user on CLI"
)]
#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let result = ambient::run::run().await;
    tracing::debug!("Ambient is exiting");

    match result {
        Ok(config) => {
            if !matches!(config.log_level, ambient::config::main::LogLevel::Off) {
                eprintln!("Logs saved to {}", config.log_path.display());
            }
        }
        Err(error) => {
            tracing::error!("{error:?}");
            eprintln!("Error: {error}");
        }
    }

    Ok(())
}
