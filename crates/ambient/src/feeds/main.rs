//! Mock "live" feeds for the guest log and the kitchen ticker.
//!
//! There's no real backend, so these are just timers generating random values. The important
//! part is that every feed is an explicitly owned task: whoever starts a feed gets back a
//! [`FeedHandle`] and the feed lives exactly as long as they want it to.

use color_eyre::eyre::Result;

use super::{guest_flags::GuestFlag, kitchen_status::KitchenStatus};

/// Everything that a feed can emit.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Event {
    /// A guest left a prayer flag in the guest log.
    GuestFlag(GuestFlag),
    /// A new reading from the kitchen.
    KitchenStatus(KitchenStatus),
}

/// Config for the mock feeds.
#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Whether to show the guest log.
    pub guest_flags: bool,
    /// The chance, between 0 and 1, that a guest flag arrives on any given period.
    pub guest_flag_chance: f64,
    /// Whether to show the kitchen ticker.
    pub kitchen_status: bool,
    /// How often the feeds update, in milliseconds.
    pub period_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            guest_flags: false,
            guest_flag_chance: 0.3,
            kitchen_status: false,
            period_ms: 3000,
        }
    }
}

impl Config {
    /// The update period as a duration.
    #[must_use]
    pub fn period(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.period_ms.max(1))
    }
}

/// An owned, stoppable, scheduled task.
///
/// Dropping the handle aborts the task, so a feed can never outlive its owner.
#[derive(Debug)]
pub struct FeedHandle {
    /// For logging.
    name: &'static str,
    /// Tells the task to finish its loop.
    shutdown: tokio::sync::watch::Sender<bool>,
    /// The task itself. Only `None` once it has been stopped.
    task: Option<tokio::task::JoinHandle<()>>,
}

impl FeedHandle {
    /// Run `tick` every `period`, the first call being one whole period from now. Whatever `tick`
    /// returns is sent down `output`. The feed ends when it is stopped or when nobody is listening
    /// any more.
    pub(crate) fn spawn<F>(
        name: &'static str,
        period: std::time::Duration,
        output: tokio::sync::mpsc::Sender<Event>,
        mut tick: F,
    ) -> Self
    where
        F: FnMut() -> Option<Event> + Send + 'static,
    {
        let (shutdown, mut shutdown_rx) = tokio::sync::watch::channel(false);

        let task = tokio::spawn(async move {
            tracing::debug!("Starting the {name} feed");
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);

            #[expect(
                clippy::integer_division_remainder_used,
                reason = "This is caused by the `tokio::select!`"
            )]
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = interval.tick() => {
                        let Some(event) = tick() else {
                            continue;
                        };
                        if output.send(event).await.is_err() {
                            tracing::debug!("Nothing is listening to the {name} feed anymore");
                            break;
                        }
                    }
                }
            }
            tracing::debug!("Leaving the {name} feed's loop");
        });

        Self {
            name,
            shutdown,
            task: Some(task),
        }
    }

    /// Stop the feed and wait for it to finish.
    ///
    /// # Errors
    /// If the feed's task panicked.
    pub async fn stop(mut self) -> Result<()> {
        tracing::debug!("Stopping the {} feed", self.name);
        // An error just means the task has already finished.
        let _ignored = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            task.await?;
        }
        Ok(())
    }

    /// Whether the feed's task has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(tokio::task::JoinHandle::is_finished)
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Start every feed that is enabled in the config.
pub fn start_enabled(
    config: &Config,
    output: &tokio::sync::mpsc::Sender<Event>,
) -> Vec<FeedHandle> {
    let mut handles = Vec::new();
    if config.guest_flags {
        handles.push(super::guest_flags::start(
            config.period(),
            config.guest_flag_chance,
            output.clone(),
        ));
    }
    if config.kitchen_status {
        handles.push(super::kitchen_status::start(config.period(), output.clone()));
    }
    handles
}
