//! Drive a particle engine one frame at a time, the way a browser's animation frame callback
//! would.
//!
//! The engine lives on exactly one task. Pointer moves, resizes and feed events are all applied
//! between frames, so nothing ever needs locking.

use std::collections::VecDeque;

use ambient_protocol::{InputMessages, OutputMessages};
use color_eyre::eyre::Result;
use tokio::sync::{mpsc, watch};

use crate::canvas::Canvas;
use crate::engine::{config::Config, main::Engine};
use crate::feeds::main::{Event, FeedHandle};
use crate::surface::Recorder;

/// The number of microseconds in a second.
pub const ONE_MICROSECOND: u64 = 1_000_000;

/// One unit of `dt` is one frame at this rate, the refresh rate of a typical display.
pub const REFERENCE_FRAME_RATE: f32 = 60.0;

/// The most ticks that a single frame can advance by. Stops a stalled frame from making
/// particles jump across the screen.
pub const MAX_FRAME_DT: f32 = 4.0;

/// How many entries of the guest log are shown.
const GUEST_LOG_LENGTH: usize = 5;

/// The colour of the kitchen ticker text.
const KITCHEN_TEXT_COLOUR: ambient_protocol::Colour = (1.0, 0.84, 0.0, 1.0);

/// How frames are sent out.
#[derive(
    serde::Serialize, serde::Deserialize, clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq,
)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum OutputMode {
    /// A list of draw calls, for hosts that have their own 2D canvas.
    DrawCalls,
    /// Rasterised half-block terminal pixels.
    Pixels,
}

/// Everything needed to run an effect.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Settings {
    /// The particle engine's config.
    pub engine: Config,
    /// Target frame rate.
    pub frame_rate: u32,
    /// How frames are sent out.
    pub output: OutputMode,
    /// The mock feeds.
    pub feeds: crate::feeds::main::Config,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            engine: Config::default(),
            frame_rate: 60,
            output: OutputMode::DrawCalls,
            feeds: crate::feeds::main::Config::default(),
        }
    }
}

impl Settings {
    /// Instantiate
    #[must_use]
    pub fn new(
        engine: Config,
        frame_rate: u32,
        output: OutputMode,
        feeds: crate::feeds::main::Config,
    ) -> Self {
        Self {
            engine,
            frame_rate,
            output,
            feeds,
        }
    }
}

/// The surface that frames are drawn on.
#[derive(Debug)]
enum Frame {
    /// For [`OutputMode::DrawCalls`].
    DrawCalls(Recorder),
    /// For [`OutputMode::Pixels`].
    Pixels(Canvas),
}

impl Frame {
    /// A surface for the given output mode, sized to the viewport.
    fn new(mode: OutputMode, width: u16, height: u16) -> Self {
        match mode {
            OutputMode::DrawCalls => Self::DrawCalls(Recorder::new(width.into(), height.into())),
            OutputMode::Pixels => Self::Pixels(Canvas::for_terminal(width, height)),
        }
    }

    /// The viewport changed size.
    fn resize(&mut self, width: u16, height: u16) {
        match self {
            Self::DrawCalls(recorder) => recorder.resize(width.into(), height.into()),
            Self::Pixels(canvas) => canvas.resize(width.into(), u32::from(height) * 2),
        }
    }

    /// Draw the engine and package the result as a message.
    fn draw(&mut self, engine: &Engine) -> OutputMessages {
        match self {
            Self::DrawCalls(recorder) => {
                engine.render(recorder);
                OutputMessages::OutputDrawCalls(recorder.drain())
            }
            Self::Pixels(canvas) => {
                engine.render(canvas);
                OutputMessages::OutputPixels(canvas.pixels())
            }
        }
    }
}

/// `Runner`
pub struct Runner {
    /// The effect itself.
    engine: Engine,
    /// Everything the runner was started with.
    settings: Settings,
    /// Only exists once the viewport size is known.
    frame: Option<Frame>,
    /// Where finished frames are sent.
    output: mpsc::Sender<OutputMessages>,
    /// The time at which the previous frame tick was due.
    last_frame_tick: tokio::time::Instant,
    /// The time at which the engine was last ticked.
    last_engine_tick: tokio::time::Instant,
    /// The most recent guest flags, newest first.
    guest_log: VecDeque<crate::feeds::guest_flags::GuestFlag>,
}

/// An owned handle to a running effect.
///
/// Stopping it, or dropping it, tears the effect down: its input channel and output channel are
/// both closed and its feeds are stopped.
#[derive(Debug)]
pub struct RunnerHandle {
    /// Tells the runner to finish its loop.
    shutdown: watch::Sender<bool>,
    /// The runner's task. Only `None` once it has been stopped.
    task: Option<tokio::task::JoinHandle<Result<()>>>,
}

impl RunnerHandle {
    /// Stop the effect and wait for it to finish.
    ///
    /// # Errors
    /// If the runner failed or panicked.
    pub async fn stop(mut self) -> Result<()> {
        tracing::debug!("Stopping the runner");
        // An error just means the runner has already finished.
        let _ignored = self.shutdown.send(true);
        self.join().await
    }

    /// Wait for the effect to end by itself, for instance because its input closed.
    ///
    /// # Errors
    /// If the runner failed or panicked.
    pub async fn wait(mut self) -> Result<()> {
        self.join().await
    }

    /// Whether the runner has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task
            .as_ref()
            .is_none_or(tokio::task::JoinHandle::is_finished)
    }

    /// Await the runner's task.
    async fn join(&mut self) -> Result<()> {
        match self.task.take() {
            Some(task) => task.await?,
            None => Ok(()),
        }
    }
}

impl Drop for RunnerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Runner {
    /// Instantiate
    fn new(settings: Settings, output: mpsc::Sender<OutputMessages>) -> Self {
        let now = tokio::time::Instant::now();
        Self {
            engine: Engine::new(settings.engine.clone()),
            settings,
            frame: None,
            output,
            last_frame_tick: now,
            last_engine_tick: now,
            guest_log: VecDeque::new(),
        }
    }

    /// Start the effect on its own task.
    pub fn start(
        settings: Settings,
        inputs: mpsc::Receiver<InputMessages>,
        output: mpsc::Sender<OutputMessages>,
    ) -> RunnerHandle {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let runner = Self::new(settings, output);
            let result = runner.run(inputs, shutdown_rx).await;
            if let Err(error) = &result {
                tracing::error!("Runner failed: {error:?}");
            }
            result
        });

        RunnerHandle {
            shutdown,
            task: Some(task),
        }
    }

    /// The main loop. Everything that the runner owns, including the input and output channels,
    /// is dropped when this returns.
    async fn run(
        mut self,
        mut inputs: mpsc::Receiver<InputMessages>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        tracing::debug!("Starting runner with: {:?}", self.settings);

        let (feed_tx, mut feed_rx) = mpsc::channel(16);
        let feeds = crate::feeds::main::start_enabled(&self.settings.feeds, &feed_tx);
        drop(feed_tx);
        if self.settings.feeds.guest_flags {
            self.seed_guest_log();
        }

        #[expect(
            clippy::integer_division_remainder_used,
            reason = "This is caused by the `tokio::select!`"
        )]
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                () = self.sleep_until_next_frame_tick() => {
                    if !self.render() {
                        break;
                    }
                },
                message = inputs.recv() => {
                    let Some(message) = message else {
                        tracing::debug!("Input closed");
                        break;
                    };
                    if !self.handle_message(message) {
                        break;
                    }
                },
                Some(event) = feed_rx.recv() => {
                    if !self.handle_feed_event(event) {
                        break;
                    }
                }
            }
        }

        inputs.close();
        feed_rx.close();
        Self::stop_feeds(feeds).await;
        tracing::debug!("Leaving the runner's loop");
        Ok(())
    }

    /// Stop all the feeds, logging rather than returning any errors.
    async fn stop_feeds(feeds: Vec<FeedHandle>) {
        for feed in feeds {
            if let Err(error) = feed.stop().await {
                tracing::error!("Couldn't stop feed: {error:?}");
            }
        }
    }

    /// Handle a message from the host. Returns `false` when the runner should stop.
    fn handle_message(&mut self, message: InputMessages) -> bool {
        tracing::trace!("Runner received message: {message:?}");

        #[expect(
            clippy::wildcard_enum_match_arm,
            reason = "The protocol is `#[non_exhaustive]` so new message kinds are ignored"
        )]
        match message {
            InputMessages::PointerMove { x, y } => self.engine.on_pointer_move(x, y),
            InputMessages::Resize { width, height } => self.resize(width, height),
            InputMessages::Stop => return false,
            _ => tracing::warn!("Unhandled message: {message:?}"),
        }

        true
    }

    /// Keep track of the size of the viewport.
    fn resize(&mut self, width: u16, height: u16) {
        tracing::debug!("Viewport resized to {width}x{height}");
        match &mut self.frame {
            Some(frame) => frame.resize(width, height),
            None => self.frame = Some(Frame::new(self.settings.output, width, height)),
        }
    }

    /// Sleep until the next frame render is due.
    pub async fn sleep_until_next_frame_tick(&mut self) {
        let frame_rate = u64::from(self.settings.frame_rate.max(1));
        let target = ONE_MICROSECOND.wrapping_div(frame_rate);
        let target_frame_rate_micro = std::time::Duration::from_micros(target);
        if let Some(wait) = target_frame_rate_micro.checked_sub(self.last_frame_tick.elapsed()) {
            tokio::time::sleep(wait).await;
        }
        self.last_frame_tick = tokio::time::Instant::now();
    }

    /// How many reference frames have passed since the engine was last ticked.
    fn frame_dt(&mut self) -> f32 {
        let now = tokio::time::Instant::now();
        let elapsed = now.duration_since(self.last_engine_tick);
        self.last_engine_tick = now;
        (elapsed.as_secs_f32() * REFERENCE_FRAME_RATE).min(MAX_FRAME_DT)
    }

    /// One frame of the effect. Returns `false` when nobody is listening to the output any
    /// more.
    fn render(&mut self) -> bool {
        let dt = self.frame_dt();
        self.engine.tick(dt);

        // Particles still age before the viewport is known, they just aren't drawn.
        let Some(frame) = &mut self.frame else {
            return true;
        };

        let message = frame.draw(&self.engine);
        self.send(message)
    }

    /// Send a message out. Returns `false` if the output channel is closed.
    ///
    /// A host that can't keep up just misses messages, it never stalls the effect.
    fn send(&self, message: OutputMessages) -> bool {
        match self.output.try_send(message) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::trace!("Output is full, dropping message");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!("Output closed");
                false
            }
        }
    }

    /// Fill the guest log with the flags that were already there.
    fn seed_guest_log(&mut self) {
        for flag in crate::feeds::guest_flags::initial_flags() {
            self.push_guest_flag(flag);
        }
    }

    /// Add a flag to the top of the guest log.
    fn push_guest_flag(&mut self, flag: crate::feeds::guest_flags::GuestFlag) {
        self.guest_log.push_front(flag);
        self.guest_log.truncate(GUEST_LOG_LENGTH);
    }

    /// Show the output of a feed. Returns `false` when nobody is listening to the output any
    /// more.
    fn handle_feed_event(&mut self, event: Event) -> bool {
        match event {
            Event::KitchenStatus(status) => {
                let message = OutputMessages::OutputText {
                    text: status.to_string(),
                    coordinates: (0, 0),
                    fg: Some(KITCHEN_TEXT_COLOUR),
                };
                self.send(message)
            }
            Event::GuestFlag(flag) => {
                self.push_guest_flag(flag);
                self.send_guest_log()
            }
        }
    }

    /// Send every line of the guest log.
    fn send_guest_log(&self) -> bool {
        for (row, flag) in (1u32..).zip(&self.guest_log) {
            let message = OutputMessages::OutputText {
                text: flag.to_string(),
                coordinates: (0, row),
                fg: Some(flag.colour.rgba()),
            };
            if !self.send(message) {
                return false;
            }
        }
        true
    }
}
