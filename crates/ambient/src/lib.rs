//! Ambient: pointer-trailing ember and smoke particle effects.
//!
//! One parameterised [`engine::main::Engine`] runs both effects. Hosts either drive it directly,
//! calling `on_pointer_move()`, `tick()` and `render()` themselves, or start a
//! [`runner::Runner`] that owns an engine and drives it at a fixed frame rate.

pub mod canvas;
pub mod cli_args;
/// All the user-configurable settings.
pub mod config {
    pub mod main;
}
/// The particle engine, shared by every effect.
pub mod engine {
    pub mod config;
    pub mod main;
    pub mod particle;
    mod spawn;
}
/// Mock live-data feeds that run alongside an effect.
pub mod feeds {
    pub mod guest_flags;
    pub mod kitchen_status;
    pub mod main;
}
mod input;
mod output;
pub mod run;
pub mod runner;
pub mod surface;
