//! The refresh loop: connect, collect, compose, render, wait, repeat.

pub mod config;
pub mod error;
pub mod refresh;
pub mod state;

pub use config::{RefreshConfig, RunMode};
pub use error::{exit_code, ControllerError, Termination};
pub use refresh::RefreshController;
pub use state::State;
