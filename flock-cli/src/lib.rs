//! Headless driver for the flocking simulation.

pub mod args;
pub mod runner;
pub mod settings;

pub use args::{load_settings, Args};
pub use runner::{ResizeEvent, RunOptions, Runner, Simulation};
