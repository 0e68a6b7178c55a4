//! Timeline CLI library.
//!
//! This crate provides the CLI interface for the interval merger.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, MergeArgs, TimelineArgs, WindowArgs};
pub use config::Config;
