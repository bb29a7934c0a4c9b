//! CLI module for SplitX
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::utils::logging::{LogFormat, LogLevel};

pub mod args;
pub mod commands;

/// SplitX video splitter
///
/// Splits a video into fixed-length segments with lossless stream copy and
/// optionally packs them into a zip archive.
#[derive(Parser, Debug)]
#[command(name = "splitter")]
#[command(about = "SplitX - Split videos into fixed-length segments without re-encoding")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./splitx.toml when present)
    #[arg(long, global = true, env = "SPLITX_CONFIG")]
    pub config: Option<PathBuf>,

    /// ffmpeg executable (default: looked up on PATH)
    #[arg(long, global = true)]
    pub ffmpeg: Option<PathBuf>,

    /// Logging level
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Log output format
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split a video into fixed-length segments
    Split(args::SplitArgs),
    /// Inspect video file information
    Inspect(args::InspectArgs),
}
