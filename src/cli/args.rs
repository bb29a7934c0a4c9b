//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::domain::rules::{MAX_SEGMENT_DURATION, MIN_SEGMENT_DURATION};
use crate::output::OverwritePolicy;

/// Arguments for the split command
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Seconds per segment (5-300, default 60)
    #[arg(short = 'd', long = "duration", value_parser = parse_segment_duration)]
    pub segment_duration: Option<u32>,

    /// Directory receiving the segments and archive
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Also pack the segments into a zip archive
    #[arg(long)]
    pub zip: bool,

    /// Archive file name
    #[arg(long)]
    pub archive_name: Option<String>,

    /// Do not write individual segment files
    #[arg(long)]
    pub no_files: bool,

    /// Probe and print the segment plan without extracting
    #[arg(long)]
    pub dry_run: bool,

    /// What to do when an output file already exists
    #[arg(long, value_enum)]
    pub overwrite: Option<OverwritePolicy>,

    /// Print run events as JSON lines on stdout
    #[arg(long)]
    pub json_events: bool,
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

fn parse_segment_duration(value: &str) -> Result<u32, String> {
    clap_num::number_range(value, MIN_SEGMENT_DURATION, MAX_SEGMENT_DURATION)
}
