//! Command implementations

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::app::{AppContainer, CancelFlag, DefaultAppContainer, SessionStore, SplitRequest};
use crate::adapters::TracingLogAdapter;
use crate::cli::args::{InspectArgs, SplitArgs};
use crate::config_initialization::SplitterConfig;
use crate::domain::model::SourceVideo;
use crate::engine::progress::{JsonEventPrinter, ObserverFanout, ProgressObserver};
use crate::output::{self, OutputWriter, WriteOutcome};
use crate::planner;
use crate::utils::Utils;

/// Execute the split command
pub async fn split(args: SplitArgs, config: &SplitterConfig) -> Result<()> {
    info!("Starting split operation");
    info!("Input: {}", args.input.display());
    info!("Segment duration: {}s", config.segment_duration);

    if !args.dry_run {
        config.ensure_deliverable()?;
    }
    let source = read_source(&args.input).await?;

    let session = Arc::new(SessionStore::new());
    session.set_video_file(source.name(), source.size());
    session.set_segment_duration(config.segment_duration);

    let mut fanout = ObserverFanout::new()
        .with(Arc::clone(&session) as Arc<dyn ProgressObserver>)
        .with(Arc::new(TracingLogAdapter::new()));
    if args.json_events {
        fanout = fanout.with(Arc::new(JsonEventPrinter));
    }
    let container = DefaultAppContainer::new(config.ffmpeg_path.clone(), Arc::new(fanout));

    if args.dry_run {
        let report = container.inspect_interactor().inspect(&source).await;
        container.engine().terminate().await;
        let report = report.context("Failed to probe input file")?;
        session.set_video_info(report.metadata.clone());

        let entries = planner::plan(report.metadata.duration, config.segment_duration as f64);
        println!(
            "{} ({}, {})",
            source.name(),
            session.snapshot().formatted_file_size(),
            session.snapshot().formatted_duration()
        );
        println!("Planned segments: {}", entries.len());
        for entry in &entries {
            println!(
                "  {:>3}  start {:>8.2}s  length {:>6.2}s",
                entry.index, entry.start_offset, entry.length
            );
        }
        return Ok(());
    }

    let cancel = CancelFlag::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, stopping after the current segment");
                cancel.cancel();
            }
        })
    };

    session.start_processing();
    let request = SplitRequest::new(source, config.segment_duration as f64).with_cancel(cancel);
    let outcome = container.split_interactor().split(&request).await;
    container.engine().terminate().await;
    interrupt.abort();

    let outcome = outcome.with_context(|| format!("Failed to split {}", request.source.name()))?;
    session.set_video_info(outcome.metadata.clone());
    for segment in &outcome.segments {
        session.add_segment(segment);
    }

    let writer = OutputWriter::new(&config.output_dir, config.overwrite);
    let mut delivered = Vec::new();
    if config.write_segments {
        delivered.extend(
            writer
                .write_segments(&outcome.segments)
                .context("Failed to write segment files")?,
        );
    }
    if config.archive {
        let bytes = output::pack(&outcome.segments).context("Failed to pack archive")?;
        delivered.push(
            writer
                .write_file(&config.archive_name, &bytes)
                .context("Failed to write archive")?,
        );
    }

    if !args.json_events {
        print_split_summary(&session, &delivered);
    }
    info!("Split operation completed successfully");
    Ok(())
}

/// Execute the inspect command
pub async fn inspect(args: InspectArgs, config: &SplitterConfig) -> Result<()> {
    info!("Starting inspect operation");
    info!("Input: {}", args.input.display());

    let source = read_source(&args.input).await?;
    let container = DefaultAppContainer::new(
        config.ffmpeg_path.clone(),
        Arc::new(TracingLogAdapter::new()),
    );

    let report = container.inspect_interactor().inspect(&source).await;
    container.engine().terminate().await;
    let report = report.context("Failed to inspect input file")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("File:       {}", report.filename);
        println!("Size:       {}", Utils::format_file_size(report.size));
        if report.metadata.is_usable() {
            println!(
                "Duration:   {} ({:.2}s)",
                Utils::format_clock_duration(report.metadata.duration),
                report.metadata.duration
            );
        } else {
            println!("Duration:   unknown");
        }
        println!("Codec:      {}", or_unknown(&report.metadata.codec));
        println!("Resolution: {}", or_unknown(&report.metadata.resolution));
    }
    Ok(())
}

async fn read_source(path: &Path) -> Result<SourceVideo> {
    if !path.is_file() {
        return Err(anyhow::anyhow!("Input file does not exist: {}", path.display()));
    }
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("Input path has no file name: {}", path.display()))?;
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(SourceVideo::new(name, data))
}

fn print_split_summary(session: &SessionStore, delivered: &[WriteOutcome]) {
    let state = session.snapshot();
    println!(
        "{} ({}, {})",
        state.file_name.as_deref().unwrap_or_default(),
        state.formatted_file_size(),
        state.formatted_duration()
    );
    println!("{}", state.status_message);
    for segment in &state.segments {
        println!("  {}  {}", segment.name, Utils::format_file_size(segment.size));
    }
    for outcome in delivered {
        match outcome {
            WriteOutcome::Written(path) => println!("Wrote {}", path.display()),
            WriteOutcome::Skipped(path) => println!("Skipped existing {}", path.display()),
        }
    }
}

fn or_unknown(value: &str) -> &str {
    if value.is_empty() {
        "unknown"
    } else {
        value
    }
}
