//! # CLI Module
//!
//! Command-line interface for the image pair joiner.
//!
//! ## Usage
//! ```bash
//! # Copy matches/non-matches into their buckets
//! pair-join --input1 scans/in1 --input2 scans/in2
//!
//! # Also fuse the matched pairs and score them
//! pair-join --input1 scans/in1 --input2 scans/in2 --join --join_similarity
//!
//! # Fusion only, on one core
//! pair-join --input1 scans/in1 --input2 scans/in2 --join_only --join_mode one_core
//! ```

use image_pair_joiner::core::executor::ExecutionPolicy;
use image_pair_joiner::core::pipeline::{Pipeline, PipelineResult};
use image_pair_joiner::error::Result;
use image_pair_joiner::events::{self, BatchEvent, BatchKind, Event};
use clap::{Parser, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::thread;

/// Reconcile two directories by filename and join matched image pairs
#[derive(Parser, Debug)]
#[command(name = "pair-join")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory for input1 (source list)
    #[arg(long)]
    input1: PathBuf,

    /// Directory for input2 (compare list)
    #[arg(long)]
    input2: PathBuf,

    /// Directory for work; prefix for all other directories that are not absolute
    #[arg(long, default_value = "")]
    work: PathBuf,

    /// Directory for matched input1 files
    #[arg(long, default_value = "Output")]
    output: PathBuf,

    /// Directory for matched input2 files
    #[arg(long, default_value = "Found")]
    found: PathBuf,

    /// Directory for input1 files without a match
    #[arg(long, default_value = "Notfound1")]
    notfound1: PathBuf,

    /// Directory for input2 files without a match
    #[arg(long, default_value = "Notfound2")]
    notfound2: PathBuf,

    /// Directory for joined images of matched pairs
    #[arg(long, default_value = "Joined")]
    joined: PathBuf,

    /// Directory for CSV reports
    #[arg(long, default_value = "Reports")]
    csv: PathBuf,

    /// Also join images of matched pairs
    #[arg(long)]
    join: bool,

    /// Join images of matched pairs, without all other operations
    #[arg(long = "join_only")]
    join_only: bool,

    /// Compute a similarity score for each joined pair
    #[arg(long = "join_similarity")]
    join_similarity: bool,

    /// Execution policy for the join phase
    #[arg(long = "join_mode", value_enum, default_value = "future_core")]
    join_mode: JoinMode,

    /// Worker-count override for the join phase (0 = policy default)
    #[arg(long = "join_tasks", default_value_t = 0)]
    join_tasks: usize,

    /// Similarity algorithm: match, orb, sift or fast
    #[arg(long = "join_algorithm", default_value = "match")]
    join_algorithm: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum JoinMode {
    /// Sequential on the caller's thread
    #[value(name = "one_core")]
    OneCore,
    /// Bounded CPU pool
    #[value(name = "future_core")]
    FutureCore,
    /// Bounded worker-thread pool
    #[value(name = "future_thread")]
    FutureThread,
    /// Cooperative dispatcher over a CPU pool
    #[value(name = "future_core_async")]
    FutureCoreAsync,
}

impl From<JoinMode> for ExecutionPolicy {
    fn from(mode: JoinMode) -> Self {
        match mode {
            JoinMode::OneCore => ExecutionPolicy::OneCore,
            JoinMode::FutureCore => ExecutionPolicy::FutureCore,
            JoinMode::FutureThread => ExecutionPolicy::FutureThread,
            JoinMode::FutureCoreAsync => ExecutionPolicy::FutureCoreAsync,
        }
    }
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    image_pair_joiner::init_tracing(cli.verbose);

    let join_requested = cli.join || cli.join_only;

    let pipeline = Pipeline::builder()
        .input1(cli.input1)
        .input2(cli.input2)
        .work(cli.work)
        .output(cli.output)
        .found(cli.found)
        .notfound1(cli.notfound1)
        .notfound2(cli.notfound2)
        .joined(cli.joined)
        .csv(cli.csv)
        .join(cli.join)
        .join_only(cli.join_only)
        .join_similarity(cli.join_similarity)
        .algorithm(cli.join_algorithm)
        .policy(cli.join_mode.into())
        .join_tasks(cli.join_tasks)
        .build();

    let (sender, receiver) = events::channel();

    // Render batch progress on a dedicated thread
    let event_thread = thread::spawn(move || {
        let mut bar: Option<ProgressBar> = None;
        for event in receiver.iter() {
            match event {
                Event::Batch(BatchEvent::Started {
                    kind, label, total, ..
                }) => {
                    let pb = ProgressBar::new(total as u64);
                    pb.set_style(
                        ProgressStyle::default_bar()
                            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                            .unwrap()
                            .progress_chars("█▓░"),
                    );
                    let verb = match kind {
                        BatchKind::Copy => "Copy",
                        BatchKind::Join => "Join",
                    };
                    pb.set_message(format!("{verb} to {label}"));
                    bar = Some(pb);
                }
                Event::Batch(BatchEvent::ItemCompleted { completed, .. }) => {
                    if let Some(ref pb) = bar {
                        // Completions may arrive slightly out of order
                        if completed as u64 > pb.position() {
                            pb.set_position(completed as u64);
                        }
                    }
                }
                Event::Batch(BatchEvent::Completed { .. }) => {
                    if let Some(pb) = bar.take() {
                        pb.finish_and_clear();
                    }
                }
                _ => {}
            }
        }
    });

    let result = pipeline.run_with_events(&sender);

    // Drop the sender to signal the event thread to finish
    drop(sender);
    event_thread.join().ok();

    let result = result?;
    print_summary(&Term::stderr(), &result, join_requested);

    Ok(())
}

fn print_summary(term: &Term, result: &PipelineResult, join_requested: bool) {
    term.write_line("").ok();
    term.write_line(&format!("{} Run Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} input1 files, {} input2 files in {:.1}s",
        style(result.input1_files).cyan(),
        style(result.input2_files).cyan(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();

    term.write_line(&format!(
        "  {} matched pairs, {} only in input1, {} only in input2",
        style(result.common).cyan(),
        style(result.left_only).cyan(),
        style(result.right_only).cyan()
    ))
    .ok();

    if result.copy_errors.is_empty() {
        term.write_line(&format!("  {} copy errors", style(0).dim())).ok();
    } else {
        term.write_line(&format!(
            "  {} copy errors: {:?}",
            style(result.copy_errors.len()).red(),
            result.copy_errors
        ))
        .ok();
    }

    if join_requested {
        term.write_line(&format!(
            "  {} pairs joined, {} join errors, {} similarity scores",
            style(result.join_outcomes.len() - result.join_errors()).cyan(),
            if result.join_errors() > 0 {
                style(result.join_errors()).red()
            } else {
                style(result.join_errors()).dim()
            },
            style(result.scores()).cyan()
        ))
        .ok();
    }

    term.write_line("").ok();
}
