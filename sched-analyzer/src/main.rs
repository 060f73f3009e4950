/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::io;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use sched_analyzer::config::TaskFile;
use sched_analyzer::input::prompt_task_set;
use sched_analyzer::report::Report;
use sched_analyzer::scheduler::{Analyzer, AnalyzerConfig, TimelineMode};
use sched_analyzer::task::{Policy, TaskParams, TaskSet, Time};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Schedulability analyzer for periodic real-time task sets.
///
/// Without -f and -t the task set is read interactively from stdin.
///
/// Example:
///   sched-analyzer -p rm -t 1,4,4 -t 2,6,6 -t 3,20,20
///   sched-analyzer -f tasks.yaml --timeline always
#[derive(Debug, Parser)]
#[command(
    name = "sched-analyzer",
    about = "Schedulability analysis and timeline simulation for periodic tasks",
    long_about = None,
)]
struct Cli {
    /// Scheduling policy: rm, dm, edf, lst, pip, ocpp, icpp or menu code 1-7.
    #[arg(short = 'p', long = "policy")]
    policy: Option<Policy>,

    /// Path to a YAML task-set file.
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// One task as WCET,PERIOD,DEADLINE[,PRIORITY]; repeatable.
    #[arg(short = 't', long = "task")]
    tasks: Vec<TaskParams>,

    /// When to print the timeline: when-schedulable, always or never.
    #[arg(long = "timeline")]
    timeline: Option<TimelineMode>,

    /// Largest hyperperiod (ticks) to simulate.
    #[arg(long = "hyperperiod-limit")]
    hyperperiod_limit: Option<Time>,

    /// Largest number of processor-demand checkpoints.
    #[arg(long = "checkpoint-limit")]
    checkpoint_limit: Option<usize>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    // Logs go to stderr; stdout carries the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    info!(
        policy = ?cli.policy,
        file = ?cli.file,
        task_count = cli.tasks.len(),
        timeline = ?cli.timeline,
        "Configuration"
    );

    if let Err(e) = run(cli) {
        error!("{e:#}");
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = AnalyzerConfig::default();
    let mut policy = None;
    let mut params = Vec::new();

    // ── Sources, lowest precedence first ──────────────────────────────────────
    if let Some(path) = &cli.file {
        let file = TaskFile::load(path)?;
        file.apply_to(&mut config);
        policy = file.policy;
        params = file.tasks;
    }

    if cli.file.is_none() && cli.tasks.is_empty() {
        let stdin = io::stdin();
        let prompted = prompt_task_set(stdin.lock(), io::stdout(), cli.policy)?;
        policy = Some(prompted.policy);
        params = prompted.tasks;
    }

    params.extend(cli.tasks);
    policy = cli.policy.or(policy);
    if let Some(limit) = cli.hyperperiod_limit {
        config.hyperperiod_limit = limit;
    }
    if let Some(limit) = cli.checkpoint_limit {
        config.checkpoint_limit = limit;
    }
    if let Some(mode) = cli.timeline {
        config.timeline = mode;
    }

    let policy = policy.context("No scheduling policy given (use -p or set `policy` in the task file)")?;
    let task_set = TaskSet::from_params(params)?;

    // ── Analysis ──────────────────────────────────────────────────────────────
    let analysis = Analyzer::new(config).analyze(task_set, policy)?;
    print!("{}", Report::new(&analysis));
    Ok(())
}
