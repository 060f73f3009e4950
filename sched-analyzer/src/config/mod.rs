/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Task-set file loading.
//!
//! The expected YAML structure is:
//! ```yaml
//! policy: dm                  # optional, name or menu code 1-7
//! hyperperiod_limit: 100000   # optional
//! checkpoint_limit: 500000    # optional
//! timeline: always            # optional: when_schedulable | always | never
//! tasks:
//!   - { wcet: 1, period: 4, deadline: 4 }
//!   - { wcet: 2, period: 6, deadline: 5, priority: 3 }
//!   - { wcet: 1, period: 12 }  # deadline defaults to the period
//! ```
//!
//! Settings found in the file override [`AnalyzerConfig`] defaults; command
//! line flags override the file (see `main.rs`).

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::scheduler::{AnalyzerConfig, TimelineMode};
use crate::task::{Policy, TaskParams, Time};

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
///
/// Kept private: callers work with [`TaskFile`].
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TaskFileRaw {
    policy: Option<PolicyValue>,
    hyperperiod_limit: Option<Time>,
    checkpoint_limit: Option<usize>,
    timeline: Option<TimelineMode>,
    #[serde(default)]
    tasks: Vec<TaskEntry>,
}

/// `policy:` may be written as a name or as the menu code.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PolicyValue {
    Code(i64),
    Name(String),
}

/// Per-task fields as they appear in the YAML file.
///
/// Signed so that negative values reach validation and are reported per
/// field instead of as a YAML type error.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TaskEntry {
    wcet: i64,
    period: i64,
    deadline: Option<i64>,
    priority: Option<i64>,
}

// ── Public data structures ────────────────────────────────────────────────────

/// Contents of a task-set file, not yet validated into a
/// [`TaskSet`](crate::task::TaskSet).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskFile {
    pub policy: Option<Policy>,
    pub hyperperiod_limit: Option<Time>,
    pub checkpoint_limit: Option<usize>,
    pub timeline: Option<TimelineMode>,
    pub tasks: Vec<TaskParams>,
}

impl TaskFile {
    /// Parses the task-set file at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, the YAML is
    /// structurally invalid, or the policy is unknown.  Task fields are
    /// validated later by [`TaskSet::from_params`](crate::task::TaskSet::from_params).
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading task set from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open task file: {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Invalid task file: {}", path.display()))
    }

    /// Parses task-set YAML from a string.
    pub fn parse(content: &str) -> Result<Self> {
        let raw: TaskFileRaw =
            serde_yaml::from_str(content).context("Failed to parse task-set YAML")?;

        let policy = match raw.policy {
            None => None,
            Some(PolicyValue::Code(code)) => Some(Policy::from_code(code)?),
            Some(PolicyValue::Name(name)) => Some(name.parse::<Policy>()?),
        };

        let tasks: Vec<TaskParams> = raw
            .tasks
            .into_iter()
            .map(|e| TaskParams {
                wcet: e.wcet,
                period: e.period,
                deadline: e.deadline.unwrap_or(e.period),
                priority: e.priority,
            })
            .collect();

        for (i, t) in tasks.iter().enumerate() {
            debug!(
                "  Task T{} | C: {} | T: {} | D: {} | P: {:?}",
                i + 1,
                t.wcet,
                t.period,
                t.deadline,
                t.priority
            );
        }
        info!(task_count = tasks.len(), policy = ?policy, "task file parsed");

        Ok(Self {
            policy,
            hyperperiod_limit: raw.hyperperiod_limit,
            checkpoint_limit: raw.checkpoint_limit,
            timeline: raw.timeline,
            tasks,
        })
    }

    /// Overrides the fields of `config` that this file sets.
    pub fn apply_to(&self, config: &mut AnalyzerConfig) {
        if let Some(limit) = self.hyperperiod_limit {
            config.hyperperiod_limit = limit;
        }
        if let Some(limit) = self.checkpoint_limit {
            config.checkpoint_limit = limit;
        }
        if let Some(mode) = self.timeline {
            config.timeline = mode;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
