/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Schedulability analyzer.
//!
//! [`Analyzer`] runs one policy over one [`TaskSet`]: it ranks the tasks when
//! the policy is fixed-priority, runs the matching engine and, depending on
//! [`TimelineMode`], simulates one hyperperiod.  The result is an
//! [`Analysis`] carrying the verdict, its decision trace and the timeline,
//! ready for [`crate::report`].
//!
//! | Policy | Engine | Hyperperiod too large |
//! |---|---|---|
//! | RM, DM | [`fixed_priority`] | verdict kept, [`TimelineOutcome::Unavailable`] |
//! | EDF, LST | [`dynamic_priority`] | `Err(SchedulerError::DegenerateHyperperiod)` |
//! | PIP, OCPP, ICPP | none | [`Analysis::NotImplemented`] |
//!
//! # Example
//! ```rust,ignore
//! let analyzer = Analyzer::new(AnalyzerConfig::default());
//! let analysis = analyzer.analyze(task_set, Policy::Rm)?;
//! ```

pub mod dynamic_priority;
pub mod error;
pub mod feasibility;
pub mod fixed_priority;
pub mod protocols;
pub mod verdict;

pub use error::SchedulerError;
pub use fixed_priority::PriorityTie;
pub use verdict::{Criterion, DecisionPoint, SchedulabilityReport, Verdict};

use std::str::FromStr;

use serde::Deserialize;
use tracing::info;

use crate::simulator::{simulate_with_limit, DispatchRule, Timeline};
use crate::task::{InputError, Policy, PolicyClass, ResourceProtocol, TaskSet, Time};
use crate::timing::{bounded_hyperperiod, HyperperiodError, DEFAULT_HYPERPERIOD_LIMIT};

use dynamic_priority::{test_dynamic_priority, DEFAULT_CHECKPOINT_LIMIT};
use fixed_priority::{assign_priorities, test_fixed_priority};

// ── Configuration ─────────────────────────────────────────────────────────────

/// When the analyzer simulates the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineMode {
    /// Only for a set the engine reports schedulable.
    #[default]
    #[serde(alias = "when-schedulable")]
    WhenSchedulable,
    /// Regardless of the verdict (misses show up in the timeline).
    Always,
    Never,
}

impl TimelineMode {
    fn wants(self, schedulable: bool) -> bool {
        match self {
            TimelineMode::WhenSchedulable => schedulable,
            TimelineMode::Always => true,
            TimelineMode::Never => false,
        }
    }
}

impl FromStr for TimelineMode {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "when-schedulable" => Ok(TimelineMode::WhenSchedulable),
            "always" => Ok(TimelineMode::Always),
            "never" => Ok(TimelineMode::Never),
            _ => Err(InputError::Malformed {
                what: "timeline mode".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Safety limits and output options of one [`Analyzer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Largest hyperperiod (in ticks) the analyzer will simulate or scan.
    pub hyperperiod_limit: Time,
    /// Largest number of processor-demand checkpoints.
    pub checkpoint_limit: usize,
    pub timeline: TimelineMode,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            hyperperiod_limit: DEFAULT_HYPERPERIOD_LIMIT,
            checkpoint_limit: DEFAULT_CHECKPOINT_LIMIT,
            timeline: TimelineMode::default(),
        }
    }
}

// ── Results ───────────────────────────────────────────────────────────────────

/// What happened to the timeline of a completed analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineOutcome {
    /// Not wanted under the configured [`TimelineMode`].
    NotRequested,
    Generated(Timeline),
    /// Wanted, but the hyperperiod could not be simulated.
    Unavailable(HyperperiodError),
}

impl TimelineOutcome {
    pub fn timeline(&self) -> Option<&Timeline> {
        match self {
            TimelineOutcome::Generated(t) => Some(t),
            _ => None,
        }
    }
}

/// A policy that was actually analysed.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedAnalysis {
    pub policy: Policy,
    /// The analysed set; carries the assigned priorities under RM/DM.
    pub task_set: TaskSet,
    /// `None` when the hyperperiod overflowed or exceeded the limit.
    pub hyperperiod: Option<Time>,
    /// Equal ranking keys resolved by id (RM/DM only).
    pub ties: Vec<PriorityTie>,
    pub report: SchedulabilityReport,
    pub timeline: TimelineOutcome,
}

impl CompletedAnalysis {
    pub fn is_schedulable(&self) -> bool {
        self.report.is_schedulable()
    }
}

/// Result of [`Analyzer::analyze`].
#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
    Completed(CompletedAnalysis),
    /// Recognised resource-sharing policy without an analysis.
    NotImplemented {
        policy: Policy,
        protocol: ResourceProtocol,
    },
}

// ── Analyzer ──────────────────────────────────────────────────────────────────

/// Runs schedulability analyses under one configuration.
///
/// Stateless between calls: every run owns its task set and allocates its
/// own simulation state.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    // ── Public entry point ────────────────────────────────────────────────────

    /// Analyse `task_set` under `policy`.
    ///
    /// # Errors
    /// * [`SchedulerError::Input`] – `task_set` is empty.
    /// * [`SchedulerError::DegenerateHyperperiod`] /
    ///   [`SchedulerError::TooManyCheckpoints`] – EDF/LST on a set whose
    ///   hyperperiod or checkpoint set exceeds the configured limits.
    pub fn analyze(&self, task_set: TaskSet, policy: Policy) -> Result<Analysis, SchedulerError> {
        if task_set.is_empty() {
            return Err(InputError::NoTasks.into());
        }

        info!(
            policy = %policy,
            task_count = task_set.len(),
            "=== Analyzer::analyze() ==="
        );

        let analysis = match policy.class() {
            PolicyClass::FixedPriority(key) => {
                let mut task_set = task_set;
                let ties = assign_priorities(&mut task_set, key);
                let report = test_fixed_priority(&task_set);
                let hyperperiod = bounded_hyperperiod(&task_set, self.config.hyperperiod_limit);
                let timeline = self.timeline(
                    &task_set,
                    DispatchRule::FixedPriority,
                    report.is_schedulable(),
                    hyperperiod.clone(),
                )?;
                Analysis::Completed(CompletedAnalysis {
                    policy,
                    task_set,
                    hyperperiod: hyperperiod.ok(),
                    ties,
                    report,
                    timeline,
                })
            }
            PolicyClass::DynamicPriority(rule) => {
                let hyperperiod = bounded_hyperperiod(&task_set, self.config.hyperperiod_limit)?;
                let report =
                    test_dynamic_priority(&task_set, hyperperiod, self.config.checkpoint_limit)?;
                let timeline = self.timeline(
                    &task_set,
                    rule.into(),
                    report.is_schedulable(),
                    Ok(hyperperiod),
                )?;
                Analysis::Completed(CompletedAnalysis {
                    policy,
                    task_set,
                    hyperperiod: Some(hyperperiod),
                    ties: Vec::new(),
                    report,
                    timeline,
                })
            }
            PolicyClass::ResourceSharing(protocol) => {
                info!(policy = %policy, "{protocol} analysis is not implemented");
                return Ok(Analysis::NotImplemented { policy, protocol });
            }
        };

        if let Analysis::Completed(done) = &analysis {
            info!(
                policy = %policy,
                schedulable = done.is_schedulable(),
                criterion = ?done.report.verdict.deciding_criterion(),
                "=== Analysis complete ==="
            );
        }
        Ok(analysis)
    }

    fn timeline(
        &self,
        task_set: &TaskSet,
        rule: DispatchRule,
        schedulable: bool,
        hyperperiod: Result<Time, HyperperiodError>,
    ) -> Result<TimelineOutcome, SchedulerError> {
        if !self.config.timeline.wants(schedulable) {
            return Ok(TimelineOutcome::NotRequested);
        }
        match hyperperiod {
            Ok(h) => Ok(TimelineOutcome::Generated(simulate_with_limit(
                task_set,
                rule,
                h,
                self.config.hyperperiod_limit,
            )?)),
            Err(e) => Ok(TimelineOutcome::Unavailable(e)),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
