/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the analyzer.
//!
//! Three error families model the three failure layers:
//!
//! * [`InputError`]: the task set or the policy selection is invalid
//!   (defined next to the task model).
//! * [`HyperperiodError`]: every task is valid on its own, but the set's
//!   hyperperiod overflows or exceeds the safety limit.
//! * [`SchedulerError`]: top-level failure returned from
//!   [`Analyzer::analyze()`](super::Analyzer::analyze), wrapping the two above.
//!
//! A priority tie is **not** an error: it is reported as
//! [`PriorityTie`](super::fixed_priority::PriorityTie) inside the analysis.
//! An unsupported resource-sharing policy is **not** an error either: it is
//! [`Analysis::NotImplemented`](super::Analysis::NotImplemented).

use thiserror::Error;

use crate::task::{InputError, TaskId};
use crate::timing::HyperperiodError;

/// Top-level error type returned by
/// [`Analyzer::analyze()`](super::Analyzer::analyze).
///
/// | Variant | CLI exit status |
/// |---|---|
/// | `Input` | 1 |
/// | `DegenerateHyperperiod` / `TooManyCheckpoints` | 1 |
/// | `MissingPriority` | 1 (programming error in the caller) |
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The task set or policy selection failed validation.
    #[error(transparent)]
    Input(#[from] InputError),

    /// The hyperperiod overflowed or exceeded the configured limit.
    ///
    /// Reported distinctly from [`SchedulerError::Input`] because each task
    /// field was valid on its own.
    #[error("degenerate task set: {0}")]
    DegenerateHyperperiod(#[from] HyperperiodError),

    /// The processor-demand checkpoint set would exceed the configured limit.
    #[error("degenerate task set: {count} processor-demand checkpoints exceed the limit of {limit}")]
    TooManyCheckpoints { count: u64, limit: usize },

    /// A fixed-priority timeline was requested for a task without a priority.
    #[error("task {task} has no priority assigned; run priority assignment first")]
    MissingPriority { task: TaskId },
}

impl SchedulerError {
    /// `true` for the errors caused by an oversized task set rather than an
    /// invalid field.
    pub fn is_degenerate(&self) -> bool {
        matches!(
            self,
            SchedulerError::DegenerateHyperperiod(_) | SchedulerError::TooManyCheckpoints { .. }
        )
    }
}
