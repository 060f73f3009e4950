/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Timing analysis: utilisation and hyperperiod of a task set.
//!
//! The hyperperiod of a set of periodic tasks is the Least Common Multiple
//! (LCM) of all their periods.  It is the window after which the schedule
//! repeats and therefore bounds both the simulator and the processor-demand
//! checkpoint set.
//!
//! | Failure | Result |
//! |---------|--------|
//! | LCM overflows `u64` | `Err(HyperperiodError::Overflow)` |
//! | LCM exceeds the caller's safety limit | `Err(HyperperiodError::TooLarge)` |
//! | Empty task set | `Ok(1)`, not an error |

pub mod math;

use thiserror::Error;
use tracing::{debug, warn};

use crate::task::{Task, TaskSet, Time};
use math::lcm_of_slice;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Default upper limit on the hyperperiod, in ticks.
///
/// The simulator allocates one slot per tick, so this also caps the timeline
/// size.  Callers can pass their own value to [`bounded_hyperperiod`].
pub const DEFAULT_HYPERPERIOD_LIMIT: Time = 1_000_000;

// ── Error type ────────────────────────────────────────────────────────────────

/// Errors that can occur during hyperperiod calculation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HyperperiodError {
    /// LCM calculation overflowed `u64`.
    ///
    /// Contains the two operands that caused the overflow.
    #[error("LCM overflow computing lcm({a}, {b})")]
    Overflow { a: u64, b: u64 },

    /// The calculated hyperperiod exceeded the configured limit.
    #[error("hyperperiod {value} exceeds the configured limit of {limit} ticks")]
    TooLarge { value: Time, limit: Time },
}

// ── Utilisation ───────────────────────────────────────────────────────────────

/// Deadline-based utilisation `Σ C/D`.
///
/// Both engines compare this figure against their bounds.  For implicit
/// deadlines it is the classical utilisation.
pub fn utilization(task_set: &TaskSet) -> f64 {
    task_set.iter().map(Task::utilization).sum()
}

/// Classical utilisation `Σ C/T`, for callers that ask for it explicitly.
pub fn period_utilization(task_set: &TaskSet) -> f64 {
    task_set.iter().map(Task::period_utilization).sum()
}

// ── Hyperperiod ───────────────────────────────────────────────────────────────

/// LCM of all periods in `task_set`; `1` for an empty set.
///
/// # Errors
/// * [`HyperperiodError::Overflow`] – LCM computation exceeded `u64`.
pub fn hyperperiod(task_set: &TaskSet) -> Result<Time, HyperperiodError> {
    let mut periods: Vec<Time> = task_set.iter().map(|t| t.period).collect();
    periods.sort_unstable();
    periods.dedup();

    let value = lcm_of_slice(&periods)?;
    debug!(hyperperiod = value, unique_periods = ?periods, "calculated hyperperiod");
    Ok(value)
}

/// [`hyperperiod`] with a safety limit.
///
/// # Errors
/// * [`HyperperiodError::Overflow`] – LCM computation exceeded `u64`.
/// * [`HyperperiodError::TooLarge`] – result exceeds `limit`.
pub fn bounded_hyperperiod(task_set: &TaskSet, limit: Time) -> Result<Time, HyperperiodError> {
    let value = hyperperiod(task_set)?;
    if value > limit {
        warn!(hyperperiod = value, limit, "hyperperiod exceeds configured limit");
        return Err(HyperperiodError::TooLarge { value, limit });
    }
    Ok(value)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
