/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Utilisation-bound schedulability tests.
//!
//! # Theory
//! **Liu & Layland (1973)**: under a fixed-priority monotonic assignment, a
//! set of `n` independent periodic tasks is **guaranteed** schedulable on one
//! CPU if:
//!
//! $$U \leq n \left(2^{1/n} - 1\right)$$
//!
//! The bound tightens as `n` grows, converging to `ln(2) ≈ 0.693`.
//!
//! | n | Bound |
//! |---|---|
//! | 1 | 1.000 |
//! | 2 | 0.828 |
//! | 3 | 0.780 |
//! | 5 | 0.743 |
//! | ∞ | ln(2) ≈ 0.693 |
//!
//! Above the bound the set **may or may not** be schedulable and response-time
//! analysis decides.  Under EDF the bound is `1.0`, which is exact when every
//! deadline equals its period.
//!
//! Utilisation here is the deadline-based figure of
//! [`timing::utilization`](crate::timing::utilization).

use crate::task::TaskSet;
use crate::timing::utilization;

/// Utilisation bound of the dynamic-priority policies.
pub const EDF_UTILIZATION_BOUND: f64 = 1.0;

// ── Public API ────────────────────────────────────────────────────────────────

/// Compute the Liu & Layland utilisation upper bound for `n` tasks.
///
/// `U_bound(n) = n × (2^(1/n) − 1)`
///
/// Returns `1.0` for `n = 1` and `0.0` for `n = 0`.
pub fn liu_layland_bound(n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let nf = n as f64;
    nf * (2.0_f64.powf(1.0 / nf) - 1.0)
}

/// A utilisation figure compared against a bound (`≤` passes).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtilizationCheck {
    pub utilization: f64,
    pub bound: f64,
}

impl UtilizationCheck {
    pub fn passed(&self) -> bool {
        self.utilization <= self.bound
    }
}

/// Compare the task set against the Liu & Layland bound for its size.
pub fn fixed_priority_bound_check(task_set: &TaskSet) -> UtilizationCheck {
    UtilizationCheck {
        utilization: utilization(task_set),
        bound: liu_layland_bound(task_set.len()),
    }
}

/// Compare the task set against the EDF bound `U ≤ 1`.
pub fn dynamic_priority_bound_check(task_set: &TaskSet) -> UtilizationCheck {
    UtilizationCheck {
        utilization: utilization(task_set),
        bound: EDF_UTILIZATION_BOUND,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
