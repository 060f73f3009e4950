/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Dynamic-priority engine: EDF/LST utilisation test and processor-demand
//! criterion.
//!
//! Decision order:
//!
//! 1. `U ≤ 1` ⇒ schedulable.
//! 2. `U > 1` and every `D = T` ⇒ unschedulable (exact in that case).
//! 3. Otherwise the processor-demand criterion decides: at every checkpoint
//!    `ℓ = k·T_i + D_i ≤ H` the demand
//!    `g(ℓ) = Σ ⌊(ℓ + T_i − D_i) / T_i⌋ · C_i` must not exceed `ℓ`.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::task::{TaskSet, Time};

use super::error::SchedulerError;
use super::feasibility::dynamic_priority_bound_check;
use super::verdict::{Criterion, DecisionPoint, SchedulabilityReport, Verdict};

/// Default upper limit on the number of processor-demand checkpoints.
pub const DEFAULT_CHECKPOINT_LIMIT: usize = 1_000_000;

/// Processor demand `g(ℓ)` of `task_set` at checkpoint `l`.
///
/// Tasks whose first deadline lies beyond `l` contribute nothing.
pub fn processor_demand(task_set: &TaskSet, l: Time) -> Time {
    task_set
        .iter()
        .map(|t| {
            let jobs = l.saturating_add(t.period).saturating_sub(t.deadline) / t.period;
            jobs.saturating_mul(t.wcet)
        })
        .fold(0, Time::saturating_add)
}

/// Absolute deadlines `k·T + D ≤ hyperperiod` of every task, deduplicated
/// and sorted ascending.
///
/// # Errors
/// [`SchedulerError::TooManyCheckpoints`] if the (undeduplicated) number of
/// checkpoints exceeds `limit`.
pub fn demand_checkpoints(
    task_set: &TaskSet,
    hyperperiod: Time,
    limit: usize,
) -> Result<Vec<Time>, SchedulerError> {
    let count: u64 = task_set
        .iter()
        .filter(|t| t.deadline <= hyperperiod)
        .map(|t| (hyperperiod - t.deadline) / t.period + 1)
        .sum();

    if count > limit as u64 {
        warn!(count, limit, "processor-demand checkpoint set exceeds limit");
        return Err(SchedulerError::TooManyCheckpoints { count, limit });
    }

    let points: BTreeSet<Time> = task_set
        .iter()
        .flat_map(|t| {
            (0..)
                .map(move |k: Time| k * t.period + t.deadline)
                .take_while(move |&l| l <= hyperperiod)
        })
        .collect();

    Ok(points.into_iter().collect())
}

/// EDF/LST schedulability test over one hyperperiod.
///
/// Stops at the first checkpoint whose demand exceeds its length.
///
/// # Errors
/// [`SchedulerError::TooManyCheckpoints`] when the processor-demand criterion
/// is needed and its checkpoint set exceeds `checkpoint_limit`.
pub fn test_dynamic_priority(
    task_set: &TaskSet,
    hyperperiod: Time,
    checkpoint_limit: usize,
) -> Result<SchedulabilityReport, SchedulerError> {
    let check = dynamic_priority_bound_check(task_set);
    let mut trace = vec![DecisionPoint::UtilizationBound(check)];

    if check.passed() {
        info!(utilization = check.utilization, "schedulable by utilization bound");
        return Ok(SchedulabilityReport {
            utilization: check.utilization,
            verdict: Verdict::Schedulable(Criterion::UtilizationBound),
            trace,
        });
    }

    if task_set.all_implicit_deadlines() {
        info!(
            utilization = check.utilization,
            "unschedulable: utilization above 1 with implicit deadlines"
        );
        return Ok(SchedulabilityReport {
            utilization: check.utilization,
            verdict: Verdict::Unschedulable(Criterion::UtilizationBound),
            trace,
        });
    }

    info!(
        utilization = check.utilization,
        "utilization inconclusive, applying processor demand criterion"
    );

    let checkpoints = demand_checkpoints(task_set, hyperperiod, checkpoint_limit)?;
    let mut schedulable = true;
    for l in checkpoints {
        let demand = processor_demand(task_set, l);
        debug!(checkpoint = l, demand, "processor demand");
        trace.push(DecisionPoint::Demand { checkpoint: l, demand });
        if demand > l {
            warn!(checkpoint = l, demand, "processor demand exceeds interval length");
            schedulable = false;
            break;
        }
    }

    Ok(SchedulabilityReport {
        utilization: check.utilization,
        verdict: Verdict::inconclusive(
            Criterion::UtilizationBound,
            Verdict::from_outcome(schedulable, Criterion::ProcessorDemand),
        ),
        trace,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskParams;
    use crate::timing::hyperperiod;

    fn set(params: &[(i64, i64, i64)]) -> TaskSet {
        TaskSet::from_params(params.iter().map(|&(c, t, d)| TaskParams::new(c, t, d))).unwrap()
    }

    fn run(ts: &TaskSet) -> SchedulabilityReport {
        test_dynamic_priority(ts, hyperperiod(ts).unwrap(), DEFAULT_CHECKPOINT_LIMIT).unwrap()
    }

    // ── processor_demand / demand_checkpoints ─────────────────────────────────

    #[test]
    fn demand_counts_jobs_with_deadline_inside_interval() {
        let ts = set(&[(2, 4, 3), (2, 8, 5)]);
        assert_eq!(processor_demand(&ts, 3), 2);
        assert_eq!(processor_demand(&ts, 5), 4);
        assert_eq!(processor_demand(&ts, 7), 6);
    }

    #[test]
    fn demand_ignores_tasks_with_deadline_beyond_interval() {
        // ℓ + T < D: no contribution instead of a negative one
        let ts = set(&[(1, 2, 2), (1, 2, 9)]);
        assert_eq!(processor_demand(&ts, 2), 1);
    }

    #[test]
    fn checkpoints_are_sorted_and_deduplicated() {
        let ts = set(&[(1, 4, 2), (1, 6, 2), (1, 12, 10)]);
        let points = demand_checkpoints(&ts, 12, DEFAULT_CHECKPOINT_LIMIT).unwrap();
        assert_eq!(points, vec![2, 6, 8, 10]);
    }

    #[test]
    fn checkpoint_limit_is_enforced() {
        let ts = set(&[(1, 2, 1), (1, 3, 2)]);
        let err = demand_checkpoints(&ts, 6, 2).unwrap_err();
        assert!(matches!(err, SchedulerError::TooManyCheckpoints { count: 5, limit: 2 }));
        assert!(err.is_degenerate());
    }

    // ── test_dynamic_priority ─────────────────────────────────────────────────

    #[test]
    fn implicit_deadlines_under_one_pass_by_utilization() {
        let report = run(&set(&[(1, 2, 2), (2, 4, 4)]));
        assert_eq!(report.verdict, Verdict::Schedulable(Criterion::UtilizationBound));
        assert_eq!(report.trace.len(), 1);
    }

    #[test]
    fn implicit_deadlines_over_one_fail_by_utilization() {
        let report = run(&set(&[(2, 3, 3), (2, 4, 4)]));
        assert_eq!(report.verdict, Verdict::Unschedulable(Criterion::UtilizationBound));
        assert_eq!(report.demand_violation(), None);
    }

    #[test]
    fn constrained_deadlines_pass_by_processor_demand() {
        // U = 2/3 + 2/5 ≈ 1.07 but g(3)=2, g(5)=4, g(7)=6
        let report = run(&set(&[(2, 4, 3), (2, 8, 5)]));
        assert!(report.utilization > 1.0);
        assert_eq!(
            report.verdict,
            Verdict::inconclusive(
                Criterion::UtilizationBound,
                Verdict::Schedulable(Criterion::ProcessorDemand)
            )
        );
        let checked: Vec<_> = report
            .trace
            .iter()
            .filter_map(|d| match d {
                DecisionPoint::Demand { checkpoint, demand } => Some((*checkpoint, *demand)),
                _ => None,
            })
            .collect();
        assert_eq!(checked, vec![(3, 2), (5, 4), (7, 6)]);
    }

    #[test]
    fn constrained_deadlines_fail_at_first_violation() {
        // g(3) = 3, g(4) = 5 > 4; checkpoint 7 is never evaluated
        let report = run(&set(&[(3, 4, 3), (2, 8, 4)]));
        assert!(!report.is_schedulable());
        assert_eq!(report.verdict.deciding_criterion(), Criterion::ProcessorDemand);
        assert_eq!(report.demand_violation(), Some(4));
        assert_eq!(report.trace.len(), 3);
    }

    #[test]
    fn degenerate_checkpoint_set_is_an_error() {
        let ts = set(&[(3, 4, 3), (2, 8, 4)]);
        let err = test_dynamic_priority(&ts, 8, 1).unwrap_err();
        assert!(matches!(err, SchedulerError::TooManyCheckpoints { .. }));
    }
}
