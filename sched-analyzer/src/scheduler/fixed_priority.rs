/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Fixed-priority engine: RM/DM priority assignment, Liu & Layland bound and
//! response-time analysis.
//!
//! # Priority assignment
//! Tasks are ranked by ascending key (period for RM, deadline for DM) with
//! ascending id as the tie-break.  The first task gets level `N`, the next
//! `N-1`, and so on: every task ends up with a distinct level, so the
//! dispatch order is total and reproducible.  Tasks that share a key are
//! reported as [`PriorityTie`]s.
//!
//! # Response-time analysis
//! For task `i`, iterate
//!
//! ```text
//! R_0     = C_i + B_i
//! R_{k+1} = C_i + B_i + Σ_{j ≠ i, D_j ≤ D_i} ⌈R_k / T_j⌉ · C_j
//! ```
//!
//! until `R_{k+1} = R_k` (converged) or `R_{k+1} > D_i` (deadline miss).
//! The sequence is non-decreasing, so it always stops by the deadline.

use tracing::{debug, info, warn};

use crate::task::{RankingKey, Task, TaskId, TaskSet, Time};
use crate::timing::math::div_ceil;

use super::feasibility::fixed_priority_bound_check;
use super::protocols::{BlockingBound, NoBlocking};
use super::verdict::{Criterion, DecisionPoint, SchedulabilityReport, Verdict};

// ── Priority assignment ───────────────────────────────────────────────────────

/// Two tasks that share the ranking key.  Non-fatal: resolved by ascending id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityTie {
    /// Lower id; received the higher of the two levels.
    pub first: TaskId,
    pub second: TaskId,
    pub key: RankingKey,
    /// The shared key value.
    pub value: Time,
}

/// Assign a distinct priority level to every task of `task_set`.
///
/// Smallest key receives `N`, strictly decreasing from there.  Returns every
/// pair of rank-adjacent tasks that share the key.
pub fn assign_priorities(task_set: &mut TaskSet, key: RankingKey) -> Vec<PriorityTie> {
    let mut order: Vec<(Time, TaskId, usize)> = task_set
        .iter()
        .enumerate()
        .map(|(idx, t)| (key.of(t), t.id(), idx))
        .collect();
    order.sort_unstable();

    let ties: Vec<PriorityTie> = order
        .windows(2)
        .filter(|pair| pair[0].0 == pair[1].0)
        .map(|pair| PriorityTie {
            first: pair[0].1,
            second: pair[1].1,
            key,
            value: pair[0].0,
        })
        .collect();

    for tie in &ties {
        warn!(
            first = %tie.first,
            second = %tie.second,
            key = %tie.key,
            value = tie.value,
            "tasks share the ranking key; ordering by ascending id"
        );
    }

    let n = order.len();
    let tasks = task_set.tasks_mut();
    for (rank, &(_, id, idx)) in order.iter().enumerate() {
        let level = (n - rank) as u32;
        tasks[idx].priority = Some(level);
        debug!(task = %id, priority = level, "priority assigned");
    }

    ties
}

// ── Response-time analysis ────────────────────────────────────────────────────

/// How the response-time iteration for one task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtaOutcome {
    /// Fixed point reached at or below the deadline.
    Converged(Time),
    /// The iterate exceeded the deadline; carries that iterate.
    DeadlineExceeded(Time),
}

/// Response-time iteration of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseTime {
    pub task: TaskId,
    pub deadline: Time,
    /// Blocking term `B_i` added to every iterate.
    pub blocking: Time,
    /// `R_0, R_1, …` without the repeated fixed point.
    pub iterations: Vec<Time>,
    pub outcome: RtaOutcome,
}

impl ResponseTime {
    pub fn meets_deadline(&self) -> bool {
        matches!(self.outcome, RtaOutcome::Converged(_))
    }

    /// The converged worst-case response time, if any.
    pub fn response_time(&self) -> Option<Time> {
        match self.outcome {
            RtaOutcome::Converged(r) => Some(r),
            RtaOutcome::DeadlineExceeded(_) => None,
        }
    }
}

/// Iterate the response time of `task` against the rest of `task_set`.
///
/// Interference comes from every other task whose deadline does not exceed
/// `task`'s deadline.
pub fn response_time(task: &Task, task_set: &TaskSet, blocking: Time) -> ResponseTime {
    let interferers: Vec<&Task> = task_set
        .iter()
        .filter(|other| other.id() != task.id() && other.deadline <= task.deadline)
        .collect();

    let base = task.wcet.saturating_add(blocking);
    let mut current = base;
    let mut iterations = vec![current];

    let outcome = loop {
        if current > task.deadline {
            break RtaOutcome::DeadlineExceeded(current);
        }
        let interference: Time = interferers
            .iter()
            .map(|j| div_ceil(current, j.period).saturating_mul(j.wcet))
            .fold(0, Time::saturating_add);
        let next = base.saturating_add(interference);
        if next == current {
            break RtaOutcome::Converged(current);
        }
        iterations.push(next);
        current = next;
    };

    debug!(task = %task.id(), ?iterations, ?outcome, "response-time analysis");

    ResponseTime {
        task: task.id(),
        deadline: task.deadline,
        blocking,
        iterations,
        outcome,
    }
}

/// Run [`response_time`] for every task.  A failing task does not stop the
/// analysis of the others.
pub fn response_time_analysis(task_set: &TaskSet, blocking: &dyn BlockingBound) -> Vec<ResponseTime> {
    task_set
        .iter()
        .map(|task| response_time(task, task_set, blocking.blocking_time(task)))
        .collect()
}

// ── Schedulability test ───────────────────────────────────────────────────────

/// RM/DM schedulability test for independent tasks.
pub fn test_fixed_priority(task_set: &TaskSet) -> SchedulabilityReport {
    test_fixed_priority_with_blocking(task_set, &NoBlocking)
}

/// RM/DM schedulability test with a blocking term per task.
///
/// 1. Liu & Layland bound: `U ≤ N·(2^(1/N) − 1)` ⇒ schedulable.  Skipped when
///    any task has a non-zero blocking term.
/// 2. Otherwise response-time analysis decides: the set passes only if every
///    task converges within its deadline.
pub fn test_fixed_priority_with_blocking(
    task_set: &TaskSet,
    blocking: &dyn BlockingBound,
) -> SchedulabilityReport {
    let check = fixed_priority_bound_check(task_set);
    let unblocked = task_set.iter().all(|t| blocking.blocking_time(t) == 0);
    let mut trace = vec![DecisionPoint::UtilizationBound(check)];

    if check.passed() && unblocked {
        info!(
            utilization = check.utilization,
            bound = check.bound,
            "schedulable by utilization bound"
        );
        return SchedulabilityReport {
            utilization: check.utilization,
            verdict: Verdict::Schedulable(Criterion::UtilizationBound),
            trace,
        };
    }

    info!(
        utilization = check.utilization,
        bound = check.bound,
        "utilization bound inconclusive, running response-time analysis"
    );

    let results = response_time_analysis(task_set, blocking);
    let all_converged = results.iter().all(ResponseTime::meets_deadline);
    for rt in results.iter().filter(|rt| !rt.meets_deadline()) {
        warn!(task = %rt.task, deadline = rt.deadline, "response time exceeds deadline");
    }
    trace.extend(results.into_iter().map(DecisionPoint::ResponseTime));

    SchedulabilityReport {
        utilization: check.utilization,
        verdict: Verdict::inconclusive(
            Criterion::UtilizationBound,
            Verdict::from_outcome(all_converged, Criterion::ResponseTimeAnalysis),
        ),
        trace,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskParams;

    fn set(params: &[(i64, i64, i64)]) -> TaskSet {
        TaskSet::from_params(params.iter().map(|&(c, t, d)| TaskParams::new(c, t, d))).unwrap()
    }

    fn priorities(ts: &TaskSet) -> Vec<Option<u32>> {
        ts.iter().map(|t| t.priority).collect()
    }

    // ── assign_priorities ─────────────────────────────────────────────────────

    #[test]
    fn rm_ranks_by_period() {
        let mut ts = set(&[(1, 20, 20), (1, 4, 4), (1, 6, 6)]);
        let ties = assign_priorities(&mut ts, RankingKey::Period);
        assert!(ties.is_empty());
        assert_eq!(priorities(&ts), vec![Some(1), Some(3), Some(2)]);
    }

    #[test]
    fn dm_ranks_by_deadline() {
        // periods say T1 first, deadlines say T2 first
        let mut ts = set(&[(1, 5, 5), (1, 10, 3)]);
        assign_priorities(&mut ts, RankingKey::Deadline);
        assert_eq!(priorities(&ts), vec![Some(1), Some(2)]);
    }

    #[test]
    fn equal_periods_are_reported_and_ordered_by_id() {
        let mut ts = set(&[(1, 10, 10), (2, 5, 5), (3, 10, 10)]);
        let ties = assign_priorities(&mut ts, RankingKey::Period);
        assert_eq!(
            ties,
            vec![PriorityTie {
                first: TaskId(1),
                second: TaskId(3),
                key: RankingKey::Period,
                value: 10
            }]
        );
        assert_eq!(priorities(&ts), vec![Some(2), Some(3), Some(1)]);
    }

    #[test]
    fn tie_break_is_reproducible() {
        let params = [(1, 8, 8), (1, 8, 8), (1, 8, 8)];
        let mut a = set(&params);
        let mut b = set(&params);
        let ties_a = assign_priorities(&mut a, RankingKey::Period);
        let ties_b = assign_priorities(&mut b, RankingKey::Period);
        assert_eq!(ties_a.len(), 2);
        assert_eq!(ties_a, ties_b);
        assert_eq!(priorities(&a), vec![Some(3), Some(2), Some(1)]);
        assert_eq!(priorities(&a), priorities(&b));
    }

    // ── response_time_analysis ────────────────────────────────────────────────

    #[test]
    fn response_times_converge_for_textbook_set() {
        let ts = set(&[(1, 4, 4), (2, 6, 6), (3, 20, 20)]);
        let results = response_time_analysis(&ts, &NoBlocking);
        let converged: Vec<_> = results.iter().map(ResponseTime::response_time).collect();
        assert_eq!(converged, vec![Some(1), Some(3), Some(10)]);
        assert_eq!(results[2].iterations, vec![3, 6, 7, 9, 10]);

        // reproducible across runs
        assert_eq!(results, response_time_analysis(&ts, &NoBlocking));
    }

    #[test]
    fn response_time_reports_deadline_exceeded() {
        // T2: 3, 3 + ⌈3/4⌉·2 = 5, 3 + ⌈5/4⌉·2 = 7 > 5
        let ts = set(&[(2, 4, 4), (3, 5, 5)]);
        let results = response_time_analysis(&ts, &NoBlocking);
        assert_eq!(results[0].outcome, RtaOutcome::Converged(2));
        assert_eq!(results[1].outcome, RtaOutcome::DeadlineExceeded(7));
        assert_eq!(results[1].iterations, vec![3, 5, 7]);
    }

    #[test]
    fn blocking_term_extends_response_time() {
        let ts = set(&[(1, 4, 4), (2, 6, 6)]);
        let blocking = |t: &Task| -> Time { if t.id() == TaskId(1) { 2 } else { 0 } };
        let results = response_time_analysis(&ts, &blocking);
        assert_eq!(results[0].response_time(), Some(3));
        assert_eq!(results[0].blocking, 2);
        assert_eq!(results[1].response_time(), Some(3));
    }

    // ── test_fixed_priority ───────────────────────────────────────────────────

    #[test]
    fn utilization_below_bound_short_circuits() {
        // U = 0.8 ≤ 0.8284
        let report = test_fixed_priority(&set(&[(4, 10, 10), (4, 10, 10)]));
        assert_eq!(report.verdict, Verdict::Schedulable(Criterion::UtilizationBound));
        assert_eq!(report.trace.len(), 1);
        assert_eq!(report.response_times().count(), 0);
    }

    #[test]
    fn utilization_above_bound_falls_through_to_rta() {
        // U = 0.9 > 0.8284; both tasks converge at 9
        let report = test_fixed_priority(&set(&[(4, 10, 10), (5, 10, 10)]));
        assert_eq!(
            report.verdict,
            Verdict::inconclusive(
                Criterion::UtilizationBound,
                Verdict::Schedulable(Criterion::ResponseTimeAnalysis)
            )
        );
        let rts: Vec<_> = report.response_times().map(|r| r.response_time()).collect();
        assert_eq!(rts, vec![Some(9), Some(9)]);
    }

    #[test]
    fn every_task_is_analysed_even_after_a_failure() {
        let report = test_fixed_priority(&set(&[(3, 5, 5), (2, 4, 4), (1, 20, 20)]));
        assert!(!report.is_schedulable());
        assert_eq!(report.verdict.deciding_criterion(), Criterion::ResponseTimeAnalysis);
        assert_eq!(report.response_times().count(), 3);
    }

    #[test]
    fn blocking_disables_the_bound_shortcut() {
        let ts = set(&[(1, 10, 10), (1, 10, 10)]);
        let report = test_fixed_priority_with_blocking(&ts, &|_: &Task| -> Time { 1 });
        assert_eq!(report.response_times().count(), 2);
        assert!(report.is_schedulable());
    }
}
