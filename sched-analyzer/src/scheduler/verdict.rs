/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Verdicts and decision traces returned by the schedulability tests.
//!
//! The engines perform no output of their own.  Every intermediate step that
//! influenced a verdict is recorded as a [`DecisionPoint`] so a presentation
//! layer (see [`crate::report`]) can render it afterwards.

use crate::task::Time;

use super::feasibility::UtilizationCheck;
use super::fixed_priority::ResponseTime;

/// The test that produced (part of) a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    /// Liu & Layland bound (fixed priority) or `U ≤ 1` (dynamic priority).
    UtilizationBound,
    /// Iterative response-time analysis.
    ResponseTimeAnalysis,
    /// Processor-demand criterion at deadline checkpoints.
    ProcessorDemand,
}

/// Outcome of a schedulability test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Schedulable(Criterion),
    Unschedulable(Criterion),
    /// `by` could not decide; `then` is the verdict of the follow-up test.
    Inconclusive { by: Criterion, then: Box<Verdict> },
}

impl Verdict {
    pub(crate) fn inconclusive(by: Criterion, then: Verdict) -> Self {
        Verdict::Inconclusive {
            by,
            then: Box::new(then),
        }
    }

    pub(crate) fn from_outcome(schedulable: bool, criterion: Criterion) -> Self {
        if schedulable {
            Verdict::Schedulable(criterion)
        } else {
            Verdict::Unschedulable(criterion)
        }
    }

    pub fn is_schedulable(&self) -> bool {
        match self {
            Verdict::Schedulable(_) => true,
            Verdict::Unschedulable(_) => false,
            Verdict::Inconclusive { then, .. } => then.is_schedulable(),
        }
    }

    /// The criterion that finally decided the verdict.
    pub fn deciding_criterion(&self) -> Criterion {
        match self {
            Verdict::Schedulable(c) | Verdict::Unschedulable(c) => *c,
            Verdict::Inconclusive { then, .. } => then.deciding_criterion(),
        }
    }
}

/// One recorded step of a schedulability test.
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionPoint {
    /// Utilisation compared against a bound.
    UtilizationBound(UtilizationCheck),
    /// Response-time iteration of one task.
    ResponseTime(ResponseTime),
    /// Processor demand `g(ℓ)` evaluated at checkpoint `ℓ`.
    Demand { checkpoint: Time, demand: Time },
}

impl DecisionPoint {
    pub fn passed(&self) -> bool {
        match self {
            DecisionPoint::UtilizationBound(check) => check.passed(),
            DecisionPoint::ResponseTime(rt) => rt.meets_deadline(),
            DecisionPoint::Demand { checkpoint, demand } => demand <= checkpoint,
        }
    }
}

/// Result of one schedulability test: the verdict plus its decision trace.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulabilityReport {
    /// Deadline-based utilisation of the analysed set.
    pub utilization: f64,
    pub verdict: Verdict,
    /// Decision points in evaluation order.
    pub trace: Vec<DecisionPoint>,
}

impl SchedulabilityReport {
    pub fn is_schedulable(&self) -> bool {
        self.verdict.is_schedulable()
    }

    /// Response-time results recorded in the trace (empty when the
    /// utilisation bound decided).
    pub fn response_times(&self) -> impl Iterator<Item = &ResponseTime> + '_ {
        self.trace.iter().filter_map(|d| match d {
            DecisionPoint::ResponseTime(rt) => Some(rt),
            _ => None,
        })
    }

    /// Checkpoint at which the processor-demand criterion failed, if any.
    pub fn demand_violation(&self) -> Option<Time> {
        self.trace.iter().find_map(|d| match d {
            DecisionPoint::Demand { checkpoint, demand } if demand > checkpoint => {
                Some(*checkpoint)
            }
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inconclusive_verdict_defers_to_follow_up() {
        let v = Verdict::inconclusive(
            Criterion::UtilizationBound,
            Verdict::Unschedulable(Criterion::ProcessorDemand),
        );
        assert!(!v.is_schedulable());
        assert_eq!(v.deciding_criterion(), Criterion::ProcessorDemand);
    }

    #[test]
    fn demand_point_passes_when_demand_fits() {
        assert!(DecisionPoint::Demand { checkpoint: 5, demand: 5 }.passed());
        assert!(!DecisionPoint::Demand { checkpoint: 4, demand: 5 }.passed());
    }
}
