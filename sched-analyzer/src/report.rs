/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Plain-text rendering of an [`Analysis`].
//!
//! The engines only return data; this is the single place that turns a
//! verdict, its decision trace and the timeline into human-readable text.

use std::fmt;

use crate::scheduler::fixed_priority::RtaOutcome;
use crate::scheduler::{
    Analysis, CompletedAnalysis, Criterion, DecisionPoint, TimelineOutcome, Verdict,
};

/// [`fmt::Display`] adapter for an [`Analysis`].
pub struct Report<'a> {
    analysis: &'a Analysis,
}

impl<'a> Report<'a> {
    pub fn new(analysis: &'a Analysis) -> Self {
        Self { analysis }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.analysis {
            Analysis::Completed(done) => write_completed(f, done),
            Analysis::NotImplemented { policy, protocol } => {
                writeln!(f, "Policy: {}", policy.label())?;
                writeln!(f, "{protocol} analysis is not implemented.")
            }
        }
    }
}

fn criterion_name(c: Criterion) -> &'static str {
    match c {
        Criterion::UtilizationBound => "utilization bound",
        Criterion::ResponseTimeAnalysis => "response-time analysis",
        Criterion::ProcessorDemand => "processor demand criterion",
    }
}

fn write_completed(f: &mut fmt::Formatter<'_>, done: &CompletedAnalysis) -> fmt::Result {
    writeln!(f, "Policy: {}", done.policy.label())?;

    // ── Task table ────────────────────────────────────────────────────────────
    writeln!(f, "Tasks:")?;
    for t in &done.task_set {
        write!(f, "  {}: C={} T={} D={}", t.id(), t.wcet, t.period, t.deadline)?;
        if let Some(p) = t.priority {
            write!(f, " priority={p}")?;
        }
        writeln!(f)?;
    }
    for tie in &done.ties {
        writeln!(
            f,
            "  note: {} and {} share {} {}; {} ranked higher",
            tie.first, tie.second, tie.key, tie.value, tie.first
        )?;
    }

    // ── Decision trace ────────────────────────────────────────────────────────
    let mut demand_header = false;
    for point in &done.report.trace {
        match point {
            DecisionPoint::UtilizationBound(check) => {
                let cmp = if check.passed() { "<=" } else { ">" };
                writeln!(
                    f,
                    "Utilization: {:.4} {cmp} {:.4}",
                    check.utilization, check.bound
                )?;
            }
            DecisionPoint::ResponseTime(rt) => {
                let iterates: Vec<String> = rt.iterations.iter().map(|r| r.to_string()).collect();
                write!(f, "  {} response time: {}", rt.task, iterates.join(" -> "))?;
                if rt.blocking > 0 {
                    write!(f, " (blocking {})", rt.blocking)?;
                }
                match rt.outcome {
                    RtaOutcome::Converged(r) => writeln!(f, "; R = {r} <= D = {}", rt.deadline)?,
                    RtaOutcome::DeadlineExceeded(r) => {
                        writeln!(f, "; {r} > D = {}, not schedulable", rt.deadline)?
                    }
                }
            }
            DecisionPoint::Demand { checkpoint, demand } => {
                if !demand_header {
                    writeln!(f, "Processor demand:")?;
                    demand_header = true;
                }
                let cmp = if demand <= checkpoint { "<=" } else { ">" };
                writeln!(f, "  g({checkpoint}) = {demand} {cmp} {checkpoint}")?;
            }
        }
    }

    // ── Verdict ───────────────────────────────────────────────────────────────
    write_verdict(f, &done.report.verdict)?;

    // ── Timeline ──────────────────────────────────────────────────────────────
    match &done.timeline {
        TimelineOutcome::NotRequested => {}
        TimelineOutcome::Unavailable(err) => writeln!(f, "Timeline unavailable: {err}")?,
        TimelineOutcome::Generated(timeline) => {
            writeln!(f, "Timeline (0 to {}):", timeline.len())?;
            writeln!(f, "{timeline}")?;
            for miss in timeline.deadline_misses() {
                writeln!(f, "  deadline miss: {} at {}", miss.task, miss.deadline)?;
            }
        }
    }
    Ok(())
}

fn write_verdict(f: &mut fmt::Formatter<'_>, verdict: &Verdict) -> fmt::Result {
    if let Verdict::Inconclusive { by, .. } = verdict {
        writeln!(f, "Inconclusive by {}.", criterion_name(*by))?;
    }
    let outcome = if verdict.is_schedulable() {
        "SCHEDULABLE"
    } else {
        "NOT SCHEDULABLE"
    };
    writeln!(
        f,
        "Verdict: {outcome} ({})",
        criterion_name(verdict.deciding_criterion())
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
