/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Discrete-time dispatcher over one hyperperiod.
//!
//! Each tick `t` in `0..H` runs three steps:
//!
//! 1. **Release**: a task whose next release is `t` queues a new job of `C`
//!    units with absolute deadline `t + D`.
//! 2. **Select** one task with pending work according to the
//!    [`DispatchRule`], keyed on its oldest pending job.
//! 3. **Execute** that job for one unit and record the [`Slot`].
//!
//! Each task keeps its own queue of pending jobs, so with `D > T` several
//! deadlines can be outstanding at once.  Before the releases of tick `t`
//! (and once more at `t = H`), every job whose absolute deadline is `t` and
//! which still has work left is recorded as a [`DeadlineMiss`].  The
//! simulation keeps going after a miss.

use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, warn};

use crate::scheduler::SchedulerError;
use crate::task::{DynamicRule, TaskId, TaskSet, Time};
use crate::timing::{HyperperiodError, DEFAULT_HYPERPERIOD_LIMIT};

/// How the simulator picks the task to run at each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchRule {
    /// Highest priority value; ties go to the lowest task id.
    FixedPriority,
    /// Smallest absolute deadline.
    EarliestDeadline,
    /// Smallest slack `(deadline − t) − remaining`.
    LeastSlack,
}

impl From<DynamicRule> for DispatchRule {
    fn from(rule: DynamicRule) -> Self {
        match rule {
            DynamicRule::EarliestDeadline => DispatchRule::EarliestDeadline,
            DynamicRule::LeastSlack => DispatchRule::LeastSlack,
        }
    }
}

/// What the processor did during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Idle,
    Task(TaskId),
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Idle => write!(f, "ID"),
            Slot::Task(id) => write!(f, "{id}"),
        }
    }
}

/// Pending work of `task` was still outstanding at its absolute `deadline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineMiss {
    pub task: TaskId,
    pub deadline: Time,
}

/// The dispatch sequence of one hyperperiod.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Timeline {
    slots: Vec<Slot>,
    misses: Vec<DeadlineMiss>,
}

impl Timeline {
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// `(tick, slot)` pairs in time order.
    pub fn ticks(&self) -> impl Iterator<Item = (Time, Slot)> + '_ {
        self.slots.iter().enumerate().map(|(t, s)| (t as Time, *s))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn idle_ticks(&self) -> usize {
        self.slots.iter().filter(|s| **s == Slot::Idle).count()
    }

    pub fn busy_ticks(&self, task: TaskId) -> usize {
        self.slots.iter().filter(|s| **s == Slot::Task(task)).count()
    }

    /// Deadline misses in the order they were observed.
    pub fn deadline_misses(&self) -> &[DeadlineMiss] {
        &self.misses
    }
}

/// `|T1|T2|ID|…|`
impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "|")?;
        for slot in &self.slots {
            write!(f, "{slot}|")?;
        }
        Ok(())
    }
}

// ── Simulation ────────────────────────────────────────────────────────────────

/// One released job that still has work left.
#[derive(Debug, Clone, Copy)]
struct Job {
    deadline: Time,
    remaining: Time,
}

/// Per-task counters owned by one simulation run.
///
/// Pending jobs are kept in release order, so the head has the earliest
/// absolute deadline.
#[derive(Debug, Clone)]
struct TaskState {
    id: TaskId,
    next_release: Time,
    priority: u32,
    jobs: VecDeque<Job>,
}

/// Simulate `task_set` under `rule` for `hyperperiod` ticks.
///
/// Same as [`simulate_with_limit`] with [`DEFAULT_HYPERPERIOD_LIMIT`].
pub fn simulate(
    task_set: &TaskSet,
    rule: DispatchRule,
    hyperperiod: Time,
) -> Result<Timeline, SchedulerError> {
    simulate_with_limit(task_set, rule, hyperperiod, DEFAULT_HYPERPERIOD_LIMIT)
}

/// Simulate `task_set` under `rule` for `hyperperiod` ticks, refusing to
/// run more than `limit` ticks.
///
/// The task set is only read.  Under [`DispatchRule::FixedPriority`] every
/// task must already carry a priority.
///
/// # Errors
/// * [`SchedulerError::DegenerateHyperperiod`] if `hyperperiod > limit`.
/// * [`SchedulerError::MissingPriority`] for a fixed-priority run on a task
///   set that has not been ranked.
pub fn simulate_with_limit(
    task_set: &TaskSet,
    rule: DispatchRule,
    hyperperiod: Time,
    limit: Time,
) -> Result<Timeline, SchedulerError> {
    if hyperperiod > limit {
        warn!(hyperperiod, limit, "refusing to simulate oversized hyperperiod");
        return Err(HyperperiodError::TooLarge {
            value: hyperperiod,
            limit,
        }
        .into());
    }

    let mut states = task_set
        .iter()
        .map(|t| {
            let priority = match (rule, t.priority) {
                (DispatchRule::FixedPriority, None) => {
                    return Err(SchedulerError::MissingPriority { task: t.id() })
                }
                (_, p) => p.unwrap_or(0),
            };
            Ok(TaskState {
                id: t.id(),
                next_release: 0,
                priority,
                jobs: VecDeque::new(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut timeline = Timeline {
        slots: Vec::with_capacity(usize::try_from(hyperperiod).unwrap_or(0)),
        misses: Vec::new(),
    };
    let mut previous: Option<usize> = None;

    for t in 0..hyperperiod {
        record_misses(&states, t, &mut timeline.misses);

        for (state, task) in states.iter_mut().zip(task_set.iter()) {
            if state.next_release == t {
                state.jobs.push_back(Job {
                    deadline: t.saturating_add(task.deadline),
                    remaining: task.wcet,
                });
                state.next_release = state.next_release.saturating_add(task.period);
            }
        }

        match select(&states, rule, t, previous) {
            Some(idx) => {
                let state = &mut states[idx];
                if let Some(head) = state.jobs.front_mut() {
                    head.remaining -= 1;
                    if head.remaining == 0 {
                        state.jobs.pop_front();
                    }
                }
                timeline.slots.push(Slot::Task(state.id));
                previous = Some(idx);
            }
            None => timeline.slots.push(Slot::Idle),
        }
    }
    record_misses(&states, hyperperiod, &mut timeline.misses);

    debug!(
        ticks = timeline.len(),
        idle = timeline.idle_ticks(),
        misses = timeline.misses.len(),
        "simulation finished"
    );
    Ok(timeline)
}

fn record_misses(states: &[TaskState], t: Time, misses: &mut Vec<DeadlineMiss>) {
    for state in states {
        for job in state.jobs.iter().filter(|j| j.deadline == t) {
            warn!(task = %state.id, deadline = t, remaining = job.remaining, "deadline miss in timeline");
            misses.push(DeadlineMiss {
                task: state.id,
                deadline: t,
            });
        }
    }
}

/// Index of the task to run at tick `t`, or `None` when nothing is pending.
fn select(
    states: &[TaskState],
    rule: DispatchRule,
    t: Time,
    previous: Option<usize>,
) -> Option<usize> {
    let ready = states
        .iter()
        .enumerate()
        .filter_map(|(idx, s)| s.jobs.front().map(|head| (idx, s, head)));

    match rule {
        DispatchRule::FixedPriority => {
            let mut best: Option<(usize, u32)> = None;
            for (idx, state, _) in ready {
                if best.map_or(true, |(_, p)| state.priority > p) {
                    best = Some((idx, state.priority));
                }
            }
            best.map(|(idx, _)| idx)
        }
        DispatchRule::EarliestDeadline | DispatchRule::LeastSlack => {
            let keyed: Vec<(usize, i128)> = ready
                .map(|(idx, _, head)| (idx, dynamic_key(head, rule, t)))
                .collect();
            let min = keyed.iter().map(|&(_, k)| k).min()?;
            match previous {
                Some(prev) if keyed.iter().any(|&(idx, k)| idx == prev && k == min) => Some(prev),
                _ => keyed.iter().find(|&&(_, k)| k == min).map(|&(idx, _)| idx),
            }
        }
    }
}

/// Absolute deadline (EDF) or slack (LST) of the task's oldest pending job.
fn dynamic_key(head: &Job, rule: DispatchRule, t: Time) -> i128 {
    let deadline = i128::from(head.deadline);
    match rule {
        DispatchRule::LeastSlack => deadline - i128::from(t) - i128::from(head.remaining),
        _ => deadline,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
