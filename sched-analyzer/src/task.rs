/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core task data structures for the schedulability analyzer.
//!
//! Two distinct types model the two sides of the input boundary:
//!
//! ```text
//! CLI / YAML / prompt  ──►  TaskParams  ──(TaskSet::from_params)──►  TaskSet  ──►  engines
//!                            ↑ raw, signed                             ↑ validated, u64 ticks
//! ```
//!
//! # Ownership model
//! A `TaskSet` is **owned** by the [`Analyzer`](crate::scheduler::Analyzer)
//! for the duration of one run.  The only field ever written after
//! construction is [`Task::priority`], filled by the fixed-priority engine
//! before the simulator reads it.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Discrete time unit used by every analysis.  One tick is one simulated
/// time unit of the timeline.
pub type Time = u64;

// ── Task identity ─────────────────────────────────────────────────────────────

/// Stable, 1-based task identifier assigned in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u32);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── Input errors ──────────────────────────────────────────────────────────────

/// Everything that can be wrong with the input before analysis starts.
///
/// Raised at the input boundary (CLI, YAML file, interactive prompt) and by
/// [`TaskSet::from_params`], which re-validates every field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Policy name or menu code not in `{RM, DM, EDF, LST, PIP, OCPP, ICPP}` / `1..=7`.
    #[error("invalid policy selection '{0}' (valid: rm, dm, edf, lst, pip, ocpp, icpp or 1-7)")]
    UnknownPolicy(String),

    /// Task count was zero or negative, or the task list is empty.
    #[error("no tasks provided: the task count must be positive")]
    NoTasks,

    /// A timing field was zero or negative.
    #[error("task {task}: {field} must be positive, got {value}")]
    NonPositiveField {
        task: TaskId,
        field: &'static str,
        value: i64,
    },

    /// The task cannot finish by its own deadline even when running alone.
    #[error("task {task}: WCET {wcet} exceeds deadline {deadline}")]
    WcetExceedsDeadline { task: TaskId, wcet: Time, deadline: Time },

    /// A token could not be parsed as the expected value.
    #[error("cannot parse {what} from '{value}'")]
    Malformed { what: String, value: String },

    /// Input ended before the expected value was read.
    #[error("unexpected end of input while reading {what}")]
    UnexpectedEof { what: String },
}

// ── Policy ────────────────────────────────────────────────────────────────────

/// Scheduling policy selected once per run.
///
/// Decoded once at the input boundary from a name or from the numeric menu
/// code of the interactive session (`1` = RM … `7` = ICPP).  Engines never see
/// raw integers; they match on [`Policy::class`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Rate-Monotonic.
    Rm,
    /// Deadline-Monotonic.
    Dm,
    /// Earliest-Deadline-First.
    Edf,
    /// Least-Slack-Time.
    Lst,
    /// Priority Inheritance Protocol.
    Pip,
    /// Original Ceiling Priority Protocol.
    Ocpp,
    /// Immediate Ceiling Priority Protocol.
    Icpp,
}

/// Key used to rank tasks under a fixed-priority policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingKey {
    /// Rate-Monotonic: shorter period ⇒ higher priority.
    Period,
    /// Deadline-Monotonic: shorter relative deadline ⇒ higher priority.
    Deadline,
}

impl RankingKey {
    /// The ranking value of `task` under this key.
    pub fn of(self, task: &Task) -> Time {
        match self {
            RankingKey::Period => task.period,
            RankingKey::Deadline => task.deadline,
        }
    }
}

impl fmt::Display for RankingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankingKey::Period => write!(f, "period"),
            RankingKey::Deadline => write!(f, "deadline"),
        }
    }
}

/// Job-level rule used by the dynamic-priority policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicRule {
    EarliestDeadline,
    LeastSlack,
}

/// Resource-sharing protocols that are recognised but not analysed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceProtocol {
    PriorityInheritance,
    OriginalCeiling,
    ImmediateCeiling,
}

impl fmt::Display for ResourceProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceProtocol::PriorityInheritance => "Priority Inheritance Protocol (PIP)",
            ResourceProtocol::OriginalCeiling => "Original Ceiling Priority Protocol (OCPP)",
            ResourceProtocol::ImmediateCeiling => "Immediate Ceiling Priority Protocol (ICPP)",
        };
        f.write_str(name)
    }
}

/// The branch of the analysis a [`Policy`] selects, carrying only the data
/// that branch needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyClass {
    FixedPriority(RankingKey),
    DynamicPriority(DynamicRule),
    ResourceSharing(ResourceProtocol),
}

impl Policy {
    /// All policies, in menu order.
    pub const ALL: [Policy; 7] = [
        Policy::Rm,
        Policy::Dm,
        Policy::Edf,
        Policy::Lst,
        Policy::Pip,
        Policy::Ocpp,
        Policy::Icpp,
    ];

    /// Decode the numeric menu code used by the interactive session.
    pub fn from_code(code: i64) -> Result<Self, InputError> {
        match code {
            1..=7 => Ok(Self::ALL[(code - 1) as usize]),
            other => Err(InputError::UnknownPolicy(other.to_string())),
        }
    }

    /// Menu code of this policy (`1..=7`).
    pub fn code(self) -> u8 {
        match self {
            Policy::Rm => 1,
            Policy::Dm => 2,
            Policy::Edf => 3,
            Policy::Lst => 4,
            Policy::Pip => 5,
            Policy::Ocpp => 6,
            Policy::Icpp => 7,
        }
    }

    /// Which engine handles this policy.
    pub fn class(self) -> PolicyClass {
        match self {
            Policy::Rm => PolicyClass::FixedPriority(RankingKey::Period),
            Policy::Dm => PolicyClass::FixedPriority(RankingKey::Deadline),
            Policy::Edf => PolicyClass::DynamicPriority(DynamicRule::EarliestDeadline),
            Policy::Lst => PolicyClass::DynamicPriority(DynamicRule::LeastSlack),
            Policy::Pip => PolicyClass::ResourceSharing(ResourceProtocol::PriorityInheritance),
            Policy::Ocpp => PolicyClass::ResourceSharing(ResourceProtocol::OriginalCeiling),
            Policy::Icpp => PolicyClass::ResourceSharing(ResourceProtocol::ImmediateCeiling),
        }
    }

    /// `true` for PIP/OCPP/ICPP, whose input carries a priority seed.
    pub fn takes_priority_seed(self) -> bool {
        matches!(self.class(), PolicyClass::ResourceSharing(_))
    }

    /// Human-readable menu label.
    pub fn label(self) -> &'static str {
        match self {
            Policy::Rm => "Rate-Monotonic (RM)",
            Policy::Dm => "Deadline-Monotonic (DM)",
            Policy::Edf => "Earliest Deadline First (EDF)",
            Policy::Lst => "Least Slack Time (LST)",
            Policy::Pip => "Priority Inheritance Protocol (PIP)",
            Policy::Ocpp => "Original Ceiling Priority Protocol (OCPP)",
            Policy::Icpp => "Immediate Ceiling Priority Protocol (ICPP)",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = match self {
            Policy::Rm => "RM",
            Policy::Dm => "DM",
            Policy::Edf => "EDF",
            Policy::Lst => "LST",
            Policy::Pip => "PIP",
            Policy::Ocpp => "OCPP",
            Policy::Icpp => "ICPP",
        };
        f.write_str(short)
    }
}

impl FromStr for Policy {
    type Err = InputError;

    /// Accepts a case-insensitive short name or a menu code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<i64>() {
            return Self::from_code(code);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "rm" => Ok(Policy::Rm),
            "dm" => Ok(Policy::Dm),
            "edf" => Ok(Policy::Edf),
            "lst" | "llf" => Ok(Policy::Lst),
            "pip" => Ok(Policy::Pip),
            "ocpp" => Ok(Policy::Ocpp),
            "icpp" => Ok(Policy::Icpp),
            _ => Err(InputError::UnknownPolicy(trimmed.to_string())),
        }
    }
}

// ── TaskParams (raw input) ────────────────────────────────────────────────────

/// Unvalidated per-task input as read from the CLI, a YAML file or the
/// interactive prompt.
///
/// Signed on purpose: a negative value must reach validation and be reported
/// as [`InputError::NonPositiveField`] instead of failing to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskParams {
    pub wcet: i64,
    pub period: i64,
    pub deadline: i64,
    /// Priority seed; only meaningful for the resource-sharing policies.
    pub priority: Option<i64>,
}

impl TaskParams {
    pub fn new(wcet: i64, period: i64, deadline: i64) -> Self {
        Self {
            wcet,
            period,
            deadline,
            priority: None,
        }
    }
}

impl FromStr for TaskParams {
    type Err = InputError;

    /// Parse `WCET,PERIOD,DEADLINE[,PRIORITY]` (commas or whitespace).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .collect();

        if !(3..=4).contains(&fields.len()) {
            return Err(InputError::Malformed {
                what: "task (expected WCET,PERIOD,DEADLINE[,PRIORITY])".into(),
                value: s.to_string(),
            });
        }

        let parse = |what: &str, raw: &str| {
            raw.parse::<i64>().map_err(|_| InputError::Malformed {
                what: what.to_string(),
                value: raw.to_string(),
            })
        };

        Ok(Self {
            wcet: parse("WCET", fields[0])?,
            period: parse("period", fields[1])?,
            deadline: parse("deadline", fields[2])?,
            priority: fields.get(3).map(|p| parse("priority", p)).transpose()?,
        })
    }
}

// ── Task (validated) ──────────────────────────────────────────────────────────

/// One validated periodic task.
///
/// All timing fields are positive and `wcet ≤ deadline` holds; the only way
/// to obtain a `Task` is through [`Task::new`] or [`TaskSet::from_params`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    /// Release interval (T).
    pub period: Time,
    /// Worst-case execution time per activation (C).
    pub wcet: Time,
    /// Relative deadline (D); may be shorter or longer than the period.
    pub deadline: Time,
    /// Fixed priority level (larger = more urgent).  `None` until assigned
    /// by the fixed-priority engine, or seeded by the input for PIP/OCPP/ICPP.
    pub priority: Option<u32>,
}

impl Task {
    /// Validate raw parameters into a task with identifier `id`.
    pub fn new(id: TaskId, params: TaskParams) -> Result<Self, InputError> {
        let positive = |field: &'static str, value: i64| -> Result<Time, InputError> {
            if value > 0 {
                Ok(value as Time)
            } else {
                Err(InputError::NonPositiveField {
                    task: id,
                    field,
                    value,
                })
            }
        };

        let wcet = positive("WCET", params.wcet)?;
        let period = positive("period", params.period)?;
        let deadline = positive("deadline", params.deadline)?;

        if wcet > deadline {
            return Err(InputError::WcetExceedsDeadline { task: id, wcet, deadline });
        }

        let priority = match params.priority {
            None => None,
            Some(p) if p > 0 && p <= u32::MAX as i64 => Some(p as u32),
            Some(p) => {
                return Err(InputError::NonPositiveField {
                    task: id,
                    field: "priority",
                    value: p,
                })
            }
        };

        Ok(Self {
            id,
            period,
            wcet,
            deadline,
            priority,
        })
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Deadline-based utilisation `C / D` of this task.
    pub fn utilization(&self) -> f64 {
        self.wcet as f64 / self.deadline as f64
    }

    /// Classical utilisation `C / T`.
    pub fn period_utilization(&self) -> f64 {
        self.wcet as f64 / self.period as f64
    }

    /// `true` when the relative deadline equals the period.
    pub fn has_implicit_deadline(&self) -> bool {
        self.deadline == self.period
    }
}

// ── TaskSet ───────────────────────────────────────────────────────────────────

/// Ordered, validated collection of tasks (declaration order).
///
/// Uniqueness is by [`TaskId`]; two tasks may share every timing attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskSet {
    tasks: Vec<Task>,
}

impl TaskSet {
    /// Validate `params` and assign ids `1..=n` in order.
    ///
    /// # Errors
    /// * [`InputError::NoTasks`] – `params` is empty.
    /// * [`InputError::NonPositiveField`] / [`InputError::WcetExceedsDeadline`]
    ///   – the first offending task.
    pub fn from_params<I>(params: I) -> Result<Self, InputError>
    where
        I: IntoIterator<Item = TaskParams>,
    {
        let tasks = params
            .into_iter()
            .enumerate()
            .map(|(i, p)| Task::new(TaskId(i as u32 + 1), p))
            .collect::<Result<Vec<_>, _>>()?;

        if tasks.is_empty() {
            return Err(InputError::NoTasks);
        }
        Ok(Self { tasks })
    }

    /// An empty set.  Only the timing helpers accept it (hyperperiod `1`,
    /// utilisation `0`); the analyzer rejects it.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Mutable access is crate-private: only the priority assignment writes.
    pub(crate) fn tasks_mut(&mut self) -> &mut [Task] {
        &mut self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// `true` if every task has `deadline == period`.
    pub fn all_implicit_deadlines(&self) -> bool {
        self.tasks.iter().all(Task::has_implicit_deadline)
    }
}

impl<'a> IntoIterator for &'a TaskSet {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Policy ────────────────────────────────────────────────────────────────

    #[test]
    fn policy_codes_round_trip_through_menu_order() {
        for (i, p) in Policy::ALL.iter().enumerate() {
            assert_eq!(p.code() as usize, i + 1);
            assert_eq!(Policy::from_code(i as i64 + 1).unwrap(), *p);
        }
    }

    #[test]
    fn policy_code_out_of_range_is_rejected() {
        assert!(matches!(Policy::from_code(0), Err(InputError::UnknownPolicy(_))));
        assert!(matches!(Policy::from_code(8), Err(InputError::UnknownPolicy(_))));
        assert!(matches!(Policy::from_code(-1), Err(InputError::UnknownPolicy(_))));
    }

    #[test]
    fn policy_parses_names_case_insensitively() {
        assert_eq!("rm".parse::<Policy>().unwrap(), Policy::Rm);
        assert_eq!("EDF".parse::<Policy>().unwrap(), Policy::Edf);
        assert_eq!(" Lst ".parse::<Policy>().unwrap(), Policy::Lst);
        assert_eq!("3".parse::<Policy>().unwrap(), Policy::Edf);
        assert!("fifo".parse::<Policy>().is_err());
    }

    #[test]
    fn policy_class_carries_branch_data() {
        assert_eq!(Policy::Rm.class(), PolicyClass::FixedPriority(RankingKey::Period));
        assert_eq!(Policy::Dm.class(), PolicyClass::FixedPriority(RankingKey::Deadline));
        assert_eq!(
            Policy::Lst.class(),
            PolicyClass::DynamicPriority(DynamicRule::LeastSlack)
        );
        assert!(Policy::Icpp.takes_priority_seed());
        assert!(!Policy::Edf.takes_priority_seed());
    }

    // ── TaskParams ────────────────────────────────────────────────────────────

    #[test]
    fn task_params_parse_commas_and_spaces() {
        let p: TaskParams = "2,10,8".parse().unwrap();
        assert_eq!(p, TaskParams::new(2, 10, 8));

        let q: TaskParams = "3 20 7 4".parse().unwrap();
        assert_eq!(q.priority, Some(4));
    }

    #[test]
    fn task_params_reject_wrong_arity_and_garbage() {
        assert!(matches!(
            "1,2".parse::<TaskParams>(),
            Err(InputError::Malformed { .. })
        ));
        assert!(matches!(
            "1,x,3".parse::<TaskParams>(),
            Err(InputError::Malformed { .. })
        ));
    }

    // ── Validation ────────────────────────────────────────────────────────────

    #[test]
    fn task_set_assigns_ids_in_declaration_order() {
        let set = TaskSet::from_params(vec![
            TaskParams::new(1, 4, 4),
            TaskParams::new(2, 6, 6),
        ])
        .unwrap();
        let ids: Vec<_> = set.iter().map(Task::id).collect();
        assert_eq!(ids, vec![TaskId(1), TaskId(2)]);
        assert!(set.iter().all(|t| t.priority.is_none()));
    }

    #[test]
    fn empty_task_list_is_rejected() {
        assert_eq!(TaskSet::from_params(Vec::<TaskParams>::new()), Err(InputError::NoTasks));
    }

    #[test]
    fn non_positive_fields_are_rejected() {
        let err = TaskSet::from_params(vec![
            TaskParams::new(1, 4, 4),
            TaskParams::new(1, 0, 4),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            InputError::NonPositiveField {
                task: TaskId(2),
                field: "period",
                value: 0
            }
        );

        let err = TaskSet::from_params(vec![TaskParams::new(-1, 4, 4)]).unwrap_err();
        assert!(matches!(err, InputError::NonPositiveField { field: "WCET", .. }));
    }

    #[test]
    fn wcet_above_deadline_is_rejected() {
        let err = TaskSet::from_params(vec![TaskParams::new(5, 10, 4)]).unwrap_err();
        assert_eq!(
            err,
            InputError::WcetExceedsDeadline {
                task: TaskId(1),
                wcet: 5,
                deadline: 4
            }
        );
    }

    #[test]
    fn wcet_equal_to_deadline_is_accepted() {
        assert!(TaskSet::from_params(vec![TaskParams::new(4, 10, 4)]).is_ok());
    }

    #[test]
    fn priority_seed_is_kept_and_validated() {
        let mut p = TaskParams::new(1, 4, 4);
        p.priority = Some(3);
        let set = TaskSet::from_params(vec![p]).unwrap();
        assert_eq!(set.tasks()[0].priority, Some(3));

        p.priority = Some(0);
        assert!(matches!(
            TaskSet::from_params(vec![p]),
            Err(InputError::NonPositiveField { field: "priority", .. })
        ));
    }

    #[test]
    fn arbitrary_deadlines_are_allowed() {
        let set = TaskSet::from_params(vec![
            TaskParams::new(13, 60, 45),
            TaskParams::new(2, 5, 8),
        ])
        .unwrap();
        assert!(!set.all_implicit_deadlines());
        assert_eq!(set.get(TaskId(2)).unwrap().deadline, 8);
    }
}
