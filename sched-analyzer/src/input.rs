/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Interactive prompt session.
//!
//! Asks for the policy menu code, the number of tasks and then
//! `WCET period deadline` (plus a priority for PIP/OCPP/ICPP) per task.
//! Values are whitespace-separated tokens and may span lines.  Generic over
//! [`BufRead`] / [`Write`] so tests can drive it with in-memory buffers.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tracing::debug;

use crate::task::{InputError, Policy, TaskParams};

/// What the user entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptedInput {
    pub policy: Policy,
    pub tasks: Vec<TaskParams>,
}

/// Whitespace-separated token reader over a line-oriented source.
struct Tokens<R> {
    reader: R,
    pending: Vec<String>,
}

impl<R: BufRead> Tokens<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::new(),
        }
    }

    fn next_i64(&mut self, what: &str) -> Result<i64> {
        while self.pending.is_empty() {
            let mut line = String::new();
            let n = self
                .reader
                .read_line(&mut line)
                .context("Failed to read from input")?;
            if n == 0 {
                return Err(InputError::UnexpectedEof {
                    what: what.to_string(),
                }
                .into());
            }
            // reversed so that pop() yields tokens in order
            self.pending = line.split_whitespace().rev().map(str::to_string).collect();
        }
        let token = self.pending.pop().unwrap_or_default();
        token.parse::<i64>().map_err(|_| {
            InputError::Malformed {
                what: what.to_string(),
                value: token,
            }
            .into()
        })
    }
}

/// Run the prompt dialogue on `input`, writing prompts to `output`.
///
/// With a `preset` policy the algorithm menu is skipped and only the tasks
/// are asked for.
///
/// # Errors
/// An [`InputError`] (retrievable with `downcast_ref`) for an invalid choice,
/// a non-positive task count, a malformed value or premature end of input;
/// an I/O error if reading or writing fails.
pub fn prompt_task_set<R: BufRead, W: Write>(
    input: R,
    mut output: W,
    preset: Option<Policy>,
) -> Result<PromptedInput> {
    let mut tokens = Tokens::new(input);

    let policy = match preset {
        Some(policy) => {
            debug!(%policy, "policy preset, menu skipped");
            policy
        }
        None => {
            writeln!(output, "Choose a scheduling algorithm:")?;
            for policy in Policy::ALL {
                writeln!(output, "{}. {}", policy.code(), policy.label())?;
            }
            write!(output, "Enter your choice (1-7): ")?;
            output.flush()?;
            Policy::from_code(tokens.next_i64("policy choice")?)?
        }
    };

    write!(output, "Enter the number of tasks: ")?;
    output.flush()?;
    let count = tokens.next_i64("number of tasks")?;
    if count <= 0 {
        return Err(InputError::NoTasks.into());
    }

    let mut tasks = Vec::new();
    for id in 1..=count {
        let params = if policy.takes_priority_seed() {
            write!(output, "Enter WCET, period, deadline, priority for Task {id}: ")?;
            output.flush()?;
            let mut p = read_timing(&mut tokens)?;
            p.priority = Some(tokens.next_i64("priority")?);
            p
        } else {
            write!(output, "Enter WCET, period, deadline for Task {id}: ")?;
            output.flush()?;
            read_timing(&mut tokens)?
        };
        debug!(task = id, ?params, "task entered");
        tasks.push(params);
    }

    Ok(PromptedInput { policy, tasks })
}

fn read_timing<R: BufRead>(tokens: &mut Tokens<R>) -> Result<TaskParams> {
    let wcet = tokens.next_i64("WCET")?;
    let period = tokens.next_i64("period")?;
    let deadline = tokens.next_i64("deadline")?;
    Ok(TaskParams::new(wcet, period, deadline))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(stdin: &str) -> (Result<PromptedInput>, String) {
        let mut out = Vec::new();
        let result = prompt_task_set(Cursor::new(stdin.as_bytes()), &mut out, None);
        (result, String::from_utf8(out).unwrap())
    }

    fn input_error(result: Result<PromptedInput>) -> InputError {
        result
            .unwrap_err()
            .downcast_ref::<InputError>()
            .cloned()
            .expect("expected an InputError")
    }

    #[test]
    fn reads_rate_monotonic_session() {
        let (result, prompts) = run("1\n3\n1 4 4\n2 6 6\n3 20 20\n");
        let input = result.unwrap();

        assert_eq!(input.policy, Policy::Rm);
        assert_eq!(
            input.tasks,
            vec![
                TaskParams::new(1, 4, 4),
                TaskParams::new(2, 6, 6),
                TaskParams::new(3, 20, 20)
            ]
        );
        assert!(prompts.contains("1. Rate-Monotonic (RM)"));
        assert!(prompts.contains("7. Immediate Ceiling Priority Protocol (ICPP)"));
        assert!(prompts.contains("Enter WCET, period, deadline for Task 3: "));
    }

    #[test]
    fn values_may_span_lines() {
        let (result, _) = run("3 2\n1\n2\n2 2\n4 4");
        let input = result.unwrap();
        assert_eq!(input.policy, Policy::Edf);
        assert_eq!(input.tasks[1], TaskParams::new(2, 4, 4));
    }

    #[test]
    fn resource_sharing_policy_asks_for_priority() {
        let (result, prompts) = run("5\n1\n1 4 4 7\n");
        let input = result.unwrap();
        assert_eq!(input.policy, Policy::Pip);
        assert_eq!(input.tasks[0].priority, Some(7));
        assert!(prompts.contains("Enter WCET, period, deadline, priority for Task 1: "));
    }

    #[test]
    fn preset_policy_skips_the_menu() {
        let mut out = Vec::new();
        let input = prompt_task_set(Cursor::new(&b"1\n1 4 4\n"[..]), &mut out, Some(Policy::Edf))
            .unwrap();
        let prompts = String::from_utf8(out).unwrap();

        assert_eq!(input.policy, Policy::Edf);
        assert_eq!(input.tasks, vec![TaskParams::new(1, 4, 4)]);
        assert!(!prompts.contains("Choose a scheduling algorithm"));
        assert!(prompts.starts_with("Enter the number of tasks: "));
    }

    #[test]
    fn preset_resource_sharing_policy_still_asks_for_priority() {
        let mut out = Vec::new();
        let input = prompt_task_set(Cursor::new(&b"1\n1 4 4 3\n"[..]), &mut out, Some(Policy::Icpp))
            .unwrap();
        assert_eq!(input.policy, Policy::Icpp);
        assert_eq!(input.tasks[0].priority, Some(3));
    }

    #[test]
    fn invalid_choice_is_rejected() {
        let (result, _) = run("8\n");
        assert_eq!(input_error(result), InputError::UnknownPolicy("8".into()));
    }

    #[test]
    fn non_positive_task_count_is_rejected() {
        let (result, _) = run("1\n0\n");
        assert_eq!(input_error(result), InputError::NoTasks);
    }

    #[test]
    fn non_numeric_value_is_malformed() {
        let (result, _) = run("1\n1\n1 x 4\n");
        assert!(matches!(input_error(result), InputError::Malformed { value, .. } if value == "x"));
    }

    #[test]
    fn premature_end_of_input() {
        let (result, _) = run("2\n2\n1 4 4\n");
        assert!(matches!(input_error(result), InputError::UnexpectedEof { .. }));
    }
}
