/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Extension point for the resource-sharing protocols (PIP, OCPP, ICPP).
//!
//! These policies are recognised by [`Policy`](crate::task::Policy) but not
//! analysed: the analyzer answers them with
//! [`Analysis::NotImplemented`](super::Analysis::NotImplemented).
//!
//! A protocol implementation plugs into response-time analysis through
//! [`BlockingBound`], which adds a per-task blocking term `B_i`:
//!
//! ```text
//! R_{k+1} = C_i + B_i + Σ_{j ≠ i, D_j ≤ D_i} ⌈R_k / T_j⌉ · C_j
//! ```
//!
//! Deriving `B_i` needs per-task critical-section lengths and resource ids,
//! which the current task model does not carry.

use crate::task::{Task, Time};

/// Upper bound on the time a task can be blocked by lower-priority tasks
/// holding a shared resource.
pub trait BlockingBound {
    fn blocking_time(&self, task: &Task) -> Time;
}

/// Independent tasks: no blocking.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBlocking;

impl BlockingBound for NoBlocking {
    fn blocking_time(&self, _task: &Task) -> Time {
        0
    }
}

impl<F> BlockingBound for F
where
    F: Fn(&Task) -> Time,
{
    fn blocking_time(&self, task: &Task) -> Time {
        self(task)
    }
}
