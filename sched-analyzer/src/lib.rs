/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! sched-analyzer – schedulability analysis for periodic real-time task sets
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── task          – Task / TaskSet model, Policy, input errors
//! ├── timing/       – utilisation, hyperperiod, GCD / LCM helpers
//! ├── scheduler/    – Analyzer, fixed- and dynamic-priority engines,
//! │                   verdicts, blocking-time hook
//! ├── simulator     – discrete-time dispatcher over one hyperperiod
//! ├── config/       – YAML task-set files
//! ├── input         – interactive prompt session
//! └── report        – plain-text rendering of an analysis
//! ```

pub mod config;
pub mod input;
pub mod report;
pub mod scheduler;
pub mod simulator;
pub mod task;
pub mod timing;
