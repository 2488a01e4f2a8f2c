/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

pub mod build;
pub mod config;
pub mod dedup;
pub mod export;
pub mod fetch;
pub mod log;
pub mod mapping;
pub mod opts;
pub mod runtime;
pub mod schedule;
pub mod signal;
pub mod stat;
pub mod sync;
pub mod types;
