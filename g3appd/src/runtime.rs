/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use anyhow::Context;
use log::{debug, info};
use tokio::time::Instant;

use crate::config::ProcConfig;
use crate::export::{PointSender, SignalfxPointSender};
use crate::fetch::{AppdMetricFetcher, MetricFetcher};
use crate::schedule::PollScheduler;
use crate::sync::{SyncOrchestrator, SyncStats};

/// Run sync cycles until a quit signal is received.
pub async fn run(config: Arc<ProcConfig>) -> anyhow::Result<()> {
    let stats = Arc::new(SyncStats::default());
    if let Some(stat_config) = &config.stat {
        let _detached_thread = crate::stat::spawn_working_thread(stat_config.clone(), stats.clone())
            .context("failed to start stat thread")?;
    }

    let fetcher = AppdMetricFetcher::new(config.controller.clone());
    let sender =
        SignalfxPointSender::new(config.signalfx.clone()).context("invalid signalfx config")?;
    let sync = SyncOrchestrator::new(fetcher, sender, stats);
    let scheduler = PollScheduler::new(config.interval_minutes());

    run_loop(&config, sync, scheduler, crate::signal::wait_quit()).await
}

async fn run_loop<F, S, Q>(
    config: &ProcConfig,
    mut sync: SyncOrchestrator<F, S>,
    mut scheduler: PollScheduler,
    quit: Q,
) -> anyhow::Result<()>
where
    F: MetricFetcher,
    S: PointSender,
    Q: Future<Output = anyhow::Result<()>>,
{
    tokio::pin!(quit);

    loop {
        let cycle = scheduler.begin_cycle(Instant::now());
        let outcome = sync
            .run_cycle(config.apps(), cycle.lookback_minutes())
            .await;
        debug!("sync cycle done: {outcome:?}");

        let left = scheduler.finish_cycle(&cycle, Instant::now());
        tokio::select! {
            biased;

            r = &mut quit => {
                r?;
                let stats = sync.stats();
                info!(
                    "quit signal received, stop sync after {} data points reported",
                    stats.get_data_points_reported()
                );
                return Ok(());
            }
            _ = tokio::time::sleep(left) => {}
        }
    }
}
