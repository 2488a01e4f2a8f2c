/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use log::{debug, error, warn};

use crate::config::AppSyncConfig;
use crate::dedup::SeriesDedupFilter;
use crate::export::PointSender;
use crate::fetch::{FetchError, MetricFetcher};
use crate::types::DataPoint;

mod stats;
pub use stats::SyncStats;

/// Counters of a single sync cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleOutcome {
    pub request_failures: u64,
    pub series_reported: u64,
    pub series_empty: u64,
    pub data_points_reported: u64,
    /// The cycle stopped early on an authentication failure.
    pub aborted: bool,
}

pub struct SyncOrchestrator<F, S> {
    fetcher: F,
    sender: S,
    dedup: SeriesDedupFilter,
    stats: Arc<SyncStats>,
}

impl<F: MetricFetcher, S: PointSender> SyncOrchestrator<F, S> {
    pub fn new(fetcher: F, sender: S, stats: Arc<SyncStats>) -> Self {
        SyncOrchestrator {
            fetcher,
            sender,
            dedup: SeriesDedupFilter::new(),
            stats,
        }
    }

    #[inline]
    pub fn stats(&self) -> &Arc<SyncStats> {
        &self.stats
    }

    #[inline]
    pub fn dedup(&self) -> &SeriesDedupFilter {
        &self.dedup
    }

    /// Fetch every configured rule, and send all new data points in one batch.
    pub async fn run_cycle(
        &mut self,
        apps: &[AppSyncConfig],
        lookback_minutes: u64,
    ) -> CycleOutcome {
        let mut outcome = CycleOutcome::default();
        let mut batch: Vec<DataPoint> = Vec::new();

        'apps: for app in apps {
            for rule in app.rules() {
                let all_data = match self
                    .fetcher
                    .fetch(app.name(), rule.path_query(), lookback_minutes)
                    .await
                {
                    Ok(data) => data,
                    Err(FetchError::Unauthorized) => {
                        error!("AppDynamics authentication failed, abort this sync cycle");
                        outcome.aborted = true;
                        break 'apps;
                    }
                    Err(FetchError::RequestFailed(e)) => {
                        error!(
                            "failed to fetch metric data of {} from app {}: {e:?}",
                            rule.path_query(),
                            app.name()
                        );
                        outcome.request_failures += 1;
                        continue;
                    }
                };

                if all_data.is_empty() {
                    warn!(
                        "no metric found for query {} in app {}",
                        rule.path_query(),
                        app.name()
                    );
                    continue;
                }

                for data in all_data {
                    let series = rule.resolve(&data.path);
                    let samples = self.dedup.filter_and_advance(&series, data.samples);
                    if samples.is_empty() {
                        outcome.series_empty += 1;
                    } else {
                        batch.extend(series.to_data_points(&samples));
                        outcome.series_reported += 1;
                    }
                }
            }
        }

        if !batch.is_empty() {
            let count = batch.len() as u64;
            match self.sender.send(batch).await {
                Ok(_) => {
                    debug!("sent {count} data points");
                    outcome.data_points_reported = count;
                }
                Err(e) => error!("failed to send {count} data points: {e}"),
            }
        }

        self.stats.add_request_failures(outcome.request_failures);
        self.stats.add_series_reported(outcome.series_reported);
        self.stats.add_series_empty(outcome.series_empty);
        self.stats.add_data_points_reported(outcome.data_points_reported);
        outcome
    }
}
