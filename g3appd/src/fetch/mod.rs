/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

use crate::types::Sample;

mod appd;
pub use appd::AppdMetricFetcher;

mod parse;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("authentication failed")]
    Unauthorized,
    #[error("request failed: {0:?}")]
    RequestFailed(anyhow::Error),
}

/// Metric data of one concrete metric path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricData {
    pub id: i64,
    pub name: String,
    pub path: String,
    pub frequency: String,
    pub samples: Vec<Sample>,
}

impl MetricData {
    pub fn new(path: String, samples: Vec<Sample>) -> Self {
        MetricData {
            path,
            samples,
            ..Default::default()
        }
    }
}

pub trait MetricFetcher {
    /// Fetch the data of all metric paths matching `path_query` in the last
    /// `lookback_minutes` minutes.
    fn fetch(
        &self,
        app_name: &str,
        path_query: &str,
        lookback_minutes: u64,
    ) -> impl Future<Output = Result<Vec<MetricData>, FetchError>> + Send;
}
