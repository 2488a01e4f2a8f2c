/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use super::DimensionMap;

/// One measurement of a metric as returned by the controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sample {
    pub timestamp_millis: i64,
    pub value: i64,
    pub count: Option<i64>,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub sum: Option<i64>,
    pub current: Option<i64>,
}

impl Sample {
    pub fn new(timestamp_millis: i64, value: i64) -> Self {
        Sample {
            timestamp_millis,
            value,
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataPoint {
    pub metric: Arc<str>,
    pub dimensions: Arc<DimensionMap>,
    pub timestamp_millis: i64,
    pub value: i64,
}
