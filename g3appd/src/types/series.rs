/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::hash::{BuildHasher, Hasher};
use std::sync::Arc;

use foldhash::fast::FixedState;

use super::{DataPoint, DimensionMap, Sample};

const SERIES_HASH_SEED: u64 = 0x6733_6170_7064;

/// Identity of one metric time series after path mapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedSeries {
    pub metric_name: String,
    pub dimensions: DimensionMap,
}

impl ResolvedSeries {
    pub fn new(metric_name: String, dimensions: DimensionMap) -> Self {
        ResolvedSeries {
            metric_name,
            dimensions,
        }
    }

    /// Hash of the canonical encoding of this series, stable for the life of
    /// the process and independent of dimension insertion order.
    pub fn canonical_hash(&self) -> u64 {
        let mut hasher = FixedState::with_seed(SERIES_HASH_SEED).build_hasher();
        hasher.write_usize(self.metric_name.len());
        hasher.write(self.metric_name.as_bytes());
        self.dimensions.write_canonical(&mut hasher);
        hasher.finish()
    }

    pub fn to_data_points(&self, samples: &[Sample]) -> Vec<DataPoint> {
        let metric: Arc<str> = Arc::from(self.metric_name.as_str());
        let dimensions = Arc::new(self.dimensions.clone());
        samples
            .iter()
            .map(|s| DataPoint {
                metric: metric.clone(),
                dimensions: dimensions.clone(),
                timestamp_millis: s.timestamp_millis,
                value: s.value,
            })
            .collect()
    }
}

impl fmt::Display for ResolvedSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{{}}}", self.metric_name, self.dimensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_ignores_insert_order() {
        let mut d1 = DimensionMap::new();
        d1.insert("a", "1");
        d1.insert("b", "2");
        let mut d2 = DimensionMap::new();
        d2.insert("b", "2");
        d2.insert("a", "1");

        let s1 = ResolvedSeries::new("cpu".to_string(), d1);
        let s2 = ResolvedSeries::new("cpu".to_string(), d2);
        assert_eq!(s1, s2);
        assert_eq!(s1.canonical_hash(), s2.canonical_hash());
    }

    #[test]
    fn hash_separates_fields() {
        let mut d1 = DimensionMap::new();
        d1.insert("ab", "c");
        let mut d2 = DimensionMap::new();
        d2.insert("a", "bc");

        let s1 = ResolvedSeries::new("m".to_string(), d1);
        let s2 = ResolvedSeries::new("m".to_string(), d2);
        assert_ne!(s1.canonical_hash(), s2.canonical_hash());
    }

    #[test]
    fn data_points() {
        let mut dims = DimensionMap::new();
        dims.insert("host", "h1");
        let series = ResolvedSeries::new("calls".to_string(), dims);
        let points = series.to_data_points(&[Sample::new(1000, 5), Sample::new(2000, 7)]);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].metric.as_ref(), "calls");
        assert_eq!(points[0].dimensions.get("host"), Some("h1"));
        assert_eq!(points[1].timestamp_millis, 2000);
        assert_eq!(points[1].value, 7);
    }
}
