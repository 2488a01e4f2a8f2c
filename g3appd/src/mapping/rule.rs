/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use super::{
    ConfigError, DEFAULT_METRIC_SOURCE, DIMENSION_SKIP, METRIC_SOURCE_KEY, PATH_DELIMITER,
    PATH_WILDCARD,
};
use crate::types::{DimensionMap, ResolvedSeries};

#[derive(Clone, Debug, PartialEq, Eq)]
enum DimensionSlot {
    Skip,
    Name(String),
}

/// Compiled mapping rule for one configured metric path query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetricPathRule {
    path_query: String,
    dimension_template: String,
    slots: Vec<DimensionSlot>,
    static_dimensions: DimensionMap,
    has_wildcard: bool,
    metric_name: Option<String>,
    metric_source: Arc<str>,
}

impl MetricPathRule {
    pub fn compile(
        path_query: &str,
        dimension_template: &str,
        static_dimensions: DimensionMap,
    ) -> Result<Self, ConfigError> {
        if path_query.is_empty() {
            return Err(ConfigError::EmptyPathQuery);
        }

        let path_segments = path_query.split(PATH_DELIMITER).count();
        // an empty template is allowed for single segment paths
        let mut slots: Vec<DimensionSlot> = Vec::new();
        if !dimension_template.is_empty() {
            for (position, s) in dimension_template.split(PATH_DELIMITER).enumerate() {
                let slot = match s {
                    "" => {
                        return Err(ConfigError::EmptyDimensionName {
                            dimension_template: dimension_template.to_string(),
                            position,
                        });
                    }
                    DIMENSION_SKIP => DimensionSlot::Skip,
                    _ => DimensionSlot::Name(s.to_string()),
                };
                slots.push(slot);
            }
        }
        if path_segments != slots.len() + 1 {
            return Err(ConfigError::SegmentCountMismatch {
                path_query: path_query.to_string(),
                dimension_template: dimension_template.to_string(),
                path_segments,
                template_segments: slots.len(),
            });
        }

        let has_wildcard = path_query
            .split(PATH_DELIMITER)
            .any(|s| s == PATH_WILDCARD);

        Ok(MetricPathRule {
            path_query: path_query.to_string(),
            dimension_template: dimension_template.to_string(),
            slots,
            static_dimensions,
            has_wildcard,
            metric_name: None,
            metric_source: Arc::from(DEFAULT_METRIC_SOURCE),
        })
    }

    pub fn set_metric_name(&mut self, name: String) {
        self.metric_name = Some(name);
    }

    pub fn set_metric_source(&mut self, source: Arc<str>) {
        self.metric_source = source;
    }

    #[inline]
    pub fn path_query(&self) -> &str {
        &self.path_query
    }

    #[inline]
    pub fn dimension_template(&self) -> &str {
        &self.dimension_template
    }

    #[inline]
    pub fn has_wildcard(&self) -> bool {
        self.has_wildcard
    }

    #[inline]
    pub fn metric_name(&self) -> Option<&str> {
        self.metric_name.as_deref()
    }

    /// The override name is only usable when the query selects exactly one path.
    pub fn effective_metric_name(&self) -> Option<&str> {
        if self.has_wildcard {
            None
        } else {
            self.metric_name.as_deref()
        }
    }

    /// Map the actual metric path to a new series identity.
    ///
    /// Path derived dimensions take precedence over static ones, and the
    /// metric source dimension is always set last.
    pub fn resolve(&self, actual_path: &str) -> ResolvedSeries {
        let segments: Vec<&str> = actual_path.split(PATH_DELIMITER).collect();

        let mut dimensions = self.static_dimensions.clone();
        for (slot, segment) in self.slots.iter().zip(segments.iter()) {
            if let DimensionSlot::Name(name) = slot {
                dimensions.insert(name.as_str(), *segment);
            }
        }
        dimensions.insert(METRIC_SOURCE_KEY, self.metric_source.as_ref());

        let metric_name = match self.effective_metric_name() {
            Some(name) => name.to_string(),
            // split always yields at least one item
            None => segments.last().copied().unwrap_or_default().to_string(),
        };
        ResolvedSeries::new(metric_name, dimensions)
    }
}
