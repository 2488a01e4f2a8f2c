/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

//! Mapping of AppDynamics metric paths to metric names and dimensions.
//!
//! A metric path is a pipe separated list of tokens, e.g.
//! `Performance|AppServer1|Resources|CPU`. The last token becomes the metric
//! name, and the leading tokens are mapped to dimensions by position through a
//! parallel dimension template such as `category|host|-`, where `-` skips
//! the token at that position.
//!
//! As a query path may contain wildcards (`A|*|B`), the mapping is always done
//! against the actual path returned by the controller.

use thiserror::Error;

mod rule;
pub use rule::MetricPathRule;

pub const PATH_DELIMITER: char = '|';
pub const PATH_WILDCARD: &str = "*";
pub const DIMENSION_SKIP: &str = "-";

pub const METRIC_SOURCE_KEY: &str = "metric_source";
pub const DEFAULT_METRIC_SOURCE: &str = "AppDynamics";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "metric path {path_query} has {path_segments} segments, \
         while the dimension template {dimension_template} has {template_segments}"
    )]
    SegmentCountMismatch {
        path_query: String,
        dimension_template: String,
        path_segments: usize,
        template_segments: usize,
    },
    #[error("empty metric path query")]
    EmptyPathQuery,
    #[error("empty dimension name at position {position} in template {dimension_template}")]
    EmptyDimensionName {
        dimension_template: String,
        position: usize,
    },
}
