/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod dimension;
pub use dimension::DimensionMap;

mod sample;
pub use sample::{DataPoint, Sample};

mod series;
pub use series::ResolvedSeries;
