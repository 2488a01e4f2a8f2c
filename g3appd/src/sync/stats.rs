/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicU64, Ordering};

/// Cumulative counters of the sync loop.
#[derive(Default)]
pub struct SyncStats {
    request_failures: AtomicU64,
    series_reported: AtomicU64,
    series_empty: AtomicU64,
    data_points_reported: AtomicU64,
}

macro_rules! impl_for_field {
    ($add:ident, $get:ident, $field:ident) => {
        pub(crate) fn $add(&self, n: u64) {
            self.$field.fetch_add(n, Ordering::Relaxed);
        }

        pub fn $get(&self) -> u64 {
            self.$field.load(Ordering::Relaxed)
        }
    };
}

impl SyncStats {
    impl_for_field!(add_request_failures, get_request_failures, request_failures);
    impl_for_field!(add_series_reported, get_series_reported, series_reported);
    impl_for_field!(add_series_empty, get_series_empty, series_empty);
    impl_for_field!(
        add_data_points_reported,
        get_data_points_reported,
        data_points_reported
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulate() {
        let stats = SyncStats::default();
        stats.add_request_failures(1);
        stats.add_request_failures(2);
        stats.add_series_reported(4);
        stats.add_series_empty(0);
        stats.add_data_points_reported(10);
        stats.add_data_points_reported(5);

        assert_eq!(stats.get_request_failures(), 3);
        assert_eq!(stats.get_series_reported(), 4);
        assert_eq!(stats.get_series_empty(), 0);
        assert_eq!(stats.get_data_points_reported(), 15);
    }
}
