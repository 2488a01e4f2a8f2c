/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use crate::types::{ResolvedSeries, Sample};

mod arena;
use arena::SeriesArena;

/// Keeps the highest timestamp already emitted for each series, and drops
/// samples at or below it.
///
/// The high-water mark is advanced as soon as a batch is filtered, not when
/// the resulting data points have been delivered. A failed delivery will
/// therefore not be retried with the same samples.
#[derive(Default)]
pub struct SeriesDedupFilter {
    arena: SeriesArena,
}

impl SeriesDedupFilter {
    pub fn new() -> Self {
        SeriesDedupFilter::default()
    }

    /// Number of distinct series seen so far.
    pub fn series_count(&self) -> usize {
        self.arena.len()
    }

    pub fn high_water(&self, series: &ResolvedSeries) -> Option<i64> {
        let hash = series.canonical_hash();
        self.arena
            .find(hash, series)
            .and_then(|id| self.arena.get(id).last_emitted)
    }

    /// Return the samples newer than the last emitted one for this series,
    /// and record the newest of them as the new high-water mark.
    ///
    /// The input batch needs not to be sorted.
    pub fn filter_and_advance(
        &mut self,
        series: &ResolvedSeries,
        samples: Vec<Sample>,
    ) -> Vec<Sample> {
        let hash = series.canonical_hash();
        let id = match self.arena.find(hash, series) {
            Some(id) => id,
            None => self.arena.insert(hash, series.clone()),
        };
        let record = self.arena.get_mut(id);

        let unseen: Vec<Sample> = match record.last_emitted {
            Some(last) => samples
                .into_iter()
                .filter(|s| s.timestamp_millis > last)
                .collect(),
            None => samples,
        };

        if let Some(newest) = unseen.iter().map(|s| s.timestamp_millis).max() {
            match record.last_emitted {
                Some(last) if last >= newest => {}
                _ => record.last_emitted = Some(newest),
            }
        }
        unseen
    }
}
