/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::HashMap;

use foldhash::fast::FixedState;
use smallvec::SmallVec;

use crate::types::ResolvedSeries;

pub(super) struct SeriesRecord {
    series: ResolvedSeries,
    pub(super) last_emitted: Option<i64>,
}

/// Series records stored by insertion slot, indexed by the canonical hash of
/// the series. Slots sharing a hash are told apart by full comparison.
pub(super) struct SeriesArena {
    records: Vec<SeriesRecord>,
    index: HashMap<u64, SmallVec<[usize; 1]>, FixedState>,
}

impl Default for SeriesArena {
    fn default() -> Self {
        SeriesArena {
            records: Vec::new(),
            index: HashMap::with_hasher(FixedState::with_seed(0)),
        }
    }
}

impl SeriesArena {
    pub(super) fn len(&self) -> usize {
        self.records.len()
    }

    pub(super) fn find(&self, hash: u64, series: &ResolvedSeries) -> Option<usize> {
        let slots = self.index.get(&hash)?;
        slots
            .iter()
            .copied()
            .find(|id| self.records[*id].series.eq(series))
    }

    pub(super) fn insert(&mut self, hash: u64, series: ResolvedSeries) -> usize {
        let id = self.records.len();
        self.records.push(SeriesRecord {
            series,
            last_emitted: None,
        });
        self.index.entry(hash).or_default().push(id);
        id
    }

    pub(super) fn get(&self, id: usize) -> &SeriesRecord {
        &self.records[id]
    }

    pub(super) fn get_mut(&mut self, id: usize) -> &mut SeriesRecord {
        &mut self.records[id]
    }
}
