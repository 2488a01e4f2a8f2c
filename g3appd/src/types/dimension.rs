/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::hash::Hasher;

/// Dimension set of a series, kept sorted by dimension name.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DimensionMap {
    inner: BTreeMap<String, String>,
}

impl DimensionMap {
    pub fn new() -> Self {
        DimensionMap::default()
    }

    pub fn insert<K, V>(&mut self, name: K, value: V) -> Option<String>
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.inner.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner.get(name).map(|v| v.as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.inner.iter()
    }

    /// Feed the sorted name/value pairs into the hasher, length prefixed so
    /// that adjacent fields can not be confused with each other.
    pub(crate) fn write_canonical<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.inner.len());
        for (name, value) in &self.inner {
            state.write_usize(name.len());
            state.write(name.as_bytes());
            state.write_usize(value.len());
            state.write(value.as_bytes());
        }
    }
}

impl<K, V> FromIterator<(K, V)> for DimensionMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let inner = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        DimensionMap { inner }
    }
}

impl<'a> IntoIterator for &'a DimensionMap {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

impl fmt::Display for DimensionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.inner.iter();
        let Some((name, value)) = iter.next() else {
            return Ok(());
        };
        write!(f, "{name}: {value}")?;
        for (name, value) in iter {
            write!(f, ", {name}: {value}")?;
        }
        Ok(())
    }
}
