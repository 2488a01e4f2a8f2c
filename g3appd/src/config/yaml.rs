/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use humanize_rs::ParseError;
use url::Url;
use yaml_rust::{Yaml, YamlLoader, yaml};

use crate::types::DimensionMap;

pub(crate) fn normalize(raw: &str) -> String {
    raw.to_lowercase().replace('-', "_")
}

pub(crate) fn load_docs(path: &Path) -> anyhow::Result<Vec<Yaml>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read in file {}: {e}", path.display()))?;
    YamlLoader::load_from_str(&content)
        .map_err(|e| anyhow!("invalid yaml file {}: {e}", path.display()))
}

pub(crate) fn foreach_kv<F>(table: &yaml::Hash, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(&str, &Yaml) -> anyhow::Result<()>,
{
    for (k, v) in table.iter() {
        if let Yaml::String(key) = k {
            f(key, v).context(format!("failed to parse value of key {key}"))?;
        } else {
            return Err(anyhow!("key in hash should be string"));
        }
    }
    Ok(())
}

pub(crate) fn as_string(v: &Yaml) -> anyhow::Result<String> {
    match v {
        Yaml::String(s) => Ok(s.to_string()),
        Yaml::Integer(i) => Ok(i.to_string()),
        Yaml::Real(s) => Ok(s.to_string()),
        _ => Err(anyhow!(
            "yaml value type for string should be 'string' / 'integer' / 'real'"
        )),
    }
}

pub(crate) fn as_i64(v: &Yaml) -> anyhow::Result<i64> {
    match v {
        Yaml::String(s) => Ok(i64::from_str(s)?),
        Yaml::Integer(i) => Ok(*i),
        _ => Err(anyhow!(
            "yaml value type for 'i64' should be 'string' or 'integer'"
        )),
    }
}

pub(crate) fn as_usize(v: &Yaml) -> anyhow::Result<usize> {
    match v {
        Yaml::String(s) => Ok(usize::from_str(s)?),
        Yaml::Integer(i) => Ok(usize::try_from(*i)?),
        _ => Err(anyhow!(
            "yaml value type for 'usize' should be 'string' or 'integer'"
        )),
    }
}

pub(crate) fn as_duration(v: &Yaml) -> anyhow::Result<Duration> {
    match v {
        Yaml::String(value) => match humanize_rs::duration::parse(value) {
            Ok(v) => Ok(v),
            Err(ParseError::MissingUnit) => {
                let u = u64::from_str(value).map_err(|_| anyhow!("invalid duration string"))?;
                Ok(Duration::from_secs(u))
            }
            Err(e) => Err(anyhow!("invalid humanize duration string: {e}")),
        },
        Yaml::Integer(value) => {
            let u = u64::try_from(*value).map_err(|_| anyhow!("negative duration value"))?;
            Ok(Duration::from_secs(u))
        }
        _ => Err(anyhow!(
            "yaml value type for humanize duration should be 'string' or 'integer'"
        )),
    }
}

pub(crate) fn as_url(v: &Yaml) -> anyhow::Result<Url> {
    let s = as_string(v)?;
    Url::parse(&s).map_err(|e| anyhow!("invalid url string {s}: {e}"))
}

pub(crate) fn as_list<T, F>(v: &Yaml, convert: F) -> anyhow::Result<Vec<T>>
where
    F: Fn(&Yaml) -> anyhow::Result<T>,
{
    let mut vec = Vec::new();
    match v {
        Yaml::Array(seq) => {
            for (i, v) in seq.iter().enumerate() {
                let node = convert(v).context(format!("invalid value for list element #{i}"))?;
                vec.push(node);
            }
        }
        _ => {
            let node = convert(v).context("invalid single value for the list")?;
            vec.push(node);
        }
    }
    Ok(vec)
}

pub(crate) fn as_dimension_map(v: &Yaml) -> anyhow::Result<DimensionMap> {
    match v {
        Yaml::Hash(map) => {
            let mut dims = DimensionMap::new();
            for (k, v) in map.iter() {
                let key = as_string(k).context(format!("invalid dimension key {k:?}"))?;
                let value = as_string(v).context(format!("invalid value for dimension {key}"))?;
                dims.insert(key, value);
            }
            Ok(dims)
        }
        Yaml::Null => Ok(DimensionMap::new()),
        _ => Err(anyhow!("yaml value type for dimensions should be 'map'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_one(s: &str) -> Yaml {
        YamlLoader::load_from_str(s).unwrap().pop().unwrap()
    }

    #[test]
    fn normalize_key() {
        assert_eq!(normalize("Connect-Timeout"), "connect_timeout");
        assert_eq!(normalize("max_body_points"), "max_body_points");
    }

    #[test]
    fn duration() {
        assert_eq!(
            as_duration(&Yaml::String("30s".to_string())).unwrap(),
            Duration::from_secs(30)
        );
        assert_eq!(
            as_duration(&Yaml::String("1m".to_string())).unwrap(),
            Duration::from_secs(60)
        );
        assert_eq!(
            as_duration(&Yaml::String("5".to_string())).unwrap(),
            Duration::from_secs(5)
        );
        assert_eq!(as_duration(&Yaml::Integer(2)).unwrap(), Duration::from_secs(2));
        assert!(as_duration(&Yaml::Integer(-1)).is_err());
        assert!(as_duration(&Yaml::Boolean(true)).is_err());
    }

    #[test]
    fn dimension_map() {
        let v = load_one("env: prod\nzone: 3\n");
        let dims = as_dimension_map(&v).unwrap();
        assert_eq!(dims.get("env"), Some("prod"));
        assert_eq!(dims.get("zone"), Some("3"));

        assert!(as_dimension_map(&Yaml::Null).unwrap().is_empty());
        assert!(as_dimension_map(&load_one("[a, b]")).is_err());
    }

    #[test]
    fn list() {
        let v = load_one("[1, 2, 3]");
        assert_eq!(as_list(&v, as_i64).unwrap(), vec![1, 2, 3]);
        assert_eq!(as_list(&Yaml::Integer(7), as_i64).unwrap(), vec![7]);
    }
}
