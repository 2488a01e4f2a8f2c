/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use anyhow::anyhow;
use yaml_rust::Yaml;

use super::yaml;

const DEFAULT_PREFIX: &str = "g3appd";
const DEFAULT_EMIT_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatConfig {
    pub(crate) target: String,
    pub(crate) prefix: String,
    pub(crate) emit_interval: Duration,
}

impl StatConfig {
    pub(super) fn parse(v: &Yaml) -> anyhow::Result<Self> {
        let Yaml::Hash(map) = v else {
            return Err(anyhow!("yaml value type for the stat config should be 'map'"));
        };

        let mut target: Option<String> = None;
        let mut prefix = DEFAULT_PREFIX.to_string();
        let mut emit_interval = DEFAULT_EMIT_INTERVAL;
        yaml::foreach_kv(map, |k, v| match yaml::normalize(k).as_str() {
            "target" | "target_udp" => {
                target = Some(yaml::as_string(v)?);
                Ok(())
            }
            "prefix" => {
                prefix = yaml::as_string(v)?;
                Ok(())
            }
            "emit_interval" | "emit_duration" => {
                emit_interval = yaml::as_duration(v)?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        })?;

        let Some(target) = target else {
            return Err(anyhow!("no statsd target set"));
        };
        if emit_interval.is_zero() {
            return Err(anyhow!("zero emit interval is not allowed"));
        }
        Ok(StatConfig {
            target,
            prefix,
            emit_interval,
        })
    }
}
