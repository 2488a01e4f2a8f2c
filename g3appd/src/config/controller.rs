/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use anyhow::{Context, anyhow};
use url::Url;
use yaml_rust::Yaml;

use super::{EnvLookup, yaml};

const ENV_HOST: &str = "APPD_HOST";
const ENV_USERNAME: &str = "APPD_USERNAME";
const ENV_PASSWORD: &str = "APPD_PASSWORD";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MAX_BODY_SIZE: usize = 64 * 1024 * 1024;

/// Connection settings of the AppDynamics controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControllerConfig {
    pub(crate) url: Url,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) timeout: Duration,
    pub(crate) connect_timeout: Duration,
    pub(crate) max_body_size: usize,
}

impl ControllerConfig {
    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

pub(super) struct ControllerConfigBuilder {
    url: Option<Url>,
    username: Option<String>,
    password: Option<String>,
    timeout: Duration,
    connect_timeout: Duration,
    max_body_size: usize,
}

impl Default for ControllerConfigBuilder {
    fn default() -> Self {
        ControllerConfigBuilder {
            url: None,
            username: None,
            password: None,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl ControllerConfigBuilder {
    pub(super) fn parse(&mut self, v: &Yaml) -> anyhow::Result<()> {
        if let Yaml::Hash(map) = v {
            yaml::foreach_kv(map, |k, v| self.set(k, v))
        } else {
            Err(anyhow!(
                "yaml value type for the controller config should be 'map'"
            ))
        }
    }

    fn set(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match yaml::normalize(k).as_str() {
            "url" | "host" => {
                let url = yaml::as_url(v).context(format!("invalid url value for key {k}"))?;
                self.url = Some(url);
                Ok(())
            }
            "username" => {
                self.username = Some(yaml::as_string(v)?);
                Ok(())
            }
            "password" => {
                self.password = Some(yaml::as_string(v)?);
                Ok(())
            }
            "timeout" => {
                self.timeout = yaml::as_duration(v)?;
                Ok(())
            }
            "connect_timeout" => {
                self.connect_timeout = yaml::as_duration(v)?;
                Ok(())
            }
            "max_body_size" => {
                self.max_body_size = yaml::as_usize(v)?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }

    pub(super) fn build(self, env: EnvLookup) -> anyhow::Result<ControllerConfig> {
        let url = match self.url {
            Some(url) => url,
            None => {
                let Some(s) = env(ENV_HOST) else {
                    return Err(anyhow!("AppDynamics host not specified"));
                };
                Url::parse(&s).map_err(|e| anyhow!("invalid url {s} in env {ENV_HOST}: {e}"))?
            }
        };
        let username = self
            .username
            .or_else(|| env(ENV_USERNAME))
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("AppDynamics username not specified"))?;
        let password = self
            .password
            .or_else(|| env(ENV_PASSWORD))
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("AppDynamics password not specified"))?;

        Ok(ControllerConfig {
            url,
            username,
            password,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            max_body_size: self.max_body_size,
        })
    }
}
