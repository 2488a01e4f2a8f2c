/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use anyhow::{Context, anyhow};
use url::Url;
use yaml_rust::Yaml;

use super::{EnvLookup, yaml};

const ENV_TOKEN: &str = "SIGNALFX_TOKEN";

const DEFAULT_INGEST_URL: &str = "https://ingest.signalfx.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MAX_BODY_POINTS: usize = 5000;

/// Settings of the SignalFx ingest endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignalfxConfig {
    pub(crate) url: Url,
    pub(crate) token: String,
    pub(crate) timeout: Duration,
    pub(crate) connect_timeout: Duration,
    pub(crate) max_body_points: usize,
}

impl SignalfxConfig {
    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

pub(super) struct SignalfxConfigBuilder {
    url: Option<Url>,
    token: Option<String>,
    timeout: Duration,
    connect_timeout: Duration,
    max_body_points: usize,
}

impl Default for SignalfxConfigBuilder {
    fn default() -> Self {
        SignalfxConfigBuilder {
            url: None,
            token: None,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_body_points: DEFAULT_MAX_BODY_POINTS,
        }
    }
}

impl SignalfxConfigBuilder {
    pub(super) fn parse(&mut self, v: &Yaml) -> anyhow::Result<()> {
        if let Yaml::Hash(map) = v {
            yaml::foreach_kv(map, |k, v| self.set(k, v))
        } else {
            Err(anyhow!(
                "yaml value type for the signalfx config should be 'map'"
            ))
        }
    }

    fn set(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match yaml::normalize(k).as_str() {
            "url" | "ingest_url" => {
                let url = yaml::as_url(v).context(format!("invalid url value for key {k}"))?;
                self.url = Some(url);
                Ok(())
            }
            "token" => {
                self.token = Some(yaml::as_string(v)?);
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
            "max_body_points" => {
                let n = yaml::as_usize(v)?;
                if n == 0 {
                    return Err(anyhow!("zero value is not allowed for key {k}"));
                }
                self.max_body_points = n;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }

    pub(super) fn build(self, env: EnvLookup) -> anyhow::Result<SignalfxConfig> {
        let url = match self.url {
            Some(url) => url,
            None => Url::parse(DEFAULT_INGEST_URL)?,
        };
        let token = self
            .token
            .or_else(|| env(ENV_TOKEN))
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("SignalFx token not specified"))?;

        Ok(SignalfxConfig {
            url,
            token,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            max_body_points: self.max_body_points,
        })
    }
}
