/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, anyhow};
use log::warn;
use yaml_rust::{Yaml, yaml::Hash};

mod yaml;

mod app;
pub use app::AppSyncConfig;

mod controller;
pub use controller::ControllerConfig;
use controller::ControllerConfigBuilder;

mod signalfx;
pub use signalfx::SignalfxConfig;
use signalfx::SignalfxConfigBuilder;

mod stat;
pub use stat::StatConfig;

const ENV_INTERVAL: &str = "APPD_INTERVAL";
const ENV_METRICS_FILE: &str = "SIGNALFX_APPD_METRICS";
const DEFAULT_METRICS_FILE: &str = "metrics.json";

type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

#[derive(Debug)]
pub struct ProcConfig {
    pub(crate) controller: Arc<ControllerConfig>,
    pub(crate) signalfx: Arc<SignalfxConfig>,
    pub(crate) interval_minutes: u64,
    pub(crate) stat: Option<StatConfig>,
    pub(crate) apps: Vec<AppSyncConfig>,
}

impl ProcConfig {
    #[inline]
    pub fn interval_minutes(&self) -> u64 {
        self.interval_minutes
    }

    #[inline]
    pub fn apps(&self) -> &[AppSyncConfig] {
        &self.apps
    }

    pub fn rule_count(&self) -> usize {
        self.apps.iter().map(|app| app.rules().len()).sum()
    }
}

pub fn load(config_file: &Path) -> anyhow::Result<Arc<ProcConfig>> {
    let docs = yaml::load_docs(config_file)?;
    let lookup_dir = config_file.parent().unwrap_or_else(|| Path::new("."));
    let config = parse_docs(&docs, lookup_dir, &|k| std::env::var(k).ok())
        .context(format!("failed to load config file {}", config_file.display()))?;

    Ok(Arc::new(config))
}

#[derive(Default)]
struct ProcConfigBuilder {
    controller: ControllerConfigBuilder,
    signalfx: SignalfxConfigBuilder,
    interval: Option<i64>,
    metric_source: Option<String>,
    stat: Option<StatConfig>,
    apps: Vec<AppSyncConfig>,
    metrics_file: Option<PathBuf>,
}

impl ProcConfigBuilder {
    fn load_doc(&mut self, map: &Hash, lookup_dir: &Path) -> anyhow::Result<()> {
        yaml::foreach_kv(map, |k, v| match yaml::normalize(k).as_str() {
            "controller" | "appd" => self.controller.parse(v),
            "signalfx" => self.signalfx.parse(v),
            "interval" => {
                self.interval = Some(yaml::as_i64(v)?);
                Ok(())
            }
            "metric_source" => {
                self.metric_source = Some(yaml::as_string(v)?);
                Ok(())
            }
            "stat" => {
                self.stat = Some(StatConfig::parse(v)?);
                Ok(())
            }
            "apps" => {
                let apps = yaml::as_list(v, app::parse_yaml_app)?;
                self.apps.extend(apps);
                Ok(())
            }
            "metrics_file" => {
                let path = PathBuf::from(yaml::as_string(v)?);
                self.metrics_file = Some(lookup_dir.join(path));
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k} in main conf")),
        })
    }

    fn build(mut self, lookup_dir: &Path, env: EnvLookup) -> anyhow::Result<ProcConfig> {
        let controller = self
            .controller
            .build(env)
            .context("invalid controller config")?;
        let signalfx = self.signalfx.build(env).context("invalid signalfx config")?;
        let interval_minutes = match self.interval {
            Some(n) => clamp_interval(n),
            None => interval_from_env(env),
        };

        let metrics_file = match self.metrics_file.take() {
            Some(path) => Some(path),
            None if self.apps.is_empty() => {
                let path = env(ENV_METRICS_FILE)
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| DEFAULT_METRICS_FILE.to_string());
                Some(lookup_dir.join(path))
            }
            None => None,
        };
        if let Some(path) = metrics_file {
            let apps = app::load_json_file(&path)?;
            self.apps.extend(apps);
        }

        if self.apps.is_empty() {
            return Err(anyhow!("no apps configured"));
        }
        if let Some(source) = self.metric_source {
            let source: Arc<str> = Arc::from(source);
            for app in self.apps.iter_mut() {
                for rule in app.rules_mut() {
                    rule.set_metric_source(source.clone());
                }
            }
        }

        let config = ProcConfig {
            controller: Arc::new(controller),
            signalfx: Arc::new(signalfx),
            interval_minutes,
            stat: self.stat,
            apps: self.apps,
        };
        if config.rule_count() == 0 {
            return Err(anyhow!("no metric rules configured"));
        }
        Ok(config)
    }
}

fn parse_docs(docs: &[Yaml], lookup_dir: &Path, env: EnvLookup) -> anyhow::Result<ProcConfig> {
    let mut builder = ProcConfigBuilder::default();
    // allow multiple docs, and treat them as the same
    for (i, doc) in docs.iter().enumerate() {
        match doc {
            Yaml::Hash(map) => builder
                .load_doc(map, lookup_dir)
                .context(format!("invalid yaml doc #{i}"))?,
            _ => return Err(anyhow!("yaml doc root should be hash")),
        }
    }
    builder.build(lookup_dir, env)
}

fn clamp_interval(n: i64) -> u64 {
    if n < 1 {
        warn!("interval {n} is less than 1 minute minimum, setting to 1 minute");
        1
    } else {
        n as u64
    }
}

fn interval_from_env(env: EnvLookup) -> u64 {
    match env(ENV_INTERVAL) {
        Some(s) if !s.is_empty() => match s.trim().parse::<i64>() {
            Ok(n) => clamp_interval(n),
            Err(_) => {
                warn!("invalid interval config {s}, default to 1");
                1
            }
        },
        _ => 1,
    }
}
