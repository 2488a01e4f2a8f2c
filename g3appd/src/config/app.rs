/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::Path;

use anyhow::{Context, anyhow};
use log::warn;
use serde_json::Value;
use yaml_rust::Yaml;

use super::yaml;
use crate::mapping::MetricPathRule;
use crate::types::DimensionMap;

/// Sync settings of one AppDynamics application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppSyncConfig {
    pub(crate) name: String,
    pub(crate) rules: Vec<MetricPathRule>,
}

impl AppSyncConfig {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn rules(&self) -> &[MetricPathRule] {
        &self.rules
    }

    pub(crate) fn rules_mut(&mut self) -> &mut [MetricPathRule] {
        &mut self.rules
    }
}

#[derive(Default)]
struct RuleBuilder {
    metric_path: Option<String>,
    dimensions_path_map: Option<String>,
    metric_name: Option<String>,
    dimensions: DimensionMap,
}

impl RuleBuilder {
    fn build(self) -> anyhow::Result<MetricPathRule> {
        let Some(metric_path) = self.metric_path else {
            return Err(anyhow!("no metric_path set"));
        };
        let template = self.dimensions_path_map.unwrap_or_default();
        let mut rule = MetricPathRule::compile(&metric_path, &template, self.dimensions)
            .context(format!("invalid rule for metric path {metric_path}"))?;
        if let Some(name) = self.metric_name {
            if rule.has_wildcard() {
                warn!(
                    "metric name {name} is ignored for metric path {metric_path} as it contains wildcard"
                );
            }
            rule.set_metric_name(name);
        }
        Ok(rule)
    }
}

fn parse_yaml_rule(v: &Yaml) -> anyhow::Result<MetricPathRule> {
    let Yaml::Hash(map) = v else {
        return Err(anyhow!("yaml value type for metric rule should be 'map'"));
    };

    let mut builder = RuleBuilder::default();
    yaml::foreach_kv(map, |k, v| match yaml::normalize(k).as_str() {
        "metric_path" => {
            builder.metric_path = Some(yaml::as_string(v)?);
            Ok(())
        }
        "dimensions_path_map" => {
            builder.dimensions_path_map = Some(yaml::as_string(v)?);
            Ok(())
        }
        "metric_name" => {
            builder.metric_name = Some(yaml::as_string(v)?);
            Ok(())
        }
        "dimensions" => {
            builder.dimensions = yaml::as_dimension_map(v)?;
            Ok(())
        }
        _ => Err(anyhow!("invalid key {k}")),
    })?;
    builder.build()
}

pub(super) fn parse_yaml_app(v: &Yaml) -> anyhow::Result<AppSyncConfig> {
    let Yaml::Hash(map) = v else {
        return Err(anyhow!("yaml value type for app should be 'map'"));
    };

    let mut name: Option<String> = None;
    let mut rules = Vec::new();
    yaml::foreach_kv(map, |k, v| match yaml::normalize(k).as_str() {
        "name" => {
            name = Some(yaml::as_string(v)?);
            Ok(())
        }
        "metrics" | "rules" => {
            rules = yaml::as_list(v, parse_yaml_rule)?;
            Ok(())
        }
        _ => Err(anyhow!("invalid key {k}")),
    })?;

    match name {
        Some(name) if !name.is_empty() => Ok(AppSyncConfig { name, rules }),
        _ => Err(anyhow!("no app name set")),
    }
}

fn json_string(v: &Value, key: &str) -> anyhow::Result<String> {
    match v {
        Value::String(s) => Ok(s.to_string()),
        _ => Err(anyhow!("invalid string value for key {key}")),
    }
}

fn parse_json_rule(v: &Value) -> anyhow::Result<MetricPathRule> {
    let Value::Object(map) = v else {
        return Err(anyhow!("json value type for metric rule should be 'object'"));
    };

    let mut builder = RuleBuilder::default();
    for (k, v) in map {
        match k.as_str() {
            "metric_path" => builder.metric_path = Some(json_string(v, k)?),
            "dimensions_path_map" => builder.dimensions_path_map = Some(json_string(v, k)?),
            "metric_name" => match v {
                Value::Null => {}
                _ => builder.metric_name = Some(json_string(v, k)?),
            },
            "dimensions" => match v {
                Value::Null => {}
                Value::Object(dims) => {
                    for (dk, dv) in dims {
                        builder.dimensions.insert(dk.as_str(), json_string(dv, dk)?);
                    }
                }
                _ => return Err(anyhow!("json value type for dimensions should be 'object'")),
            },
            _ => return Err(anyhow!("invalid key {k}")),
        }
    }
    builder.build()
}

fn parse_json_app(v: &Value) -> anyhow::Result<AppSyncConfig> {
    let Value::Object(map) = v else {
        return Err(anyhow!("json value type for app should be 'object'"));
    };

    let name = match map.get("name") {
        Some(v) => json_string(v, "name")?,
        None => return Err(anyhow!("no app name set")),
    };
    if name.is_empty() {
        return Err(anyhow!("empty app name"));
    }

    let mut rules = Vec::new();
    match map.get("metrics") {
        Some(Value::Array(list)) => {
            for (i, v) in list.iter().enumerate() {
                let rule = parse_json_rule(v).context(format!("invalid metric rule #{i}"))?;
                rules.push(rule);
            }
        }
        None | Some(Value::Null) => {}
        Some(_) => return Err(anyhow!("json value type for metrics should be 'array'")),
    }
    Ok(AppSyncConfig { name, rules })
}

pub(super) fn parse_json_apps(content: &str) -> anyhow::Result<Vec<AppSyncConfig>> {
    let doc: Value =
        serde_json::from_str(content).map_err(|e| anyhow!("invalid json content: {e}"))?;
    let Value::Array(list) = doc else {
        return Err(anyhow!("the root json value should be an array"));
    };

    let mut apps = Vec::with_capacity(list.len());
    for (i, v) in list.iter().enumerate() {
        let app = parse_json_app(v).context(format!("invalid app #{i}"))?;
        apps.push(app);
    }
    Ok(apps)
}

pub(super) fn load_json_file(path: &Path) -> anyhow::Result<Vec<AppSyncConfig>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read metrics file {}: {e}", path.display()))?;
    parse_json_apps(&content).context(format!("invalid metrics file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use yaml_rust::YamlLoader;

    #[test]
    fn yaml_app() {
        let s = r#"
name: shop
metrics:
  - metric_path: "Business Transaction Performance|Business Transactions|*|*|Average Response Time (ms)"
    dimensions_path_map: "-|-|tier|bt"
    dimensions:
      env: prod
  - metric-path: "Overall Application Performance|Calls per Minute"
    dimensions-path-map: "category"
    metric-name: calls_per_minute
"#;
        let doc = YamlLoader::load_from_str(s).unwrap().pop().unwrap();
        let app = parse_yaml_app(&doc).unwrap();
        assert_eq!(app.name(), "shop");
        assert_eq!(app.rules().len(), 2);

        let rule = &app.rules()[0];
        assert!(rule.has_wildcard());
        let series = rule.resolve(
            "Business Transaction Performance|Business Transactions|web|checkout|Average Response Time (ms)",
        );
        assert_eq!(series.metric_name, "Average Response Time (ms)");
        assert_eq!(series.dimensions.get("tier"), Some("web"));
        assert_eq!(series.dimensions.get("bt"), Some("checkout"));
        assert_eq!(series.dimensions.get("env"), Some("prod"));

        let rule = &app.rules()[1];
        assert_eq!(rule.effective_metric_name(), Some("calls_per_minute"));
    }

    #[test]
    fn yaml_app_invalid() {
        let doc = YamlLoader::load_from_str("metrics: []")
            .unwrap()
            .pop()
            .unwrap();
        assert!(parse_yaml_app(&doc).is_err());

        let s = r#"
name: shop
metrics:
  - metric_path: "A|B|C"
    dimensions_path_map: "a"
"#;
        let doc = YamlLoader::load_from_str(s).unwrap().pop().unwrap();
        assert!(parse_yaml_app(&doc).is_err());

        let s = r#"
name: shop
metrics:
  - metric_path: "A|B"
    dimensions_path_map: "a"
    unknown: x
"#;
        let doc = YamlLoader::load_from_str(s).unwrap().pop().unwrap();
        assert!(parse_yaml_app(&doc).is_err());
    }

    #[test]
    fn json_apps() {
        let s = r#"[
            {
                "name": "shop",
                "metrics": [
                    {
                        "metric_path": "Application Infrastructure Performance|*|Hardware Resources|CPU|%Busy",
                        "dimensions_path_map": "category|tier|-|-",
                        "dimensions": {"env": "prod"}
                    },
                    {
                        "metric_path": "Overall Application Performance|Calls per Minute",
                        "dimensions_path_map": "-",
                        "metric_name": "calls",
                        "dimensions": null
                    }
                ]
            },
            {"name": "empty", "metrics": []}
        ]"#;
        let apps = parse_json_apps(s).unwrap();
        assert_eq!(apps.len(), 2);
        assert_eq!(apps[0].name(), "shop");
        assert_eq!(apps[0].rules().len(), 2);
        assert!(apps[1].rules().is_empty());

        let series = apps[0].rules()[0]
            .resolve("Application Infrastructure Performance|db|Hardware Resources|CPU|%Busy");
        assert_eq!(series.metric_name, "%Busy");
        assert_eq!(series.dimensions.get("tier"), Some("db"));
        assert_eq!(
            series.dimensions.get("category"),
            Some("Application Infrastructure Performance")
        );

        let series = apps[0].rules()[1].resolve("Overall Application Performance|Calls per Minute");
        assert_eq!(series.metric_name, "calls");
    }

    #[test]
    fn json_apps_invalid() {
        assert!(parse_json_apps("{}").is_err());
        assert!(parse_json_apps(r#"[{"metrics": []}]"#).is_err());
        assert!(
            parse_json_apps(
                r#"[{"name": "a", "metrics": [{"metric_path": "A|B", "dimensions_path_map": "x|y"}]}]"#
            )
            .is_err()
        );
    }
}
