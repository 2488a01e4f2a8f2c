/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::{Context, anyhow};
use serde_json::{Map, Value};

use super::MetricData;
use crate::types::Sample;

fn get_str<'a>(map: &'a Map<String, Value>, key: &str) -> anyhow::Result<&'a str> {
    match map.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(anyhow!("invalid string value for key {key}")),
        None => Err(anyhow!("no required key {key} found")),
    }
}

fn get_i64(map: &Map<String, Value>, key: &str) -> anyhow::Result<i64> {
    match map.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| anyhow!("invalid i64 value for key {key}")),
        Some(_) => Err(anyhow!("invalid number value for key {key}")),
        None => Err(anyhow!("no required key {key} found")),
    }
}

fn get_optional_i64(map: &Map<String, Value>, key: &str) -> anyhow::Result<Option<i64>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => get_i64(map, key).map(Some),
    }
}

fn parse_sample(value: &Value) -> anyhow::Result<Sample> {
    let Value::Object(map) = value else {
        return Err(anyhow!("metric value should be an object"));
    };

    Ok(Sample {
        timestamp_millis: get_i64(map, "startTimeInMillis")?,
        value: get_i64(map, "value")?,
        count: get_optional_i64(map, "count")?,
        min: get_optional_i64(map, "min")?,
        max: get_optional_i64(map, "max")?,
        sum: get_optional_i64(map, "sum")?,
        current: get_optional_i64(map, "current")?,
    })
}

fn parse_metric_data(value: &Value) -> anyhow::Result<MetricData> {
    let Value::Object(map) = value else {
        return Err(anyhow!("metric data should be an object"));
    };

    let path = get_str(map, "metricPath")?.to_string();
    let name = match map.get("metricName") {
        Some(Value::String(s)) => s.to_string(),
        _ => String::new(),
    };
    let frequency = match map.get("frequency") {
        Some(Value::String(s)) => s.to_string(),
        _ => String::new(),
    };
    let id = get_optional_i64(map, "metricId")?.unwrap_or_default();

    let samples = match map.get("metricValues") {
        Some(Value::Array(values)) => {
            let mut samples = Vec::with_capacity(values.len());
            for (i, v) in values.iter().enumerate() {
                let sample = parse_sample(v)
                    .context(format!("invalid metric value #{i} for path {path}"))?;
                samples.push(sample);
            }
            samples
        }
        None | Some(Value::Null) => Vec::new(),
        Some(_) => return Err(anyhow!("invalid metricValues for path {path}")),
    };

    Ok(MetricData {
        id,
        name,
        path,
        frequency,
        samples,
    })
}

pub(super) fn parse_metric_data_list(body: &[u8]) -> anyhow::Result<Vec<MetricData>> {
    let doc: Value =
        serde_json::from_slice(body).map_err(|e| anyhow!("response is not valid json: {e}"))?;
    let Value::Array(list) = doc else {
        return Err(anyhow!("the response json should be an array"));
    };

    let mut all = Vec::with_capacity(list.len());
    for (i, v) in list.iter().enumerate() {
        let data = parse_metric_data(v).context(format!("invalid metric data #{i}"))?;
        all.push(data);
    }
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controller_response() {
        let body = br#"[
            {
                "metricId": 2283,
                "metricName": "BTM|Application Summary|Calls per Minute",
                "metricPath": "Overall Application Performance|Calls per Minute",
                "frequency": "ONE_MIN",
                "metricValues": [
                    {
                        "startTimeInMillis": 1443033600000,
                        "occurrences": 0,
                        "current": 12,
                        "min": 0,
                        "max": 31,
                        "useRange": true,
                        "count": 4,
                        "sum": 55,
                        "value": 13,
                        "standardDeviation": 0
                    },
                    {
                        "startTimeInMillis": 1443033660000,
                        "current": 9,
                        "min": 1,
                        "max": 20,
                        "count": 2,
                        "sum": 21,
                        "value": 10
                    }
                ]
            },
            {
                "metricName": "METRIC DATA NOT FOUND",
                "metricId": -1,
                "metricPath": "Overall Application Performance|Unknown",
                "frequency": "ONE_MIN",
                "metricValues": []
            }
        ]"#;

        let list = parse_metric_data_list(body).unwrap();
        assert_eq!(list.len(), 2);

        let d = &list[0];
        assert_eq!(d.id, 2283);
        assert_eq!(d.path, "Overall Application Performance|Calls per Minute");
        assert_eq!(d.frequency, "ONE_MIN");
        assert_eq!(d.samples.len(), 2);
        assert_eq!(
            d.samples[0],
            Sample {
                timestamp_millis: 1443033600000,
                value: 13,
                count: Some(4),
                min: Some(0),
                max: Some(31),
                sum: Some(55),
                current: Some(12),
            }
        );
        assert_eq!(d.samples[1].timestamp_millis, 1443033660000);

        assert_eq!(list[1].id, -1);
        assert!(list[1].samples.is_empty());
    }

    #[test]
    fn empty_response() {
        assert!(parse_metric_data_list(b"[]").unwrap().is_empty());
    }

    #[test]
    fn invalid_response() {
        assert!(parse_metric_data_list(b"{}").is_err());
        assert!(parse_metric_data_list(b"not json").is_err());
        assert!(parse_metric_data_list(br#"[{"metricName": "x"}]"#).is_err());
        assert!(
            parse_metric_data_list(
                br#"[{"metricPath": "A|B", "metricValues": [{"value": 1}]}]"#
            )
            .is_err()
        );
    }
}
