/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::Write;

use anyhow::anyhow;
use serde_json::{Map, Number, Value};

use crate::types::DataPoint;

fn point_to_json(point: &DataPoint) -> Value {
    let mut map = Map::with_capacity(4);
    map.insert(
        "metric".to_string(),
        Value::String(point.metric.to_string()),
    );
    let mut dimensions = Map::with_capacity(point.dimensions.len());
    for (name, value) in point.dimensions.iter() {
        dimensions.insert(name.to_string(), Value::String(value.to_string()));
    }
    map.insert("dimensions".to_string(), Value::Object(dimensions));
    map.insert(
        "value".to_string(),
        Value::Number(Number::from(point.value)),
    );
    map.insert(
        "timestamp".to_string(),
        Value::Number(Number::from(point.timestamp_millis)),
    );
    Value::Object(map)
}

pub(super) fn fill_body(points: &[DataPoint], body_buf: &mut Vec<u8>) {
    body_buf.extend_from_slice(b"{\"gauge\":[");

    let mut iter = points.iter();
    if let Some(point) = iter.next() {
        let v = point_to_json(point);
        let _ = write!(body_buf, "{v}");

        for point in iter {
            body_buf.push(b',');
            let v = point_to_json(point);
            let _ = write!(body_buf, "{v}");
        }
    }

    body_buf.extend_from_slice(b"]}");
}

pub(super) fn check_response(code: u32, body: &[u8]) -> anyhow::Result<()> {
    if code != 200 {
        if let Ok(detail) = std::str::from_utf8(body) {
            Err(anyhow!("error response: {code} {detail}"))
        } else {
            Err(anyhow!("error response: {code}"))
        }
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DimensionMap, ResolvedSeries, Sample};

    #[test]
    fn body() {
        let dims: DimensionMap = [("tier", "web"), ("metric_source", "AppDynamics")]
            .into_iter()
            .collect();
        let series = ResolvedSeries::new("Calls per Minute".to_string(), dims);
        let points = series.to_data_points(&[Sample::new(60000, 12), Sample::new(120000, -3)]);

        let mut buf = Vec::new();
        fill_body(&points, &mut buf);

        let doc: Value = serde_json::from_slice(&buf).unwrap();
        let gauge = doc.get("gauge").unwrap().as_array().unwrap();
        assert_eq!(gauge.len(), 2);
        assert_eq!(
            gauge[0],
            serde_json::json!({
                "metric": "Calls per Minute",
                "dimensions": {"metric_source": "AppDynamics", "tier": "web"},
                "value": 12,
                "timestamp": 60000,
            })
        );
        assert_eq!(gauge[1].get("value").unwrap().as_i64(), Some(-3));
        assert_eq!(gauge[1].get("timestamp").unwrap().as_i64(), Some(120000));
    }

    #[test]
    fn empty_body() {
        let mut buf = Vec::new();
        fill_body(&[], &mut buf);
        assert_eq!(buf, b"{\"gauge\":[]}");
    }

    #[test]
    fn response() {
        assert!(check_response(200, b"\"OK\"").is_ok());
        let e = check_response(401, b"Unauthorized").unwrap_err();
        assert_eq!(e.to_string(), "error response: 401 Unauthorized");
        assert!(check_response(500, &[0xff, 0xfe]).is_err());
    }
}
