/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use anyhow::anyhow;
use curl::easy::{Auth, Easy, List};
use log::debug;
use url::Url;

use super::{FetchError, MetricData, MetricFetcher};
use crate::config::ControllerConfig;

const HTTP_STATUS_OK: u32 = 200;
const HTTP_STATUS_UNAUTHORIZED: u32 = 401;

/// Fetch metric data from the AppDynamics controller REST API.
pub struct AppdMetricFetcher {
    config: Arc<ControllerConfig>,
}

impl AppdMetricFetcher {
    pub fn new(config: Arc<ControllerConfig>) -> Self {
        AppdMetricFetcher { config }
    }
}

fn build_request_url(
    base: &Url,
    app_name: &str,
    path_query: &str,
    lookback_minutes: u64,
) -> anyhow::Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow!("invalid controller base url {base}"))?
        .pop_if_empty()
        .extend(["controller", "rest", "applications", app_name, "metric-data"]);
    url.query_pairs_mut()
        .clear()
        .append_pair("time-range-type", "BEFORE_NOW")
        .append_pair("duration-in-mins", &lookback_minutes.to_string())
        .append_pair("rollup", "false")
        .append_pair("metric-path", path_query)
        .append_pair("output", "json");
    Ok(url)
}

fn call_curl_blocking(config: &ControllerConfig, url: &Url) -> anyhow::Result<(u32, Vec<u8>)> {
    let mut easy = Easy::new();
    easy.timeout(config.timeout)
        .map_err(|e| anyhow!("failed to set timeout: {e}"))?;
    easy.connect_timeout(config.connect_timeout)
        .map_err(|e| anyhow!("failed to set connect timeout: {e}"))?;
    easy.url(url.as_str())
        .map_err(|e| anyhow!("failed to set url: {e}"))?;

    let mut auth = Auth::new();
    auth.basic(true);
    easy.http_auth(&auth)
        .map_err(|e| anyhow!("failed to set auth method: {e}"))?;
    easy.username(&config.username)
        .map_err(|e| anyhow!("failed to set username: {e}"))?;
    easy.password(&config.password)
        .map_err(|e| anyhow!("failed to set password: {e}"))?;

    let mut headers = List::new();
    headers
        .append("Accept: application/json")
        .map_err(|e| anyhow!("failed to add accept header: {e}"))?;
    easy.http_headers(headers)
        .map_err(|e| anyhow!("failed to set http headers: {e}"))?;

    let mut buf = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| {
                if buf.len() + data.len() > config.max_body_size {
                    // this will return an error with is_write_error
                    Ok(0)
                } else {
                    buf.extend_from_slice(data);
                    Ok(data.len())
                }
            })
            .map_err(|e| anyhow!("failed to set write callback function: {e}"))?;
        transfer
            .perform()
            .map_err(|e| anyhow!("curl failed: {e}"))?;
    }

    let code = easy
        .response_code()
        .map_err(|e| anyhow!("failed to get response code: {e}"))?;
    Ok((code, buf))
}

impl MetricFetcher for AppdMetricFetcher {
    async fn fetch(
        &self,
        app_name: &str,
        path_query: &str,
        lookback_minutes: u64,
    ) -> Result<Vec<MetricData>, FetchError> {
        let url = build_request_url(self.config.url(), app_name, path_query, lookback_minutes)
            .map_err(FetchError::RequestFailed)?;
        debug!("fetching metric data from {url}");

        let config = self.config.clone();
        let (code, body) = tokio::task::spawn_blocking(move || call_curl_blocking(&config, &url))
            .await
            .map_err(|e| FetchError::RequestFailed(anyhow!("join blocking task error: {e}")))?
            .map_err(FetchError::RequestFailed)?;

        match code {
            HTTP_STATUS_OK => super::parse::parse_metric_data_list(&body)
                .map_err(FetchError::RequestFailed),
            HTTP_STATUS_UNAUTHORIZED => Err(FetchError::Unauthorized),
            _ => Err(FetchError::RequestFailed(anyhow!(
                "unexpected response status code {code}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_url() {
        let base = Url::parse("https://shop.saas.appdynamics.com").unwrap();
        let url = build_request_url(
            &base,
            "shop app",
            "Overall Application Performance|Calls per Minute",
            3,
        )
        .unwrap();
        assert_eq!(
            url.path(),
            "/controller/rest/applications/shop%20app/metric-data"
        );

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("time-range-type".to_string(), "BEFORE_NOW".to_string()),
                ("duration-in-mins".to_string(), "3".to_string()),
                ("rollup".to_string(), "false".to_string()),
                (
                    "metric-path".to_string(),
                    "Overall Application Performance|Calls per Minute".to_string()
                ),
                ("output".to_string(), "json".to_string()),
            ]
        );
    }

    #[test]
    fn request_url_with_base_path() {
        let base = Url::parse("http://127.0.0.1:8090/appd/").unwrap();
        let url = build_request_url(&base, "a/b", "A|*", 2).unwrap();
        assert_eq!(
            url.path(),
            "/appd/controller/rest/applications/a%2Fb/metric-data"
        );
    }

    #[test]
    fn invalid_base() {
        let base = Url::parse("mailto:someone@example.net").unwrap();
        assert!(build_request_url(&base, "a", "A", 1).is_err());
    }
}
