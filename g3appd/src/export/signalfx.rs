/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use anyhow::{Context, anyhow};
use curl::easy::{Easy, List};
use log::debug;
use url::Url;

use super::{PointSender, SendError, format};
use crate::config::SignalfxConfig;
use crate::types::DataPoint;

const DATAPOINT_API_PATH: &str = "v2/datapoint";

/// Send data points to the SignalFx ingest API.
pub struct SignalfxPointSender {
    config: Arc<SignalfxConfig>,
    api_url: Url,
}

impl SignalfxPointSender {
    pub fn new(config: Arc<SignalfxConfig>) -> anyhow::Result<Self> {
        let api_url = build_api_url(config.url())?;
        Ok(SignalfxPointSender { config, api_url })
    }
}

fn build_api_url(base: &Url) -> anyhow::Result<Url> {
    let mut url = base.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.join(DATAPOINT_API_PATH)
        .map_err(|e| anyhow!("invalid ingest url {base}: {e}"))
}

fn post_curl_blocking(config: &SignalfxConfig, url: &Url, body: &[u8]) -> anyhow::Result<()> {
    let mut easy = Easy::new();
    easy.timeout(config.timeout)
        .map_err(|e| anyhow!("failed to set timeout: {e}"))?;
    easy.connect_timeout(config.connect_timeout)
        .map_err(|e| anyhow!("failed to set connect timeout: {e}"))?;
    easy.url(url.as_str())
        .map_err(|e| anyhow!("failed to set url: {e}"))?;
    easy.post(true)
        .map_err(|e| anyhow!("failed to set post method: {e}"))?;
    easy.post_fields_copy(body)
        .map_err(|e| anyhow!("failed to set post body: {e}"))?;

    let mut headers = List::new();
    headers
        .append("Content-Type: application/json")
        .map_err(|e| anyhow!("failed to add content-type header: {e}"))?;
    headers
        .append(&format!("X-SF-Token: {}", config.token))
        .map_err(|e| anyhow!("failed to add token header: {e}"))?;
    easy.http_headers(headers)
        .map_err(|e| anyhow!("failed to set http headers: {e}"))?;

    let mut rsp_body = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| {
                rsp_body.extend_from_slice(data);
                Ok(data.len())
            })
            .map_err(|e| anyhow!("failed to set write callback function: {e}"))?;
        transfer
            .perform()
            .map_err(|e| anyhow!("curl failed: {e}"))?;
    }

    let code = easy
        .response_code()
        .map_err(|e| anyhow!("failed to get response code: {e}"))?;
    format::check_response(code, &rsp_body)
}

fn post_all_blocking(
    config: &SignalfxConfig,
    url: &Url,
    points: &[DataPoint],
) -> anyhow::Result<()> {
    let mut body = Vec::new();
    for (i, chunk) in points.chunks(config.max_body_points).enumerate() {
        body.clear();
        format::fill_body(chunk, &mut body);
        post_curl_blocking(config, url, &body)
            .context(format!("failed to send body #{i} with {} points", chunk.len()))?;
    }
    Ok(())
}

impl PointSender for SignalfxPointSender {
    async fn send(&self, points: Vec<DataPoint>) -> Result<(), SendError> {
        debug!("sending {} data points to {}", points.len(), self.api_url);

        let config = self.config.clone();
        let url = self.api_url.clone();
        tokio::task::spawn_blocking(move || post_all_blocking(&config, &url, &points))
            .await
            .map_err(|e| SendError::SendFailed(anyhow!("join blocking task error: {e}")))?
            .map_err(SendError::SendFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url() {
        let base = Url::parse("https://ingest.signalfx.com").unwrap();
        assert_eq!(
            build_api_url(&base).unwrap().as_str(),
            "https://ingest.signalfx.com/v2/datapoint"
        );

        let base = Url::parse("https://ingest.us1.signalfx.com/proxy").unwrap();
        assert_eq!(
            build_api_url(&base).unwrap().as_str(),
            "https://ingest.us1.signalfx.com/proxy/v2/datapoint"
        );
    }
}
