/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::Instant;

use anyhow::{Context, anyhow};
use cadence::{BufferedUdpMetricSink, Gauged, StatsdClient};
use log::warn;

use crate::config::StatConfig;
use crate::sync::SyncStats;

fn build_statsd_client(config: &StatConfig) -> anyhow::Result<StatsdClient> {
    let addr: SocketAddr = config
        .target
        .to_socket_addrs()
        .map_err(|e| anyhow!("invalid statsd target {}: {e}", config.target))?
        .next()
        .ok_or_else(|| anyhow!("no address resolved for statsd target {}", config.target))?;
    let bind: SocketAddr = if addr.is_ipv4() {
        SocketAddr::from(([0, 0, 0, 0], 0))
    } else {
        SocketAddr::from(([0u16; 8], 0))
    };
    let socket = UdpSocket::bind(bind).map_err(|e| anyhow!("failed to bind udp socket: {e}"))?;
    let sink = BufferedUdpMetricSink::with_capacity(addr, socket, 1024)
        .map_err(|e| anyhow!("failed to create udp sink: {e}"))?;

    let start_instant = Instant::now();
    let last_report_slice = AtomicU64::new(u64::MAX);
    let client = StatsdClient::builder(&config.prefix, sink)
        .with_error_handler(move |e| {
            let time_slice = start_instant.elapsed().as_secs() >> 6; // every 64s
            if last_report_slice.swap(time_slice, Ordering::Relaxed) != time_slice {
                warn!("sending metrics error: {e:?}");
            }
        })
        .build();
    Ok(client)
}

fn emit_stats(client: &StatsdClient, s: &SyncStats) {
    macro_rules! emit_gauge {
        ($get:ident, $name:literal) => {
            client
                .gauge_with_tags(concat!("sync.", $name), s.$get())
                .send();
        };
    }

    emit_gauge!(get_request_failures, "request_failures");
    emit_gauge!(get_series_reported, "series_reported");
    emit_gauge!(get_series_empty, "series_empty");
    emit_gauge!(get_data_points_reported, "data_points_reported");
}

pub fn spawn_working_thread(
    config: StatConfig,
    stats: Arc<SyncStats>,
) -> anyhow::Result<JoinHandle<()>> {
    let client = build_statsd_client(&config).context("failed to build statsd client")?;

    let handle = std::thread::Builder::new()
        .name("stat-main".to_string())
        .spawn(move || {
            loop {
                let instant_start = Instant::now();

                emit_stats(&client, &stats);
                let _ = client.flush();

                let elapsed = instant_start.elapsed();
                if let Some(left) = config.emit_interval.checked_sub(elapsed) {
                    std::thread::sleep(left);
                }
            }
        })
        .map_err(|e| anyhow!("failed to spawn thread: {e:?}"))?;
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence::SpyMetricSink;

    #[test]
    fn emit() {
        let stats = SyncStats::default();
        stats.add_series_reported(3);
        stats.add_data_points_reported(7);

        let (rx, sink) = SpyMetricSink::new();
        let client = StatsdClient::from_sink("g3appd", sink);
        emit_stats(&client, &stats);

        let lines: Vec<String> = rx
            .try_iter()
            .map(|v| String::from_utf8(v).unwrap())
            .collect();
        assert_eq!(
            lines,
            vec![
                "g3appd.sync.request_failures:0|g",
                "g3appd.sync.series_reported:3|g",
                "g3appd.sync.series_empty:0|g",
                "g3appd.sync.data_points_reported:7|g",
            ]
        );
    }
}
