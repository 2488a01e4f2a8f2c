/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

/// Wait for a quit signal: ctrl-c, or SIGTERM on unix.
pub async fn wait_quit() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use anyhow::anyhow;
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate())
            .map_err(|e| anyhow!("failed to install SIGTERM handler: {e}"))?;
        tokio::select! {
            r = tokio::signal::ctrl_c() => r.map_err(|e| anyhow!("failed to wait ctrl-c: {e}")),
            _ = term.recv() => Ok(()),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .map_err(|e| anyhow::anyhow!("failed to wait ctrl-c: {e}"))
    }
}
