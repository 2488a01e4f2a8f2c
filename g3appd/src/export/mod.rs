/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

use crate::types::DataPoint;

mod format;

mod signalfx;
pub use signalfx::SignalfxPointSender;

#[derive(Debug, Error)]
pub enum SendError {
    #[error("send failed: {0:?}")]
    SendFailed(anyhow::Error),
}

pub trait PointSender {
    /// Deliver a non-empty batch of data points.
    fn send(&self, points: Vec<DataPoint>) -> impl Future<Output = Result<(), SendError>> + Send;
}
