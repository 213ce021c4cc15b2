// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Remote processing stub — acknowledges an operation after a fixed simulated
// delay without transforming anything.

use std::time::Duration;

use blattwerk_core::{AppConfig, Operation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Delay for identifiers outside the known operation set.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(2000);

/// Fixed delay the stub waits before acknowledging `operation`.
pub fn simulated_latency(operation: &str) -> Duration {
    let millis = match operation.parse::<Operation>() {
        Ok(Operation::Compress) => 2000,
        Ok(Operation::Split) => 1500,
        Ok(Operation::Merge) => 3000,
        Ok(Operation::Delete) => 1000,
        Ok(Operation::Crop) => 1500,
        Ok(Operation::Convert) => 4000,
        Ok(Operation::WordToPdf) => 3500,
        Ok(Operation::Sign) => 2000,
        Err(_) => return DEFAULT_LATENCY,
    };
    Duration::from_millis(millis)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingRequest {
    pub operation: String,
    pub file_name: String,
    pub file_size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResponse {
    pub success: bool,
    pub message: String,
    pub file_name: String,
    pub file_size: u64,
    pub processed_at: DateTime<Utc>,
}

/// Stand-in for the hosted processing endpoint.
#[derive(Debug, Clone)]
pub struct RemoteProcessor {
    latency_scale: f64,
}

impl Default for RemoteProcessor {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl RemoteProcessor {
    /// `latency_scale` multiplies every simulated delay; zero, negative or
    /// non-finite values disable waiting.
    pub fn new(latency_scale: f64) -> Self {
        Self { latency_scale }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.latency_scale)
    }

    /// The delay this processor actually waits for `operation`.
    pub fn latency_for(&self, operation: &str) -> Duration {
        if !(self.latency_scale.is_finite() && self.latency_scale > 0.0) {
            return Duration::ZERO;
        }
        let secs = simulated_latency(operation).as_secs_f64() * self.latency_scale;
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Wait out the simulated delay, then acknowledge the request.
    #[instrument(skip(self, request), fields(operation = %request.operation, file = %request.file_name))]
    pub async fn process(&self, request: ProcessingRequest) -> ProcessingResponse {
        let delay = self.latency_for(&request.operation);
        debug!(delay_ms = delay.as_millis() as u64, "simulating remote processing");
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        info!("remote processing acknowledged");
        ProcessingResponse {
            success: true,
            message: format!("{} operation completed successfully", request.operation),
            file_name: request.file_name,
            file_size: request.file_size,
            processed_at: Utc::now(),
        }
    }
}
