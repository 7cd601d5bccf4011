/*
 * SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: LicenseRef-NvidiaProprietary
 *
 * NVIDIA CORPORATION, its affiliates and licensors retain all intellectual
 * property and proprietary rights in and to this material, related
 * documentation and any modifications thereto. Any use, reproduction,
 * disclosure or distribution of this material and related documentation
 * without an express license agreement from NVIDIA CORPORATION or
 * its affiliates is strictly prohibited.
 */

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;

use super::probe::MachineProbe;
use crate::config::{MetricTopics, TopicsConfig};
use crate::publisher::{StatePublisher, mirror};
use crate::state::SharedState;

/// One gathering of every metric. Readings that failed hold their zero
/// value, the address holds "unknown".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub disk_total_gb: f64,
    pub disk_free_gb: f64,
    pub disk_free_pct: f64,
    pub cpu_load_pct: f64,
    pub cpu_temp_c: f64,
    pub ip_address: String,
    pub memory_usage_pct: f64,
}

fn or_zero<E: std::fmt::Display>(metric: &str, reading: Result<f64, E>) -> f64 {
    reading.unwrap_or_else(|err| {
        tracing::warn!(metric, %err, "Metric unavailable, reporting 0");
        0.0
    })
}

impl TelemetrySnapshot {
    pub async fn gather(probe: &dyn MachineProbe) -> Self {
        let (disk_total_gb, disk_free_gb, disk_free_pct) = match probe.disk_usage().await {
            Ok(disk) => (disk.total_gb(), disk.free_gb(), disk.free_percent()),
            Err(err) => {
                tracing::warn!(%err, "Disk usage unavailable, reporting 0");
                (0.0, 0.0, 0.0)
            }
        };
        Self {
            disk_total_gb,
            disk_free_gb,
            disk_free_pct,
            cpu_load_pct: or_zero("cpu_load", probe.cpu_load_percent().await),
            cpu_temp_c: or_zero("cpu_temp", probe.cpu_temperature().await),
            ip_address: probe.ip_address().await,
            memory_usage_pct: or_zero("memory_usage", probe.memory_usage_percent().await),
        }
    }

    /// Topic and formatted payload for every metric, in publish order.
    pub fn payloads<'a>(&self, topics: &'a MetricTopics) -> Vec<(&'a str, String)> {
        vec![
            (topics.disk_total.as_str(), format!("{:.1}", self.disk_total_gb)),
            (topics.disk_free_gb.as_str(), format!("{:.1}", self.disk_free_gb)),
            (topics.disk_free_pct.as_str(), format!("{:.0}", self.disk_free_pct)),
            (topics.cpu_load.as_str(), format!("{:.2}", self.cpu_load_pct)),
            (topics.cpu_temp.as_str(), format!("{:.1}", self.cpu_temp_c)),
            (topics.ip_address.as_str(), self.ip_address.clone()),
            (topics.memory_usage.as_str(), format!("{:.2}", self.memory_usage_pct)),
        ]
    }
}

pub struct TelemetryPublisher {
    probe: Arc<dyn MachineProbe>,
    publisher: Arc<dyn StatePublisher>,
    state: SharedState,
    metric_topics: MetricTopics,
    topics: TopicsConfig,
}

impl TelemetryPublisher {
    pub fn new(
        probe: Arc<dyn MachineProbe>,
        publisher: Arc<dyn StatePublisher>,
        state: SharedState,
        metric_topics: MetricTopics,
        topics: TopicsConfig,
    ) -> Self {
        Self {
            probe,
            publisher,
            state,
            metric_topics,
            topics,
        }
    }

    /// Publishes every metric, then mirrors the URL and brightness state.
    pub async fn tick(&self) -> TelemetrySnapshot {
        let snapshot = TelemetrySnapshot::gather(self.probe.as_ref()).await;
        for (topic, payload) in snapshot.payloads(&self.metric_topics) {
            mirror(self.publisher.as_ref(), topic, &payload);
        }

        let (target, brightness) = {
            let state = self.state.lock().await;
            (state.current_target.clone(), state.brightness)
        };
        mirror(self.publisher.as_ref(), &self.topics.url_state, &target);
        mirror(
            self.publisher.as_ref(),
            &self.topics.brightness_state,
            &brightness.to_string(),
        );
        tracing::info!("Published system stats");
        snapshot
    }

    /// Ticks immediately, then every `period`.
    pub async fn run(&self, period: Duration, close_receiver: &mut watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(period);
        loop {
            tokio::select! {
                biased;
                _ = close_receiver.changed() => {
                    tracing::info!("Telemetry publisher stopped");
                    break;
                }
                _ = interval.tick() => {
                    self.tick().await;
                }
            }
        }
    }
}
