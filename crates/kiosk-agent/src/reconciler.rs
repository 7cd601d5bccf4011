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

//! Notices display power changes nobody commanded (screen savers, someone
//! pressing the monitor's button) and reports them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::host::DeviceControl;
use crate::publisher::{StatePublisher, mirror};
use crate::state::{DisplayPower, SharedState};

pub struct DisplayReconciler {
    device: Arc<dyn DeviceControl>,
    publisher: Arc<dyn StatePublisher>,
    state: SharedState,
    topic: String,
    last: Option<DisplayPower>,
}

impl DisplayReconciler {
    pub fn new(
        device: Arc<dyn DeviceControl>,
        publisher: Arc<dyn StatePublisher>,
        state: SharedState,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            device,
            publisher,
            state,
            topic: topic.into(),
            last: None,
        }
    }

    async fn sample(&self) -> DisplayPower {
        match self.device.display_power().await {
            Ok(power) => power,
            Err(err) => {
                tracing::warn!(%err, "Failed to query display power");
                DisplayPower::Unknown
            }
        }
    }

    /// Samples once and publishes unconditionally.
    pub async fn seed(&mut self) -> DisplayPower {
        let power = self.sample().await;
        self.record(power).await;
        mirror(self.publisher.as_ref(), &self.topic, power.as_str());
        power
    }

    /// Samples once and publishes only if the value differs from the last
    /// sample. Returns whether it published.
    pub async fn tick(&mut self) -> bool {
        let power = self.sample().await;
        let changed = self.last != Some(power);
        self.record(power).await;
        if changed {
            tracing::info!(%power, "Display state changed");
            mirror(self.publisher.as_ref(), &self.topic, power.as_str());
        }
        changed
    }

    async fn record(&mut self, power: DisplayPower) {
        self.last = Some(power);
        self.state.lock().await.display = power;
    }

    pub async fn run(&mut self, period: Duration, close_receiver: &mut watch::Receiver<bool>) {
        self.seed().await;

        let mut interval = tokio::time::interval(period);
        // The first tick completes immediately and seed() already sampled.
        interval.tick().await;
        loop {
            tokio::select! {
                biased;
                _ = close_receiver.changed() => {
                    tracing::info!("Display reconciler stopped");
                    break;
                }
                _ = interval.tick() => {
                    self.tick().await;
                }
            }
        }
    }
}
