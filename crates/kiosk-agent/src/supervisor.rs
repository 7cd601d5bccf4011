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

//! Keeps exactly one kiosk browser alive and points it at a target.

use std::sync::Arc;

use crate::config::BrowserConfig;
use crate::error::HostError;
use crate::host::{DeviceControl, KioskProcess, ProcessSpawner};

struct Running {
    process: Box<dyn KioskProcess>,
    target: String,
}

/// Owns the kiosk browser process.
///
/// Every `launch` replaces the running browser instead of starting a second
/// one. Exits of the browser that we did not cause go unnoticed until the
/// next launch.
pub struct BrowserSupervisor {
    spawner: Arc<dyn ProcessSpawner>,
    device: Arc<dyn DeviceControl>,
    config: BrowserConfig,
    current: Option<Running>,
}

impl BrowserSupervisor {
    pub fn new(
        spawner: Arc<dyn ProcessSpawner>,
        device: Arc<dyn DeviceControl>,
        config: BrowserConfig,
    ) -> Self {
        Self {
            spawner,
            device,
            config,
            current: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    /// Target of the browser we last spawned successfully.
    pub fn target(&self) -> Option<&str> {
        self.current.as_ref().map(|r| r.target.as_str())
    }

    /// Stops the current browser, if any, and starts a new one on `target`.
    ///
    /// Stopping never fails the launch: when every way of stopping the old
    /// browser fails we log it and spawn anyway. The only error returned is
    /// a failure to spawn, after which no browser is tracked.
    pub async fn launch(&mut self, target: &str) -> Result<(), HostError> {
        self.stop_current().await;

        let mut args = self.config.args.clone();
        args.push(target.to_string());
        let process = self.spawner.spawn(&self.config.program, &args).await?;
        tracing::info!(url = target, pid = process.id(), "Browser launched");
        self.current = Some(Running {
            process,
            target: target.to_string(),
        });
        Ok(())
    }

    /// Reloads the page, bypassing the cache. Failures are only logged.
    pub async fn refresh(&self) {
        match self
            .device
            .send_keys_to_window(&self.config.window_class, &self.config.refresh_keys)
            .await
        {
            Ok(()) => tracing::info!(keys = %self.config.refresh_keys, "Browser refreshed"),
            Err(err) => tracing::warn!(%err, "Browser refresh failed"),
        }
    }

    async fn stop_current(&mut self) {
        let Some(mut running) = self.current.take() else {
            return;
        };
        let grace = self.config.terminate_timeout();

        let err = match running.process.terminate(grace).await {
            Ok(()) => return,
            Err(err) => err,
        };
        tracing::warn!(%err, url = %running.target, "Browser did not exit on SIGTERM, killing it");

        let err = match running.process.kill().await {
            Ok(()) => return,
            Err(err) => err,
        };
        tracing::warn!(%err, "Killing the tracked browser failed, killing by name");

        if let Err(err) = self.spawner.kill_by_name(&self.config.program).await {
            tracing::error!(%err, "Could not stop the old browser, starting the new one anyway");
        }
    }
}
