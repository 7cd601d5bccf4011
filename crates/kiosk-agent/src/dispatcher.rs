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

//! Turns inbound command messages into local actions and state publishes.

use std::sync::Arc;

use kiosk_mqtt::ReceivedMessage;
use tokio::sync::{mpsc, watch};

use crate::command::{Command, CommandTopic};
use crate::config::TopicsConfig;
use crate::host::DeviceControl;
use crate::publisher::{StatePublisher, mirror};
use crate::state::{Brightness, DisplayPower, SharedState};
use crate::supervisor::BrowserSupervisor;

pub struct CommandDispatcher {
    topics: TopicsConfig,
    supervisor: BrowserSupervisor,
    device: Arc<dyn DeviceControl>,
    publisher: Arc<dyn StatePublisher>,
    state: SharedState,
}

impl CommandDispatcher {
    pub fn new(
        topics: TopicsConfig,
        supervisor: BrowserSupervisor,
        device: Arc<dyn DeviceControl>,
        publisher: Arc<dyn StatePublisher>,
        state: SharedState,
    ) -> Self {
        Self {
            topics,
            supervisor,
            device,
            publisher,
            state,
        }
    }

    pub fn supervisor(&self) -> &BrowserSupervisor {
        &self.supervisor
    }

    /// Handles one inbound message. Never fails: bad payloads are dropped
    /// and host failures are logged.
    pub async fn handle(&mut self, topic: &str, payload: &[u8]) {
        let Some(kind) = CommandTopic::classify(topic, &self.topics) else {
            tracing::debug!(topic, "Ignoring message on unknown topic");
            return;
        };
        let payload = String::from_utf8_lossy(payload);
        let payload = payload.trim();

        match Command::parse(kind, payload) {
            Ok(command) => self.execute(command).await,
            Err(err) => tracing::warn!(topic, payload, %err, "Dropping malformed command"),
        }
    }

    /// Points the browser at `target` and publishes the new target.
    /// Used for URL commands and for the startup launch.
    pub async fn launch(&mut self, target: &str) {
        tracing::info!(url = target, "Loading new URL");
        if let Err(err) = self.supervisor.launch(target).await {
            tracing::error!(url = target, %err, "Failed to start the browser");
        }
        self.state.lock().await.current_target = target.to_string();
        mirror(self.publisher.as_ref(), &self.topics.url_state, target);
    }

    async fn execute(&mut self, command: Command) {
        match command {
            Command::SetDisplay(power) => self.set_display(power).await,
            Command::Navigate(url) => self.launch(&url).await,
            Command::Refresh => {
                tracing::info!("Refreshing website");
                self.supervisor.refresh().await;
            }
            Command::Restart => {
                tracing::info!("Restarting the machine");
                if let Err(err) = self.device.reboot().await {
                    tracing::error!(%err, "Reboot failed");
                }
            }
            Command::SetBrightness(brightness) => self.set_brightness(brightness).await,
        }
    }

    async fn set_display(&mut self, power: DisplayPower) {
        if let Err(err) = self
            .device
            .set_display_power(power == DisplayPower::On)
            .await
        {
            tracing::warn!(%power, %err, "Display power command failed");
        } else {
            tracing::info!(%power, "Display power command executed");
        }
        self.state.lock().await.display = power;
        mirror(
            self.publisher.as_ref(),
            &self.topics.display_state,
            power.as_str(),
        );
    }

    async fn set_brightness(&mut self, brightness: Brightness) {
        if let Err(err) = self.device.set_brightness(brightness).await {
            tracing::warn!(%brightness, %err, "Brightness command failed");
        } else {
            tracing::info!(%brightness, "Brightness set");
        }
        self.state.lock().await.brightness = brightness;
        mirror(
            self.publisher.as_ref(),
            &self.topics.brightness_state,
            &brightness.to_string(),
        );
    }

    /// Handles messages in arrival order until the channel closes or the
    /// close signal fires.
    pub async fn run(
        &mut self,
        messages: &mut mpsc::Receiver<ReceivedMessage>,
        close_receiver: &mut watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = close_receiver.changed() => {
                    tracing::info!("Command dispatcher stopped");
                    break;
                }
                message = messages.recv() => {
                    let Some(message) = message else {
                        tracing::info!("Message channel closed, command dispatcher stopping");
                        break;
                    };
                    self.handle(&message.topic, &message.payload).await;
                }
            }
        }
    }
}
