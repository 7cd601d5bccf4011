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

//! Home Assistant MQTT discovery: retained config documents that make the
//! kiosk show up as a device with sensors and controls.

use serde::Serialize;

use crate::config::{AgentConfig, DeviceInfo};
use crate::publisher::StatePublisher;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityConfig {
    pub name: String,
    pub unique_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_class: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_press: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_on: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_off: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<&'static str>,
    pub device: DeviceInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveryDocument {
    pub component: &'static str,
    pub object_id: String,
    pub config: EntityConfig,
}

impl DiscoveryDocument {
    pub fn topic(&self, prefix: &str) -> String {
        format!("{prefix}/{}/{}/config", self.component, self.object_id)
    }
}

struct Builder<'a> {
    id_prefix: &'a str,
    device: &'a DeviceInfo,
    docs: Vec<DiscoveryDocument>,
}

impl Builder<'_> {
    fn add(&mut self, component: &'static str, suffix: &str, name: &str, config: EntityConfig) {
        let object_id = format!("{}_{suffix}", self.id_prefix);
        self.docs.push(DiscoveryDocument {
            component,
            object_id: object_id.clone(),
            config: EntityConfig {
                name: name.to_string(),
                unique_id: object_id,
                device: self.device.clone(),
                ..config
            },
        });
    }

    fn sensor(
        &mut self,
        suffix: &str,
        name: &str,
        state_topic: &str,
        unit: Option<&'static str>,
        icon: Option<&'static str>,
    ) {
        self.add(
            "sensor",
            suffix,
            name,
            EntityConfig {
                state_topic: Some(state_topic.to_string()),
                unit_of_measurement: unit,
                icon,
                ..Default::default()
            },
        );
    }
}

/// Every discovery document for this device, in publish order.
pub fn documents(config: &AgentConfig) -> Vec<DiscoveryDocument> {
    let topics = &config.topics;
    let metrics = &config.telemetry.topics;
    let mut b = Builder {
        id_prefix: &config.discovery.object_id_prefix,
        device: &config.discovery.device,
        docs: Vec::with_capacity(13),
    };

    b.sensor("disk_total", "Pi Disk Total", &metrics.disk_total, Some("GB"), Some("mdi:harddisk"));
    b.sensor("disk_free_gb", "Pi Disk Free", &metrics.disk_free_gb, Some("GB"), Some("mdi:harddisk"));
    b.sensor("disk_free_pct", "Pi Disk Free %", &metrics.disk_free_pct, Some("%"), Some("mdi:harddisk"));
    b.sensor("cpu_load", "Pi CPU Load", &metrics.cpu_load, Some("%"), Some("mdi:chip"));
    b.add(
        "sensor",
        "cpu_temp",
        "Pi CPU Temperature",
        EntityConfig {
            state_topic: Some(metrics.cpu_temp.clone()),
            unit_of_measurement: Some("°C"),
            device_class: Some("temperature"),
            ..Default::default()
        },
    );
    b.sensor("wifi_ip", "Pi WiFi IP", &metrics.ip_address, None, Some("mdi:wifi"));
    b.sensor("memory_usage", "Pi Memory Usage", &metrics.memory_usage, Some("%"), Some("mdi:memory"));

    b.add(
        "text",
        "chromium_url",
        "Chromium URL",
        EntityConfig {
            command_topic: Some(topics.url_command.clone()),
            state_topic: Some(topics.url_state.clone()),
            max: Some(255.0),
            mode: Some("text"),
            ..Default::default()
        },
    );
    b.add(
        "button",
        "default_url",
        "Default URL",
        EntityConfig {
            command_topic: Some(topics.url_command.clone()),
            payload_press: Some(config.browser.default_url.clone()),
            ..Default::default()
        },
    );
    b.add(
        "switch",
        "display_power",
        "Pi Display Power",
        EntityConfig {
            command_topic: Some(topics.display_command.clone()),
            state_topic: Some(topics.display_state.clone()),
            payload_on: Some("ON"),
            payload_off: Some("OFF"),
            ..Default::default()
        },
    );
    b.add(
        "button",
        "refresh_website",
        "Refresh Website",
        EntityConfig {
            command_topic: Some(topics.refresh_command.clone()),
            payload_press: Some("REFRESH".to_string()),
            ..Default::default()
        },
    );
    b.add(
        "button",
        "restart",
        "Restart Raspberry Pi",
        EntityConfig {
            command_topic: Some(topics.restart_command.clone()),
            payload_press: Some("RESTART".to_string()),
            ..Default::default()
        },
    );
    b.add(
        "number",
        "screen_brightness",
        "Pi Screen Brightness",
        EntityConfig {
            command_topic: Some(topics.brightness_command.clone()),
            state_topic: Some(topics.brightness_state.clone()),
            min: Some(0.0),
            max: Some(1.0),
            step: Some(0.01),
            ..Default::default()
        },
    );
    b.docs
}

/// Publishes every document retained. Returns how many were accepted by
/// the client.
pub fn publish_discovery(publisher: &dyn StatePublisher, config: &AgentConfig) -> usize {
    let prefix = &config.discovery.prefix;
    let mut published = 0;
    for doc in documents(config) {
        let topic = doc.topic(prefix);
        let payload = match serde_json::to_string(&doc.config) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(topic, %err, "Failed to encode discovery document");
                continue;
            }
        };
        match publisher.publish(&topic, &payload, true) {
            Ok(()) => published += 1,
            Err(err) => tracing::warn!(topic, %err, "Failed to publish discovery document"),
        }
    }
    tracing::info!(published, "Published discovery documents");
    published
}
