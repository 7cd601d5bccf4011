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

use kiosk_mqtt::{MqttClient, MqttClientError};

/// Where state and telemetry go. Implemented by the MQTT client; tests
/// substitute a recorder.
pub trait StatePublisher: Send + Sync {
    fn publish(&self, topic: &str, payload: &str, retain: bool) -> Result<(), MqttClientError>;
}

impl StatePublisher for MqttClient {
    fn publish(&self, topic: &str, payload: &str, retain: bool) -> Result<(), MqttClientError> {
        MqttClient::publish(self, topic, payload, retain)
    }
}

/// Publishes a non-retained state value. A failed publish is logged and
/// otherwise ignored; the next mirror of the same value repairs it.
pub fn mirror(publisher: &dyn StatePublisher, topic: &str, payload: &str) {
    match publisher.publish(topic, payload, false) {
        Ok(()) => tracing::debug!(topic, payload, "Published state"),
        Err(err) => tracing::warn!(topic, %err, "Failed to publish state"),
    }
}
