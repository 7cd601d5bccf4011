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

// src/errors.rs
// Error types for the kiosk-mqtt client.

use thiserror::Error;

// MqttClientError covers everything the transport can fail at. Callers
// mostly just log these; the categorization helpers exist so they can
// pick a log level without matching on every variant.
#[derive(Error, Debug)]
pub enum MqttClientError {
    // ConnectionError wraps request failures from the rumqttc AsyncClient,
    // which happen when the request channel to the event loop is gone.
    #[error("MQTT client request failed: {0}")]
    ConnectionError(#[from] rumqttc::ClientError),

    // AlreadyConnected is returned when connect() is called a second time;
    // the event loop can only be driven by a single task.
    #[error("MQTT client is already connected")]
    AlreadyConnected,

    // InvalidOptions is returned when the provided ClientOptions
    // can't be turned into a usable rumqttc configuration.
    #[error("Invalid MQTT client options: {0}")]
    InvalidOptions(String),

    // InvalidTopic is returned for empty topics or publish topics
    // that contain wildcards.
    #[error("Invalid MQTT topic '{topic}': {reason}")]
    InvalidTopic { topic: String, reason: String },
}

impl MqttClientError {
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::ConnectionError(_) | Self::AlreadyConnected)
    }

    pub fn is_topic_error(&self) -> bool {
        matches!(self, Self::InvalidTopic { .. })
    }

    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::InvalidOptions(_))
    }
}

// invalid_topic_error is a small constructor to keep call sites terse.
pub fn invalid_topic_error(topic: &str, reason: impl Into<String>) -> MqttClientError {
    MqttClientError::InvalidTopic {
        topic: topic.to_string(),
        reason: reason.into(),
    }
}

// validate_publish_topic rejects topics that a broker would refuse for
// a PUBLISH packet: empty ones and ones carrying subscription wildcards.
pub fn validate_publish_topic(topic: &str) -> Result<(), MqttClientError> {
    if topic.is_empty() {
        return Err(invalid_topic_error(topic, "topic is empty"));
    }
    if topic.contains(['+', '#']) {
        return Err(invalid_topic_error(
            topic,
            "wildcards are not allowed in publish topics",
        ));
    }
    Ok(())
}
