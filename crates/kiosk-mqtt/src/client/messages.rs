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

// src/client/messages.rs
// Inbound message envelope handed from the event loop to the consumer.

use rumqttc::Publish;

// ReceivedMessage is a single inbound PUBLISH, reduced to the bits
// the consumer cares about. It is produced once by the event loop
// and consumed exactly once on the other side of the channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedMessage {
    // topic is the full MQTT topic the message was received on.
    pub topic: String,
    // payload contains the raw message bytes.
    pub payload: Vec<u8>,
}

impl ReceivedMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }

    pub fn payload_size(&self) -> usize {
        self.payload.len()
    }
}

impl From<&Publish> for ReceivedMessage {
    fn from(publish: &Publish) -> Self {
        Self {
            topic: publish.topic.clone(),
            payload: publish.payload.to_vec(),
        }
    }
}
