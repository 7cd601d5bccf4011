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

// src/client/options.rs
// Configuration options for the kiosk MQTT client.
use rumqttc::QoS;
use tokio::time::Duration;

pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(60);
pub const DEFAULT_MESSAGE_CHANNEL_CAPACITY: usize = 64;
pub const DEFAULT_CLIENT_QUEUE_SIZE: usize = 128;
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_QOS: QoS = QoS::AtMostOnce;

// ClientOptions are optional parameters that can be passed to the
// client, all of which have const fallbacks via the resolved_*
// accessors below.
#[derive(Clone, Debug, Default)]
pub struct ClientOptions {
    // keep_alive sets the keepalive to use for MQTT broker connections.
    // Defaults to DEFAULT_KEEP_ALIVE.
    pub keep_alive: Option<Duration>,
    // message_channel_capacity is the number of requests the rumqttc
    // AsyncClient buffers towards the event loop.
    // Defaults to DEFAULT_MESSAGE_CHANNEL_CAPACITY.
    pub message_channel_capacity: Option<usize>,
    // client_queue_size limits how many inbound messages can sit
    // between the event loop and the consumer before we start
    // dropping them. Defaults to DEFAULT_CLIENT_QUEUE_SIZE.
    pub client_queue_size: Option<usize>,
    // reconnect_delay is the fixed pause between a failed event loop
    // poll and the next one. rumqttc reconnects on the next poll.
    // Defaults to DEFAULT_RECONNECT_DELAY.
    pub reconnect_delay: Option<Duration>,
    // qos is used for every subscribe and publish issued by the client.
    // Defaults to DEFAULT_QOS (at most once).
    pub qos: Option<QoS>,
    // credentials are optional username/password credentials that
    // are passed through to the broker as-is.
    pub credentials: Option<ClientCredentials>,
}

impl ClientOptions {
    pub fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = Some(keep_alive);
        self
    }

    pub fn with_message_channel_capacity(mut self, capacity: usize) -> Self {
        self.message_channel_capacity = Some(capacity);
        self
    }

    pub fn with_client_queue_size(mut self, size: usize) -> Self {
        self.client_queue_size = Some(size);
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = Some(delay);
        self
    }

    pub fn with_qos(mut self, qos: QoS) -> Self {
        self.qos = Some(qos);
        self
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(ClientCredentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    pub fn resolved_keep_alive(&self) -> Duration {
        self.keep_alive.unwrap_or(DEFAULT_KEEP_ALIVE)
    }

    pub fn resolved_message_channel_capacity(&self) -> usize {
        self.message_channel_capacity
            .unwrap_or(DEFAULT_MESSAGE_CHANNEL_CAPACITY)
    }

    // A zero-sized mpsc channel panics in tokio, so clamp to 1.
    pub fn resolved_client_queue_size(&self) -> usize {
        self.client_queue_size
            .unwrap_or(DEFAULT_CLIENT_QUEUE_SIZE)
            .max(1)
    }

    pub fn resolved_reconnect_delay(&self) -> Duration {
        self.reconnect_delay.unwrap_or(DEFAULT_RECONNECT_DELAY)
    }

    pub fn resolved_qos(&self) -> QoS {
        self.qos.unwrap_or(DEFAULT_QOS)
    }
}

// ClientCredentials are used for providing a username
// and password to the MQTT server.
#[derive(Clone)]
pub struct ClientCredentials {
    pub username: String,
    pub password: String,
}

// Keep passwords out of logs; options get logged at startup.
impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
