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

// src/stats.rs
// Delivery statistics for the kiosk MQTT client.
//
// Lock-free counters shared between the event loop task and the
// publish path, snapshotted into ClientStats on demand.

use std::sync::atomic::{AtomicUsize, Ordering};

// ClientStats is a point-in-time snapshot of the client counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientStats {
    // connections counts successful CONNACKs, reconnects included.
    pub connections: usize,
    // received counts inbound publishes forwarded to the consumer.
    pub received: usize,
    // dropped counts inbound publishes discarded because the
    // consumer queue was full.
    pub dropped: usize,
    // published counts publishes accepted by the client.
    pub published: usize,
    // publish_failed counts publishes the client refused.
    pub publish_failed: usize,
    // bytes_published is the payload volume of accepted publishes.
    pub bytes_published: usize,
    // event_loop_errors counts failed polls of the rumqttc event loop.
    pub event_loop_errors: usize,
}

#[derive(Debug, Default)]
pub struct ClientStatsTracker {
    connections: AtomicUsize,
    received: AtomicUsize,
    dropped: AtomicUsize,
    published: AtomicUsize,
    publish_failed: AtomicUsize,
    bytes_published: AtomicUsize,
    event_loop_errors: AtomicUsize,
}

impl ClientStatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_connection(&self) {
        self.connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_published(&self, bytes: usize) {
        self.published.fetch_add(1, Ordering::Relaxed);
        self.bytes_published.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_publish_failed(&self) {
        self.publish_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_event_loop_error(&self) {
        self.event_loop_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn to_stats(&self) -> ClientStats {
        ClientStats {
            connections: self.connections.load(Ordering::Relaxed),
            received: self.received.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            published: self.published.load(Ordering::Relaxed),
            publish_failed: self.publish_failed.load(Ordering::Relaxed),
            bytes_published: self.bytes_published.load(Ordering::Relaxed),
            event_loop_errors: self.event_loop_errors.load(Ordering::Relaxed),
        }
    }
}
