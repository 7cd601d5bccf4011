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

// src/client/core.rs
// The kiosk MQTT client: a rumqttc AsyncClient plus the task that
// drives its EventLoop.
//
// Inbound publishes are not delivered through callbacks. The event loop
// task forwards them over a bounded mpsc channel to a single consumer,
// which keeps arrival order and keeps rumqttc's threading out of the
// consumer's business. Subscriptions are remembered and re-issued on
// every CONNACK, and each successful connection bumps a watch counter
// so callers can re-announce themselves (e.g. retained discovery).

use std::sync::Arc;

use rumqttc::{
    AsyncClient, ConnAck, ConnectReturnCode, Event, EventLoop, MqttOptions, Outgoing, Packet,
    SubscribeFilter,
};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, RwLock, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Duration, timeout};
use tracing::{debug, info, trace, warn};

use crate::client::messages::ReceivedMessage;
use crate::client::options::ClientOptions;
use crate::errors::{MqttClientError, invalid_topic_error, validate_publish_topic};
use crate::stats::{ClientStats, ClientStatsTracker};

// rumqttc asserts on keepalives below this, so reject them up front.
const MIN_KEEP_ALIVE: Duration = Duration::from_secs(5);

// How long disconnect() waits for the event loop to wind down.
const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct MqttClient {
    client: AsyncClient,
    // event_loop is taken by connect(); None afterwards.
    event_loop: Mutex<Option<EventLoop>>,
    event_loop_handle: Mutex<Option<JoinHandle<()>>>,
    subscriptions: RwLock<Vec<String>>,
    options: ClientOptions,
    stats: ClientStatsTracker,
    // connection_tx counts successful connections (CONNACK success).
    connection_tx: watch::Sender<usize>,
}

impl MqttClient {
    // new builds the client without touching the network. Nothing
    // happens on the wire until connect() starts the event loop.
    pub fn new(
        host: &str,
        port: u16,
        client_id: &str,
        options: Option<ClientOptions>,
    ) -> Result<Arc<Self>, MqttClientError> {
        let options = options.unwrap_or_default();
        if host.is_empty() {
            return Err(MqttClientError::InvalidOptions(
                "broker host is empty".to_string(),
            ));
        }
        if client_id.is_empty() || client_id.starts_with(' ') {
            return Err(MqttClientError::InvalidOptions(format!(
                "invalid client id '{client_id}'"
            )));
        }
        if options.resolved_keep_alive() < MIN_KEEP_ALIVE {
            return Err(MqttClientError::InvalidOptions(format!(
                "keep alive must be at least {MIN_KEEP_ALIVE:?}"
            )));
        }

        let mut mqtt_options = MqttOptions::new(client_id, host, port);
        mqtt_options.set_keep_alive(options.resolved_keep_alive());
        if let Some(credentials) = &options.credentials {
            mqtt_options.set_credentials(
                credentials.username.clone(),
                credentials.password.clone(),
            );
        }

        let (client, event_loop) =
            AsyncClient::new(mqtt_options, options.resolved_message_channel_capacity());
        let (connection_tx, _) = watch::channel(0);

        Ok(Arc::new(Self {
            client,
            event_loop: Mutex::new(Some(event_loop)),
            event_loop_handle: Mutex::new(None),
            subscriptions: RwLock::new(Vec::new()),
            options,
            stats: ClientStatsTracker::new(),
            connection_tx,
        }))
    }

    // subscribe_many registers topic filters. They are sent on every
    // CONNACK; if we are already connected they are also sent right away.
    pub async fn subscribe_many<I, S>(&self, topics: I) -> Result<(), MqttClientError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let topics: Vec<String> = topics.into_iter().map(Into::into).collect();
        if let Some(empty) = topics.iter().find(|t| t.is_empty()) {
            return Err(invalid_topic_error(empty, "topic is empty"));
        }

        {
            let mut subscriptions = self.subscriptions.write().await;
            for topic in &topics {
                if !subscriptions.contains(topic) {
                    subscriptions.push(topic.clone());
                }
            }
        }

        if *self.connection_tx.borrow() > 0 && !topics.is_empty() {
            let qos = self.options.resolved_qos();
            self.client
                .subscribe_many(topics.into_iter().map(|t| SubscribeFilter::new(t, qos)))
                .await?;
        }
        Ok(())
    }

    pub async fn subscriptions(&self) -> Vec<String> {
        self.subscriptions.read().await.clone()
    }

    // publish hands a message to the event loop without waiting for
    // room in the request channel; a full channel is an error rather
    // than a stall of the caller.
    pub fn publish(
        &self,
        topic: &str,
        payload: impl Into<Vec<u8>>,
        retain: bool,
    ) -> Result<(), MqttClientError> {
        validate_publish_topic(topic)?;
        let payload = payload.into();
        let size = payload.len();
        match self
            .client
            .try_publish(topic, self.options.resolved_qos(), retain, payload)
        {
            Ok(()) => {
                self.stats.record_published(size);
                trace!(topic, size, retain, "Queued MQTT publish");
                Ok(())
            }
            Err(err) => {
                self.stats.record_publish_failed();
                Err(err.into())
            }
        }
    }

    // connect starts the event loop task and returns the receiving end
    // of the inbound message channel. Can only be called once.
    pub async fn connect(
        self: &Arc<Self>,
    ) -> Result<mpsc::Receiver<ReceivedMessage>, MqttClientError> {
        let event_loop = self
            .event_loop
            .lock()
            .await
            .take()
            .ok_or(MqttClientError::AlreadyConnected)?;
        let (tx, rx) = mpsc::channel(self.options.resolved_client_queue_size());

        let client = Arc::clone(self);
        let handle = tokio::spawn(async move { client.run_event_loop(event_loop, tx).await });
        *self.event_loop_handle.lock().await = Some(handle);
        Ok(rx)
    }

    // connection_events yields a new value every time the broker
    // accepts a connection, reconnects included.
    pub fn connection_events(&self) -> watch::Receiver<usize> {
        self.connection_tx.subscribe()
    }

    pub fn stats(&self) -> ClientStats {
        self.stats.to_stats()
    }

    // disconnect sends DISCONNECT and waits a bounded amount of time
    // for the event loop to notice. If it doesn't (e.g. the broker was
    // never reachable), the task is aborted.
    pub async fn disconnect(&self) -> Result<(), MqttClientError> {
        let sent = self.client.try_disconnect();
        if let Some(mut handle) = self.event_loop_handle.lock().await.take() {
            if timeout(DISCONNECT_TIMEOUT, &mut handle).await.is_err() {
                warn!("MQTT event loop did not stop after disconnect, aborting it");
                handle.abort();
            }
        }
        sent.map_err(MqttClientError::from)
    }

    // resubscribe re-issues every remembered filter. The broker starts
    // each clean session without them, so this must not give up when the
    // request channel is full of publishes queued while we were offline.
    // The SUBSCRIBE is sent from its own task: this one has to keep
    // polling to drain the channel and make room for it.
    async fn resubscribe(&self) {
        let qos = self.options.resolved_qos();
        let filters: Vec<SubscribeFilter> = self
            .subscriptions
            .read()
            .await
            .iter()
            .map(|topic| SubscribeFilter::new(topic.clone(), qos))
            .collect();
        if filters.is_empty() {
            return;
        }
        let count = filters.len();
        let client = self.client.clone();
        tokio::spawn(async move {
            match client.subscribe_many(filters).await {
                Ok(()) => debug!(count, "Subscribed to command topics"),
                Err(err) => warn!(error = %err, "Failed to subscribe after connect"),
            }
        });
    }

    async fn run_event_loop(
        self: Arc<Self>,
        mut event_loop: EventLoop,
        tx: mpsc::Sender<ReceivedMessage>,
    ) {
        let reconnect_delay = self.options.resolved_reconnect_delay();
        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(ConnAck {
                    code: ConnectReturnCode::Success,
                    session_present,
                }))) => {
                    info!(session_present, "MQTT connected");
                    self.stats.record_connection();
                    self.resubscribe().await;
                    self.connection_tx.send_modify(|count| *count += 1);
                }
                Ok(Event::Incoming(Packet::ConnAck(ConnAck { code, .. }))) => {
                    warn!(?code, "MQTT broker rejected connection");
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let message = ReceivedMessage::from(&publish);
                    debug!(
                        topic = %message.topic,
                        size = message.payload_size(),
                        "Received MQTT message"
                    );
                    match tx.try_send(message) {
                        Ok(()) => self.stats.record_received(),
                        Err(TrySendError::Full(message)) => {
                            self.stats.record_dropped();
                            warn!(topic = %message.topic, "Inbound queue full, dropping message");
                        }
                        Err(TrySendError::Closed(_)) => {
                            info!("Inbound message consumer is gone, stopping MQTT event loop");
                            break;
                        }
                    }
                }
                Ok(Event::Incoming(Packet::Disconnect)) => {
                    // rumqttc reconnects on the next poll
                    warn!("MQTT broker sent disconnect");
                }
                Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                    info!("MQTT client disconnected");
                    break;
                }
                Ok(event) => {
                    trace!(?event, "MQTT event");
                }
                Err(err) => {
                    self.stats.record_event_loop_error();
                    warn!(error = %err, delay = ?reconnect_delay, "MQTT event loop error, polling again after delay");
                    tokio::time::sleep(reconnect_delay).await;
                }
            }
        }
    }
}
