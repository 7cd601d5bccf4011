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

use std::sync::Arc;
use std::time::Duration;

use eyre::WrapErr;
use kiosk_mqtt::{ClientOptions, MqttClient};
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::command;
use crate::config::AgentConfig;
use crate::discovery::publish_discovery;
use crate::dispatcher::CommandDispatcher;
use crate::host::{DeviceControl, LocalSpawner, X11Device};
use crate::publisher::StatePublisher;
use crate::reconciler::DisplayReconciler;
use crate::state::DeviceState;
use crate::supervisor::BrowserSupervisor;
use crate::telemetry::{LinuxProbe, TelemetryPublisher};

// How long each task gets to notice the close signal on shutdown.
const TASK_STOP_TIMEOUT: Duration = Duration::from_secs(5);

pub fn client_options(config: &AgentConfig) -> ClientOptions {
    let mqtt = &config.mqtt;
    let mut options = ClientOptions::default()
        .with_keep_alive(Duration::from_secs(mqtt.keep_alive_secs))
        .with_reconnect_delay(Duration::from_secs(mqtt.reconnect_delay_secs))
        .with_client_queue_size(mqtt.queue_size);
    // A password without a username means nothing to the broker.
    if let Some(username) = &mqtt.username {
        let password = mqtt.password.clone().unwrap_or_default();
        options = options.with_credentials(username, password);
    }
    options
}

pub async fn setup_and_run(config: AgentConfig) -> eyre::Result<()> {
    let client = MqttClient::new(
        &config.mqtt.host,
        config.mqtt.port,
        &config.mqtt.client_id,
        Some(client_options(&config)),
    )
    .wrap_err("invalid MQTT client settings")?;
    client
        .subscribe_many(command::subscriptions(&config.topics))
        .await?;
    let mut connections = client.connection_events();
    let mut messages = client.connect().await?;
    tracing::info!(
        host = %config.mqtt.host,
        port = config.mqtt.port,
        "MQTT event loop started"
    );

    let publisher: Arc<dyn StatePublisher> = client.clone();
    let device: Arc<dyn DeviceControl> = Arc::new(X11Device::new(&config));
    let spawner = Arc::new(LocalSpawner::new(
        config.display.x_display.clone(),
        config.host.command_timeout(),
    ));
    let state = DeviceState::shared(config.browser.default_url.clone());

    let (close_sender, close_receiver) = watch::channel(false);
    let mut tasks: Vec<(&str, JoinHandle<()>)> = Vec::new();

    // Discovery goes out again on every reconnect, the broker may have
    // lost retained messages in between.
    if config.discovery.enabled {
        let publisher = publisher.clone();
        let config = config.clone();
        let mut close_receiver = close_receiver.clone();
        tasks.push((
            "discovery",
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        biased;
                        _ = close_receiver.changed() => break,
                        changed = connections.changed() => {
                            if changed.is_err() {
                                break;
                            }
                            publish_discovery(publisher.as_ref(), &config);
                        }
                    }
                }
            }),
        ));
    }

    let mut reconciler = DisplayReconciler::new(
        device.clone(),
        publisher.clone(),
        state.clone(),
        config.topics.display_state.clone(),
    );
    let poll = config.period.display_poll();
    let mut rx = close_receiver.clone();
    tasks.push((
        "reconciler",
        tokio::spawn(async move { reconciler.run(poll, &mut rx).await }),
    ));

    let telemetry = TelemetryPublisher::new(
        Arc::new(LinuxProbe::new(&config)),
        publisher.clone(),
        state.clone(),
        config.telemetry.topics.clone(),
        config.topics.clone(),
    );
    let period = config.period.telemetry();
    let mut rx = close_receiver.clone();
    tasks.push((
        "telemetry",
        tokio::spawn(async move { telemetry.run(period, &mut rx).await }),
    ));

    let supervisor = BrowserSupervisor::new(spawner, device.clone(), config.browser.clone());
    let mut dispatcher = CommandDispatcher::new(
        config.topics.clone(),
        supervisor,
        device,
        publisher,
        state,
    );
    let default_url = config.browser.default_url.clone();
    let mut rx = close_receiver;
    tasks.push((
        "dispatcher",
        tokio::spawn(async move {
            dispatcher.launch(&default_url).await;
            dispatcher.run(&mut messages, &mut rx).await
        }),
    ));

    wait_for_shutdown_signal().await?;

    let _ = close_sender.send(true);
    for (name, mut handle) in tasks {
        match tokio::time::timeout(TASK_STOP_TIMEOUT, &mut handle).await {
            Ok(Ok(())) => tracing::debug!(task = name, "Task stopped"),
            Ok(Err(err)) => tracing::error!(task = name, %err, "Task failed"),
            Err(_) => {
                tracing::warn!(task = name, "Task did not stop in time, aborting it");
                handle.abort();
            }
        }
    }

    let stats = client.stats();
    tracing::info!(?stats, "Disconnecting from MQTT broker");
    if let Err(err) = client.disconnect().await {
        tracing::warn!(%err, "MQTT disconnect failed");
    }
    Ok(())
}

async fn wait_for_shutdown_signal() -> eyre::Result<()> {
    let mut term_signal = signal(SignalKind::terminate())?;
    tokio::select! {
        biased;
        _ = term_signal.recv() => {
            tracing::info!("TERM signal received, shutting down");
        }
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("Interrupted, shutting down");
        }
    }
    Ok(())
}
