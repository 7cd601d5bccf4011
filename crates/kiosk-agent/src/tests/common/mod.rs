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

//! Recording fakes for the host traits and the publisher.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use kiosk_mqtt::MqttClientError;

use crate::config::AgentConfig;
use crate::dispatcher::CommandDispatcher;
use crate::error::HostError;
use crate::host::{DeviceControl, KioskProcess, ProcessSpawner};
use crate::publisher::StatePublisher;
use crate::state::{Brightness, DeviceState, DisplayPower, SharedState};
use crate::supervisor::BrowserSupervisor;
use crate::telemetry::probe::{DiskUsage, MachineProbe};

fn failed(what: &str) -> HostError {
    HostError::Probe(format!("{what} failed (test)"))
}

#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<(String, String, bool)>>,
}

impl RecordingPublisher {
    pub fn published(&self) -> Vec<(String, String)> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|(t, p, _)| (t.clone(), p.clone()))
            .collect()
    }

    pub fn retained(&self) -> Vec<String> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, _, retain)| *retain)
            .map(|(t, _, _)| t.clone())
            .collect()
    }

    pub fn on(&self, topic: &str) -> Vec<String> {
        self.published()
            .into_iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, p)| p)
            .collect()
    }

    pub fn clear(&self) {
        self.published.lock().unwrap().clear();
    }
}

impl StatePublisher for RecordingPublisher {
    fn publish(&self, topic: &str, payload: &str, retain: bool) -> Result<(), MqttClientError> {
        self.published
            .lock()
            .unwrap()
            .push((topic.to_string(), payload.to_string(), retain));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    SetDisplay(bool),
    SetBrightness(Brightness),
    SendKeys(String, String),
    Reboot,
}

/// Display power samples come from `samples` in order; `None` is a failed
/// query. Once drained it keeps answering `On`.
#[derive(Default)]
pub struct FakeDevice {
    pub calls: Mutex<Vec<DeviceCall>>,
    pub samples: Mutex<VecDeque<Option<DisplayPower>>>,
    pub fail_actions: AtomicBool,
}

impl FakeDevice {
    pub fn with_samples(samples: impl IntoIterator<Item = Option<DisplayPower>>) -> Self {
        Self {
            samples: Mutex::new(samples.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.calls.lock().unwrap().clone()
    }

    fn act(&self, call: DeviceCall) -> Result<(), HostError> {
        self.calls.lock().unwrap().push(call);
        if self.fail_actions.load(Ordering::SeqCst) {
            Err(failed("device action"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DeviceControl for FakeDevice {
    async fn display_power(&self) -> Result<DisplayPower, HostError> {
        match self.samples.lock().unwrap().pop_front() {
            Some(Some(power)) => Ok(power),
            Some(None) => Err(failed("xset -q")),
            None => Ok(DisplayPower::On),
        }
    }

    async fn set_display_power(&self, on: bool) -> Result<(), HostError> {
        self.act(DeviceCall::SetDisplay(on))
    }

    async fn set_brightness(&self, brightness: Brightness) -> Result<(), HostError> {
        self.act(DeviceCall::SetBrightness(brightness))
    }

    async fn send_keys_to_window(&self, window_class: &str, keys: &str) -> Result<(), HostError> {
        self.act(DeviceCall::SendKeys(window_class.to_string(), keys.to_string()))
    }

    async fn reboot(&self) -> Result<(), HostError> {
        self.act(DeviceCall::Reboot)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    Spawn { id: u32, args: Vec<String> },
    Terminate(u32),
    Kill(u32),
    KillByName(String),
}

/// How spawned fakes react to being stopped.
#[derive(Default)]
pub struct Behaviour {
    pub terminate_fails: AtomicBool,
    pub kill_fails: AtomicBool,
    pub spawn_fails: AtomicBool,
}

#[derive(Default)]
pub struct ProcessLog {
    pub events: Mutex<Vec<ProcessEvent>>,
    pub live: Mutex<HashSet<u32>>,
    pub max_live: Mutex<usize>,
    pub behaviour: Behaviour,
    next_id: AtomicU32,
}

impl ProcessLog {
    pub fn events(&self) -> Vec<ProcessEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn live(&self) -> usize {
        self.live.lock().unwrap().len()
    }

    pub fn max_live(&self) -> usize {
        *self.max_live.lock().unwrap()
    }

    fn record(&self, event: ProcessEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub struct FakeProcess {
    id: u32,
    log: Arc<ProcessLog>,
}

#[async_trait]
impl KioskProcess for FakeProcess {
    fn id(&self) -> Option<u32> {
        Some(self.id)
    }

    async fn terminate(&mut self, grace: Duration) -> Result<(), HostError> {
        self.log.record(ProcessEvent::Terminate(self.id));
        if self.log.behaviour.terminate_fails.load(Ordering::SeqCst) {
            return Err(HostError::Timeout {
                command: "chromium-browser".to_string(),
                timeout: grace,
            });
        }
        self.log.live.lock().unwrap().remove(&self.id);
        Ok(())
    }

    async fn kill(&mut self) -> Result<(), HostError> {
        self.log.record(ProcessEvent::Kill(self.id));
        if self.log.behaviour.kill_fails.load(Ordering::SeqCst) {
            return Err(failed("kill"));
        }
        self.log.live.lock().unwrap().remove(&self.id);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeSpawner {
    pub log: Arc<ProcessLog>,
}

#[async_trait]
impl ProcessSpawner for FakeSpawner {
    async fn spawn(
        &self,
        _program: &str,
        args: &[String],
    ) -> Result<Box<dyn KioskProcess>, HostError> {
        if self.log.behaviour.spawn_fails.load(Ordering::SeqCst) {
            return Err(failed("spawn"));
        }
        let id = self.log.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.log.record(ProcessEvent::Spawn {
            id,
            args: args.to_vec(),
        });
        let live = {
            let mut live = self.log.live.lock().unwrap();
            live.insert(id);
            live.len()
        };
        let mut max_live = self.log.max_live.lock().unwrap();
        *max_live = (*max_live).max(live);
        Ok(Box::new(FakeProcess {
            id,
            log: self.log.clone(),
        }))
    }

    async fn kill_by_name(&self, pattern: &str) -> Result<(), HostError> {
        self.log.record(ProcessEvent::KillByName(pattern.to_string()));
        self.log.live.lock().unwrap().clear();
        Ok(())
    }
}

/// Readings for `FakeProbe`; `None` makes that reading fail.
pub struct FakeProbe {
    pub disk: Option<DiskUsage>,
    pub load: Option<f64>,
    pub temperature: Option<f64>,
    pub memory: Option<f64>,
    pub address: String,
}

impl Default for FakeProbe {
    fn default() -> Self {
        Self {
            disk: Some(DiskUsage {
                total_bytes: 32 << 30,
                free_bytes: 8 << 30,
            }),
            load: Some(12.5),
            temperature: Some(48.312),
            memory: Some(41.237),
            address: "192.168.1.20".to_string(),
        }
    }
}

#[async_trait]
impl MachineProbe for FakeProbe {
    async fn disk_usage(&self) -> Result<DiskUsage, HostError> {
        self.disk.ok_or_else(|| failed("statvfs"))
    }

    async fn cpu_load_percent(&self) -> Result<f64, HostError> {
        self.load.ok_or_else(|| failed("loadavg"))
    }

    async fn cpu_temperature(&self) -> Result<f64, HostError> {
        self.temperature.ok_or_else(|| failed("thermal"))
    }

    async fn memory_usage_percent(&self) -> Result<f64, HostError> {
        self.memory.ok_or_else(|| failed("meminfo"))
    }

    async fn ip_address(&self) -> String {
        self.address.clone()
    }
}

/// A dispatcher wired to fakes, with handles on every fake.
pub struct Harness {
    pub config: AgentConfig,
    pub device: Arc<FakeDevice>,
    pub processes: Arc<ProcessLog>,
    pub publisher: Arc<RecordingPublisher>,
    pub state: SharedState,
    pub dispatcher: CommandDispatcher,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_device(FakeDevice::default())
    }

    pub fn with_device(device: FakeDevice) -> Self {
        let config = AgentConfig::default();
        let device = Arc::new(device);
        let spawner = FakeSpawner::default();
        let processes = spawner.log.clone();
        let publisher = Arc::new(RecordingPublisher::default());
        let state = DeviceState::shared(config.browser.default_url.clone());

        let supervisor =
            BrowserSupervisor::new(Arc::new(spawner), device.clone(), config.browser.clone());
        let dispatcher = CommandDispatcher::new(
            config.topics.clone(),
            supervisor,
            device.clone(),
            publisher.clone(),
            state.clone(),
        );
        Self {
            config,
            device,
            processes,
            publisher,
            state,
            dispatcher,
        }
    }

    pub async fn send(&mut self, topic: &str, payload: &str) {
        self.dispatcher.handle(topic, payload.as_bytes()).await;
    }

    pub async fn state(&self) -> DeviceState {
        self.state.lock().await.clone()
    }
}
