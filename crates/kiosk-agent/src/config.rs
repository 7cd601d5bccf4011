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

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::command_line::RunOptions;

const DEFAULT_BROKER: &str = "homeassistant.local";
const DEFAULT_BROKER_PORT: u16 = 1883;
const DEFAULT_CLIENT_ID: &str = "kiosk-agent";

/// What the kiosk shows when nobody has asked for anything else.
pub const DEFAULT_URL: &str = "http://ukeplan.local:5000";

/// Describes the configuration file of the kiosk agent.
///
/// Every section and field has a default, so an empty file (or no file at
/// all) gives a working agent against `homeassistant.local`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AgentConfig {
    pub mqtt: MqttConfig,
    pub topics: TopicsConfig,
    pub browser: BrowserConfig,
    pub display: DisplayConfig,
    pub telemetry: TelemetryConfig,
    pub period: IterationTime,
    pub discovery: DiscoveryConfig,
    pub host: HostConfig,
}

impl AgentConfig {
    /// Loads the agent configuration file in toml format from the given path
    pub fn load_from(path: &Path) -> Result<Self, std::io::Error> {
        let data = std::fs::read_to_string(path)?;

        toml::from_str(&data).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Invalid AgentConfig toml data: {e}"),
            )
        })
    }

    /// Command line and environment values win over the file.
    pub fn apply_overrides(&mut self, options: &RunOptions) {
        if let Some(host) = &options.mqtt_broker {
            self.mqtt.host = host.clone();
        }
        if let Some(port) = options.mqtt_port {
            self.mqtt.port = port;
        }
        if let Some(username) = &options.mqtt_user {
            self.mqtt.username = Some(username.clone());
        }
        if let Some(password) = &options.mqtt_password {
            self.mqtt.password = Some(password.clone());
        }
        if let Some(url) = &options.default_url {
            self.browser.default_url = url.clone();
        }
    }
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub keep_alive_secs: u64,
    /// Fixed pause between failed event loop polls. Not a backoff.
    pub reconnect_delay_secs: u64,
    /// Inbound messages buffered for the dispatcher before dropping.
    pub queue_size: usize,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_BROKER.to_string(),
            port: DEFAULT_BROKER_PORT,
            client_id: DEFAULT_CLIENT_ID.to_string(),
            username: None,
            password: None,
            keep_alive_secs: 60,
            reconnect_delay_secs: 5,
            queue_size: 128,
        }
    }
}

// Config gets logged at startup; keep the password out of it.
impl fmt::Debug for MqttConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MqttConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("keep_alive_secs", &self.keep_alive_secs)
            .field("reconnect_delay_secs", &self.reconnect_delay_secs)
            .field("queue_size", &self.queue_size)
            .finish()
    }
}

/// Command topics we subscribe to and the state topics we mirror onto.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TopicsConfig {
    pub display_command: String,
    pub display_state: String,
    pub url_command: String,
    pub url_state: String,
    pub refresh_command: String,
    pub restart_command: String,
    pub brightness_command: String,
    pub brightness_state: String,
}

impl Default for TopicsConfig {
    fn default() -> Self {
        Self {
            display_command: "pi/display/command".to_string(),
            display_state: "pi/display/state".to_string(),
            url_command: "pi/browser/command/url".to_string(),
            url_state: "pi/browser/current_url".to_string(),
            refresh_command: "pi/browser/command/refresh".to_string(),
            restart_command: "pi/system/command/restart".to_string(),
            brightness_command: "pi/brightness/command".to_string(),
            brightness_state: "pi/brightness/state".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BrowserConfig {
    pub program: String,
    /// Passed before the target URL.
    pub args: Vec<String>,
    /// X11 class used to find the window for refreshes.
    pub window_class: String,
    pub refresh_keys: String,
    pub default_url: String,
    /// How long a SIGTERM'd browser gets before we escalate.
    pub terminate_timeout_secs: u64,
}

impl BrowserConfig {
    pub fn terminate_timeout(&self) -> Duration {
        Duration::from_secs(self.terminate_timeout_secs)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            program: "chromium-browser".to_string(),
            args: vec![
                "--noerrdialogs".to_string(),
                "--disable-infobars".to_string(),
                "--kiosk".to_string(),
            ],
            window_class: "chromium-browser".to_string(),
            refresh_keys: "ctrl+F5".to_string(),
            default_url: DEFAULT_URL.to_string(),
            terminate_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DisplayConfig {
    /// Value for DISPLAY when running X11 tools and the browser.
    pub x_display: String,
    /// xrandr output whose brightness we set.
    pub output: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            x_display: ":0".to_string(),
            output: "HDMI-1".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TelemetryConfig {
    /// Interface asked first for the published IP address.
    pub interface: String,
    /// Filesystem whose usage is reported.
    pub disk_path: PathBuf,
    /// sysfs file holding the CPU temperature in millidegrees.
    pub thermal_path: PathBuf,
    pub topics: MetricTopics,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            interface: "wlan0".to_string(),
            disk_path: PathBuf::from("/"),
            thermal_path: PathBuf::from("/sys/class/thermal/thermal_zone0/temp"),
            topics: MetricTopics::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MetricTopics {
    pub disk_total: String,
    pub disk_free_gb: String,
    pub disk_free_pct: String,
    pub cpu_load: String,
    pub cpu_temp: String,
    pub ip_address: String,
    pub memory_usage: String,
}

impl Default for MetricTopics {
    fn default() -> Self {
        Self {
            disk_total: "pi/stats/disk_total".to_string(),
            disk_free_gb: "pi/stats/disk_free_gb".to_string(),
            disk_free_pct: "pi/stats/disk_free_pct".to_string(),
            cpu_load: "pi/stats/cpu_load".to_string(),
            cpu_temp: "pi/stats/cpu_temp".to_string(),
            ip_address: "pi/stats/ip_address".to_string(),
            memory_usage: "pi/stats/memory_usage".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct IterationTime {
    /// How often the display reconciler samples display power.
    pub display_poll_secs: u64,
    /// How often machine telemetry is published.
    pub telemetry_secs: u64,
}

impl IterationTime {
    pub fn display_poll(&self) -> Duration {
        Duration::from_secs(self.display_poll_secs.max(1))
    }

    pub fn telemetry(&self) -> Duration {
        Duration::from_secs(self.telemetry_secs.max(1))
    }
}

impl Default for IterationTime {
    fn default() -> Self {
        Self {
            display_poll_secs: 5,
            telemetry_secs: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DiscoveryConfig {
    pub enabled: bool,
    pub prefix: String,
    /// Prefix for every entity's object id and unique id.
    pub object_id_prefix: String,
    pub device: DeviceInfo,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prefix: "homeassistant".to_string(),
            object_id_prefix: "pi".to_string(),
            device: DeviceInfo::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(default)]
pub struct DeviceInfo {
    pub identifiers: Vec<String>,
    pub name: String,
    pub model: String,
    pub manufacturer: String,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            identifiers: vec!["pi_ukeplan".to_string()],
            name: "Raspberry Pi Ukeplan".to_string(),
            model: "Raspberry Pi 3b+".to_string(),
            manufacturer: "Raspberry Pi Foundation".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HostConfig {
    /// Upper bound for any single external command.
    pub command_timeout_secs: u64,
    pub reboot_command: Vec<String>,
}

impl HostConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs.max(1))
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: 10,
            reboot_command: vec!["sudo".to_string(), "reboot".to_string()],
        }
    }
}
