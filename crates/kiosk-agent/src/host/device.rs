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

use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use tokio::process::Command;

use super::run_command;
use crate::config::{AgentConfig, DisplayConfig};
use crate::error::HostError;
use crate::state::{Brightness, DisplayPower};

/// Actions against the machine the kiosk runs on.
#[automock]
#[async_trait]
pub trait DeviceControl: Send + Sync {
    /// Current display power. Errors are mapped to `Unknown` by callers.
    async fn display_power(&self) -> Result<DisplayPower, HostError>;
    async fn set_display_power(&self, on: bool) -> Result<(), HostError>;
    async fn set_brightness(&self, brightness: Brightness) -> Result<(), HostError>;
    /// Finds the first visible window of `window_class`, focuses it and
    /// sends it `keys` (xdotool key syntax).
    async fn send_keys_to_window(&self, window_class: &str, keys: &str) -> Result<(), HostError>;
    async fn reboot(&self) -> Result<(), HostError>;
}

/// DeviceControl backed by the usual X11 tools (xset, xrandr, xdotool).
#[derive(Debug, Clone)]
pub struct X11Device {
    display: DisplayConfig,
    reboot_command: Vec<String>,
    command_timeout: Duration,
}

impl X11Device {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            display: config.display.clone(),
            reboot_command: config.host.reboot_command.clone(),
            command_timeout: config.host.command_timeout(),
        }
    }

    fn x11_command(&self, program: &str) -> Command {
        let mut cmd = Command::new(program);
        cmd.env("DISPLAY", &self.display.x_display);
        cmd
    }
}

#[async_trait]
impl DeviceControl for X11Device {
    async fn display_power(&self) -> Result<DisplayPower, HostError> {
        let mut cmd = self.x11_command("xset");
        cmd.arg("-q");
        let out = run_command(cmd, self.command_timeout).await?;
        Ok(parse_xset_query(&out))
    }

    async fn set_display_power(&self, on: bool) -> Result<(), HostError> {
        let mut cmd = self.x11_command("xset");
        cmd.args(["dpms", "force", if on { "on" } else { "off" }]);
        run_command(cmd, self.command_timeout).await.map(|_| ())
    }

    async fn set_brightness(&self, brightness: Brightness) -> Result<(), HostError> {
        let mut cmd = self.x11_command("xrandr");
        cmd.arg("--output")
            .arg(&self.display.output)
            .arg("--brightness")
            .arg(brightness.to_string());
        run_command(cmd, self.command_timeout).await.map(|_| ())
    }

    async fn send_keys_to_window(&self, window_class: &str, keys: &str) -> Result<(), HostError> {
        let mut search = self.x11_command("xdotool");
        search.args(["search", "--onlyvisible", "--class", window_class]);
        let out = run_command(search, self.command_timeout).await?;
        let Some(window_id) = first_window_id(&out) else {
            return Err(HostError::output(
                "xdotool search",
                format!("no visible window with class {window_class}"),
            ));
        };

        let mut send = self.x11_command("xdotool");
        send.args(["windowactivate", window_id, "key", keys]);
        run_command(send, self.command_timeout).await.map(|_| ())
    }

    async fn reboot(&self) -> Result<(), HostError> {
        let Some((program, args)) = self.reboot_command.split_first() else {
            return Err(HostError::Probe("reboot command is empty".to_string()));
        };
        let mut cmd = Command::new(program);
        cmd.args(args);
        run_command(cmd, self.command_timeout).await.map(|_| ())
    }
}

/// `xset -q` prints "Monitor is Off" while DPMS has the screen off.
/// Anything else counts as on.
pub fn parse_xset_query(output: &str) -> DisplayPower {
    if output.contains("Monitor is Off") {
        DisplayPower::Off
    } else {
        DisplayPower::On
    }
}

/// `xdotool search` prints one window id per line.
pub fn first_window_id(output: &str) -> Option<&str> {
    output.split_whitespace().next()
}
