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

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "kiosk-agent", about = "MQTT controlled kiosk display agent")]
pub struct Options {
    #[arg(long, help = "Print version number and exit")]
    pub version: bool,

    #[arg(
        long,
        env = "KIOSK_AGENT_CONFIG",
        help = "Path to the agent TOML config. Defaults apply when omitted."
    )]
    pub config_path: Option<PathBuf>,

    #[command(flatten)]
    pub run: RunOptions,

    #[command(subcommand)]
    pub cmd: Option<AgentCommand>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum AgentCommand {
    #[command(about = "Run the agent. This is the default.")]
    Run,

    #[command(about = "Gather telemetry once, print it as JSON and exit")]
    Telemetry,

    #[command(about = "Print the discovery documents that would be published and exit")]
    Discovery,
}

/// Settings that can come from the command line or the environment and
/// override the config file.
#[derive(Args, Debug, Default, Clone, PartialEq, Eq)]
pub struct RunOptions {
    #[arg(long, env = "MQTT_BROKER", help = "MQTT broker host name")]
    pub mqtt_broker: Option<String>,

    #[arg(long, env = "MQTT_PORT", help = "MQTT broker port")]
    pub mqtt_port: Option<u16>,

    #[arg(long, env = "MQTT_USER", help = "MQTT username")]
    pub mqtt_user: Option<String>,

    #[arg(long, env = "MQTT_PASSWORD", hide_env_values = true, help = "MQTT password")]
    pub mqtt_password: Option<String>,

    #[arg(long, env = "DEFAULT_URL", help = "URL shown at startup")]
    pub default_url: Option<String>,
}

impl Options {
    pub fn load() -> Self {
        Self::parse()
    }
}
