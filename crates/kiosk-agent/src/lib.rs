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

//! kiosk-agent drives a single-screen browser kiosk from MQTT commands and
//! reports the machine's state back to the broker.

pub use command_line::{AgentCommand, Options, RunOptions};
use eyre::WrapErr;

use crate::config::AgentConfig;
use crate::telemetry::{LinuxProbe, TelemetrySnapshot};

pub mod command;
mod command_line;
pub mod config;
pub mod discovery;
pub mod dispatcher;
pub mod error;
pub mod host;
pub mod logging;
mod main_loop;
pub mod publisher;
pub mod reconciler;
pub mod state;
pub mod supervisor;
pub mod telemetry;
#[cfg(test)]
mod tests;

pub async fn start(cmdline: Options) -> eyre::Result<()> {
    if cmdline.version {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if !cfg!(target_os = "linux") {
        eyre::bail!("kiosk-agent only runs on Linux");
    }

    let (mut config, path) = match &cmdline.config_path {
        None => (AgentConfig::default(), "default".to_string()),
        Some(config_path) => (
            AgentConfig::load_from(config_path).wrap_err(format!(
                "Error loading agent configuration from {}",
                config_path.display()
            ))?,
            config_path.display().to_string(),
        ),
    };
    config.apply_overrides(&cmdline.run);
    tracing::info!("Using configuration from {path}: {config:?}");

    match cmdline.cmd.unwrap_or(AgentCommand::Run) {
        AgentCommand::Run => {
            main_loop::setup_and_run(config)
                .await
                .wrap_err("main_loop error exit")?;
            tracing::info!("Agent exit");
        }

        AgentCommand::Telemetry => {
            let probe = LinuxProbe::new(&config);
            let snapshot = TelemetrySnapshot::gather(&probe).await;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }

        AgentCommand::Discovery => {
            let documents = discovery::documents(&config);
            println!("{}", serde_json::to_string_pretty(&documents)?);
        }
    }
    Ok(())
}
