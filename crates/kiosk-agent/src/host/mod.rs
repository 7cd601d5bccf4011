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

//! Local OS actions: X11 display control, the browser process and the
//! machine probes all shell out through here.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use crate::error::HostError;

pub mod device;
pub mod process;

pub use device::{DeviceControl, X11Device};
pub use process::{ChildProcess, KioskProcess, LocalSpawner, ProcessSpawner};

pub fn pretty_cmd(c: &std::process::Command) -> String {
    format!(
        "{} {}",
        c.get_program().to_string_lossy(),
        c.get_args()
            .map(|x| x.to_string_lossy())
            .collect::<Vec<std::borrow::Cow<'_, str>>>()
            .join(" ")
    )
}

/// Runs `cmd` to completion and returns its stdout.
///
/// Nonzero exit is an error carrying stderr. The command is killed if it
/// runs past `limit`, so this never blocks for longer than that.
pub async fn run_command(mut cmd: Command, limit: Duration) -> Result<String, HostError> {
    let command = pretty_cmd(cmd.as_std());
    cmd.stdin(Stdio::null()).kill_on_drop(true);
    tracing::trace!(command, "Running");

    let out = match timeout(limit, cmd.output()).await {
        Err(_) => {
            return Err(HostError::Timeout {
                command,
                timeout: limit,
            });
        }
        Ok(Err(source)) => return Err(HostError::Spawn { command, source }),
        Ok(Ok(out)) => out,
    };
    if !out.status.success() {
        return Err(HostError::ExitStatus {
            command,
            status: out.status,
            stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&out.stdout).into_owned())
}
