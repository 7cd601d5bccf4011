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

use std::future::Future;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use tokio::process::{Child, Command};
use tokio::time::timeout;

use super::run_command;
use crate::error::HostError;

/// A browser process started by a `ProcessSpawner`.
#[async_trait]
pub trait KioskProcess: Send + Sync {
    /// OS pid, `None` once the process has been reaped.
    fn id(&self) -> Option<u32>;

    /// Asks the process to exit and waits up to `grace` for it to do so.
    async fn terminate(&mut self, grace: Duration) -> Result<(), HostError>;

    /// Kills the process outright and reaps it.
    async fn kill(&mut self) -> Result<(), HostError>;
}

#[async_trait]
pub trait ProcessSpawner: Send + Sync {
    async fn spawn(&self, program: &str, args: &[String])
    -> Result<Box<dyn KioskProcess>, HostError>;

    /// Kills every process whose command line matches `pattern`. Used when
    /// the tracked handle is gone or did not die.
    async fn kill_by_name(&self, pattern: &str) -> Result<(), HostError>;
}

pub struct ChildProcess {
    child: Child,
    command: String,
    // kill_timeout caps how long kill() waits for the child to be reaped.
    kill_timeout: Duration,
}

impl ChildProcess {
    pub fn new(child: Child, command: String, kill_timeout: Duration) -> Self {
        Self {
            child,
            command,
            kill_timeout,
        }
    }
}

// reap_within waits for `wait` to report the child's exit, giving up with
// HostError::Timeout after `limit`.
async fn reap_within<F>(
    wait: F,
    limit: Duration,
    command: &str,
    pid: u32,
) -> Result<ExitStatus, HostError>
where
    F: Future<Output = std::io::Result<ExitStatus>>,
{
    match timeout(limit, wait).await {
        Ok(Ok(status)) => Ok(status),
        Ok(Err(source)) => Err(HostError::Io {
            path: format!("/proc/{pid}"),
            source,
        }),
        Err(_) => Err(HostError::Timeout {
            command: command.to_string(),
            timeout: limit,
        }),
    }
}

#[async_trait]
impl KioskProcess for ChildProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    async fn terminate(&mut self, grace: Duration) -> Result<(), HostError> {
        let Some(pid) = self.child.id() else {
            // Already reaped.
            return Ok(());
        };
        kill(Pid::from_raw(pid as i32), Signal::SIGTERM)?;

        let status = reap_within(self.child.wait(), grace, &self.command, pid).await?;
        tracing::debug!(pid, %status, "Browser exited after SIGTERM");
        Ok(())
    }

    async fn kill(&mut self) -> Result<(), HostError> {
        let Some(pid) = self.child.id() else {
            return Ok(());
        };
        self.child.start_kill().map_err(|source| HostError::Io {
            path: format!("/proc/{pid}"),
            source,
        })?;
        let status =
            reap_within(self.child.wait(), self.kill_timeout, &self.command, pid).await?;
        tracing::debug!(pid, %status, "Browser killed");
        Ok(())
    }
}

/// Spawns processes on this machine with DISPLAY pointed at the kiosk
/// screen.
#[derive(Debug, Clone)]
pub struct LocalSpawner {
    x_display: String,
    command_timeout: Duration,
}

impl LocalSpawner {
    pub fn new(x_display: impl Into<String>, command_timeout: Duration) -> Self {
        Self {
            x_display: x_display.into(),
            command_timeout,
        }
    }
}

#[async_trait]
impl ProcessSpawner for LocalSpawner {
    async fn spawn(
        &self,
        program: &str,
        args: &[String],
    ) -> Result<Box<dyn KioskProcess>, HostError> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .env("DISPLAY", &self.x_display)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        let command = super::pretty_cmd(cmd.as_std());

        let child = cmd.spawn().map_err(|source| HostError::Spawn {
            command: command.clone(),
            source,
        })?;
        tracing::info!(command, pid = child.id(), "Spawned browser");
        Ok(Box::new(ChildProcess::new(
            child,
            command,
            self.command_timeout,
        )))
    }

    async fn kill_by_name(&self, pattern: &str) -> Result<(), HostError> {
        let mut cmd = Command::new("pkill");
        cmd.arg("-f").arg(pattern);
        match run_command(cmd, self.command_timeout).await {
            Ok(_) => Ok(()),
            // pkill exits 1 when nothing matched, which is the outcome we want
            Err(HostError::ExitStatus { status, .. }) if status.code() == Some(1) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
