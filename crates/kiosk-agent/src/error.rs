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

/// Failures of the local OS actions (display, brightness, processes,
/// probes). These never leave the task that hit them; callers log them
/// and fall back to a sentinel.
#[derive(thiserror::Error, Debug)]
pub enum HostError {
    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with {status}: {stderr}")]
    ExitStatus {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("'{command}' did not finish within {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("Unexpected output from '{command}': {reason}")]
    Output { command: String, reason: String },

    #[error("System call failed: {0}")]
    Sys(#[from] nix::errno::Errno),

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Probe(String),

    #[error("Blocking read did not complete: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl HostError {
    pub fn output(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Output {
            command: command.into(),
            reason: reason.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
