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

//! Machine telemetry: what we read and how it gets published.

pub mod address;
pub mod probe;
pub mod publisher;

pub use address::UNKNOWN_ADDRESS;
pub use probe::{DiskUsage, LinuxProbe, MachineProbe};
pub use publisher::{TelemetryPublisher, TelemetrySnapshot};

use crate::error::HostError;

/// Runs a synchronous read (statvfs, procfs, netlink) on the blocking pool
/// so a slow filesystem can't stall the runtime's worker threads.
pub(crate) async fn read_blocking<T, F>(read: F) -> Result<T, HostError>
where
    F: FnOnce() -> Result<T, HostError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(read).await?
}
