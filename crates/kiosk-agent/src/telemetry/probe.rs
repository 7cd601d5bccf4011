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

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use nix::sys::statvfs::statvfs;
use procfs::Current;

use super::address::{AddressSource, HostnameAddress, InterfaceAddress, first_address};
use super::read_blocking;
use crate::config::AgentConfig;
use crate::error::HostError;

const GIB: f64 = (1u64 << 30) as f64;

/// Raw readings of the machine. Each one fails on its own.
#[async_trait]
pub trait MachineProbe: Send + Sync {
    async fn disk_usage(&self) -> Result<DiskUsage, HostError>;
    /// One minute load average as a percentage of the core count.
    async fn cpu_load_percent(&self) -> Result<f64, HostError>;
    /// Degrees Celsius.
    async fn cpu_temperature(&self) -> Result<f64, HostError>;
    async fn memory_usage_percent(&self) -> Result<f64, HostError>;
    /// Never fails; "unknown" when no source has an address.
    async fn ip_address(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskUsage {
    pub total_bytes: u64,
    /// Space available to unprivileged users.
    pub free_bytes: u64,
}

impl DiskUsage {
    pub fn total_gb(&self) -> f64 {
        self.total_bytes as f64 / GIB
    }

    pub fn free_gb(&self) -> f64 {
        self.free_bytes as f64 / GIB
    }

    pub fn free_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        self.free_bytes as f64 / self.total_bytes as f64 * 100.0
    }
}

/// Memory in use as a percentage of the total. Prefers `available`, which
/// counts reclaimable caches as free, and falls back to `free` on kernels
/// that don't report it.
pub fn memory_percent(total: u64, available: Option<u64>, free: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    let unused = available.unwrap_or(free).min(total);
    Some((total - unused) as f64 / total as f64 * 100.0)
}

pub fn load_percent(load_one: f64, cores: usize) -> f64 {
    load_one / cores.max(1) as f64 * 100.0
}

/// The thermal zone file holds an integer in millidegrees Celsius.
pub fn parse_millidegrees(s: &str) -> Result<f64, HostError> {
    s.trim()
        .parse::<i64>()
        .map(|m| m as f64 / 1000.0)
        .map_err(|e| HostError::Probe(format!("bad thermal reading '{}': {e}", s.trim())))
}

/// Reads the local machine through procfs, sysfs and statvfs.
pub struct LinuxProbe {
    disk_path: PathBuf,
    thermal_path: PathBuf,
    address_sources: Vec<Box<dyn AddressSource>>,
}

impl LinuxProbe {
    pub fn new(config: &AgentConfig) -> Self {
        let address_sources: Vec<Box<dyn AddressSource>> = vec![
            Box::new(InterfaceAddress::new(&config.telemetry.interface)),
            Box::new(HostnameAddress::new(config.host.command_timeout())),
        ];
        Self {
            disk_path: config.telemetry.disk_path.clone(),
            thermal_path: config.telemetry.thermal_path.clone(),
            address_sources,
        }
    }
}

fn disk_usage_of(path: &Path) -> Result<DiskUsage, HostError> {
    let stat = statvfs(path)?;
    let fragment = stat.fragment_size() as u64;
    Ok(DiskUsage {
        total_bytes: stat.blocks() as u64 * fragment,
        free_bytes: stat.blocks_available() as u64 * fragment,
    })
}

fn procfs_error(e: procfs::ProcError) -> HostError {
    HostError::Probe(format!("procfs: {e}"))
}

#[async_trait]
impl MachineProbe for LinuxProbe {
    async fn disk_usage(&self) -> Result<DiskUsage, HostError> {
        let path = self.disk_path.clone();
        read_blocking(move || disk_usage_of(&path)).await
    }

    async fn cpu_load_percent(&self) -> Result<f64, HostError> {
        let load =
            read_blocking(|| procfs::LoadAverage::current().map_err(procfs_error)).await?;
        Ok(load_percent(load.one as f64, num_cpus::get()))
    }

    async fn cpu_temperature(&self) -> Result<f64, HostError> {
        let raw = tokio::fs::read_to_string(&self.thermal_path)
            .await
            .map_err(|source| HostError::Io {
                path: self.thermal_path.display().to_string(),
                source,
            })?;
        parse_millidegrees(&raw)
    }

    async fn memory_usage_percent(&self) -> Result<f64, HostError> {
        let meminfo = read_blocking(|| procfs::Meminfo::current().map_err(procfs_error)).await?;
        memory_percent(meminfo.mem_total, meminfo.mem_available, meminfo.mem_free)
            .ok_or_else(|| HostError::Probe("MemTotal is zero".to_string()))
    }

    async fn ip_address(&self) -> String {
        first_address(&self.address_sources).await
    }
}
