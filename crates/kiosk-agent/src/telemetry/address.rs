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

//! Which address to report for the machine. Sources are asked in order and
//! the first answer wins.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::read_blocking;
use crate::error::HostError;
use crate::host::run_command;

/// Published when no source knows an address.
pub const UNKNOWN_ADDRESS: &str = "unknown";

#[async_trait]
pub trait AddressSource: Send + Sync {
    fn name(&self) -> &str;
    async fn address(&self) -> Result<String, HostError>;
}

pub async fn first_address(sources: &[Box<dyn AddressSource>]) -> String {
    for source in sources {
        match source.address().await {
            Ok(address) => return address,
            Err(err) => tracing::debug!(source = source.name(), %err, "No address from source"),
        }
    }
    tracing::warn!("Could not determine the IP address");
    UNKNOWN_ADDRESS.to_string()
}

/// The IPv4 address of a named interface.
pub struct InterfaceAddress {
    interface: String,
}

impl InterfaceAddress {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
        }
    }
}

#[async_trait]
impl AddressSource for InterfaceAddress {
    fn name(&self) -> &str {
        &self.interface
    }

    async fn address(&self) -> Result<String, HostError> {
        let interfaces = read_blocking(|| {
            local_ip_address::list_afinet_netifas()
                .map_err(|e| HostError::Probe(format!("listing interfaces: {e}")))
        })
        .await?;
        interfaces
            .into_iter()
            .find(|(name, ip)| *name == self.interface && ip.is_ipv4())
            .map(|(_, ip)| ip.to_string())
            .ok_or_else(|| HostError::Probe(format!("{} has no IPv4 address", self.interface)))
    }
}

/// First address printed by `hostname -I`.
pub struct HostnameAddress {
    timeout: Duration,
}

impl HostnameAddress {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl AddressSource for HostnameAddress {
    fn name(&self) -> &str {
        "hostname -I"
    }

    async fn address(&self) -> Result<String, HostError> {
        let mut cmd = Command::new("hostname");
        cmd.arg("-I");
        let out = run_command(cmd, self.timeout).await?;
        first_token(&out)
            .map(str::to_string)
            .ok_or_else(|| HostError::output("hostname -I", "no addresses"))
    }
}

fn first_token(s: &str) -> Option<&str> {
    s.split_whitespace().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Option<&'static str>);

    #[async_trait]
    impl AddressSource for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn address(&self) -> Result<String, HostError> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| HostError::Probe("none".to_string()))
        }
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let sources: Vec<Box<dyn AddressSource>> = vec![
            Box::new(Fixed(None)),
            Box::new(Fixed(Some("192.168.1.20"))),
            Box::new(Fixed(Some("10.0.0.4"))),
        ];
        assert_eq!(first_address(&sources).await, "192.168.1.20");
    }

    #[tokio::test]
    async fn test_all_sources_fail() {
        let sources: Vec<Box<dyn AddressSource>> =
            vec![Box::new(Fixed(None)), Box::new(Fixed(None))];
        assert_eq!(first_address(&sources).await, UNKNOWN_ADDRESS);
        assert_eq!(first_address(&[]).await, UNKNOWN_ADDRESS);
    }

    #[tokio::test]
    async fn test_missing_interface() {
        let source = InterfaceAddress::new("no-such-iface0");
        assert!(source.address().await.is_err());
    }

    #[test]
    fn test_first_token() {
        assert_eq!(first_token("192.168.1.20 fd00::1 \n"), Some("192.168.1.20"));
        assert_eq!(first_token(" \n"), None);
    }
}
