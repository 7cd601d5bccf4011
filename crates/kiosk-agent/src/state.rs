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

//! In-memory device state shared between the command dispatcher and the
//! background pollers. One mutex guards the whole struct; nothing else
//! shared is mutable.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::Mutex;

pub type SharedState = Arc<Mutex<DeviceState>>;

/// Brightness used until the first brightness command arrives.
pub const DEFAULT_BRIGHTNESS: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceState {
    pub display: DisplayPower,
    pub brightness: Brightness,
    /// Always the last target handed to the browser supervisor.
    pub current_target: String,
}

impl DeviceState {
    pub fn new(default_target: impl Into<String>) -> Self {
        Self {
            display: DisplayPower::Unknown,
            brightness: Brightness::saturating(DEFAULT_BRIGHTNESS),
            current_target: default_target.into(),
        }
    }

    pub fn shared(default_target: impl Into<String>) -> SharedState {
        Arc::new(Mutex::new(Self::new(default_target)))
    }
}

/// Display power as observed or commanded. `Unknown` is what a failed
/// query degrades to, and is published like any other value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPower {
    On,
    Off,
    Unknown,
}

impl DisplayPower {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayPower::On => "ON",
            DisplayPower::Off => "OFF",
            DisplayPower::Unknown => "unknown",
        }
    }

    /// Parses a display command payload. Only the exact strings `ON` and
    /// `OFF` are commands; everything else (including `unknown`) is not.
    pub fn from_command(payload: &str) -> Option<Self> {
        match payload {
            "ON" => Some(DisplayPower::On),
            "OFF" => Some(DisplayPower::Off),
            _ => None,
        }
    }
}

impl fmt::Display for DisplayPower {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Screen brightness, always within `[0, 1]`.
///
/// Out of range values saturate rather than being rejected. NaN is the one
/// value that can't be saturated meaningfully, so it has no representation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brightness(f64);

// NaN is unrepresentable, so equality is total.
impl Eq for Brightness {}

impl Brightness {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 1.0;

    pub fn new(value: f64) -> Option<Self> {
        if value.is_nan() {
            None
        } else {
            Some(Self(value.clamp(Self::MIN, Self::MAX)))
        }
    }

    /// Like `new`, but maps NaN to the minimum.
    pub fn saturating(value: f64) -> Self {
        Self::new(value).unwrap_or(Self(Self::MIN))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Two decimals, the format every brightness state publish uses.
impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum BrightnessParseError {
    #[error("'{0}' is not a number")]
    NotANumber(String),
}

impl FromStr for Brightness {
    type Err = BrightnessParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<f64>()
            .ok()
            .and_then(Brightness::new)
            .ok_or_else(|| BrightnessParseError::NotANumber(s.to_string()))
    }
}
