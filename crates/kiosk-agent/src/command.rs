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

use crate::config::TopicsConfig;
use crate::state::{Brightness, DisplayPower};

/// The channel a message arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandTopic {
    DisplayPower,
    BrowserUrl,
    BrowserRefresh,
    SystemRestart,
    Brightness,
}

impl CommandTopic {
    pub const ALL: [CommandTopic; 5] = [
        CommandTopic::DisplayPower,
        CommandTopic::BrowserUrl,
        CommandTopic::BrowserRefresh,
        CommandTopic::SystemRestart,
        CommandTopic::Brightness,
    ];

    pub fn topic<'a>(&self, topics: &'a TopicsConfig) -> &'a str {
        match self {
            CommandTopic::DisplayPower => &topics.display_command,
            CommandTopic::BrowserUrl => &topics.url_command,
            CommandTopic::BrowserRefresh => &topics.refresh_command,
            CommandTopic::SystemRestart => &topics.restart_command,
            CommandTopic::Brightness => &topics.brightness_command,
        }
    }

    pub fn classify(topic: &str, topics: &TopicsConfig) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.topic(topics) == topic)
    }
}

/// Topic filters to subscribe to, one per command topic. The client's
/// QoS (0 by default) applies to all of them.
pub fn subscriptions(topics: &TopicsConfig) -> Vec<String> {
    CommandTopic::ALL
        .iter()
        .map(|c| c.topic(topics).to_string())
        .collect()
}

/// A decoded inbound command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetDisplay(DisplayPower),
    Navigate(String),
    Refresh,
    Restart,
    SetBrightness(Brightness),
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("'{0}' is not a display power command")]
    DisplayPayload(String),
    #[error(transparent)]
    Brightness(#[from] crate::state::BrightnessParseError),
}

impl Command {
    /// Decodes `payload` for a message that arrived on `topic`.
    /// The payload is expected to be trimmed already.
    pub fn parse(topic: CommandTopic, payload: &str) -> Result<Self, CommandError> {
        let command = match topic {
            CommandTopic::DisplayPower => DisplayPower::from_command(payload)
                .map(Command::SetDisplay)
                .ok_or_else(|| CommandError::DisplayPayload(payload.to_string()))?,
            CommandTopic::BrowserUrl => Command::Navigate(payload.to_string()),
            CommandTopic::BrowserRefresh => Command::Refresh,
            CommandTopic::SystemRestart => Command::Restart,
            CommandTopic::Brightness => Command::SetBrightness(payload.parse()?),
        };
        Ok(command)
    }
}
