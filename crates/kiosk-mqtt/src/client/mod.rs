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

// src/client/mod.rs
// Client module exports.
//
// The client is split into the connection core, its options, and the
// envelope used to hand inbound publishes to whoever consumes them.

mod core;
mod messages;
mod options;

pub use core::MqttClient;

pub use messages::ReceivedMessage;
pub use options::{ClientCredentials, ClientOptions};
