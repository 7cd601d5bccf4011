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

use std::sync::atomic::Ordering;

use kiosk_mqtt::ReceivedMessage;
use tokio::sync::{mpsc, watch};

use crate::state::{Brightness, DisplayPower};
use crate::tests::common::{DeviceCall, FakeDevice, Harness, ProcessEvent};

const BRIGHTNESS_CMD: &str = "pi/brightness/command";
const BRIGHTNESS_STATE: &str = "pi/brightness/state";
const DISPLAY_CMD: &str = "pi/display/command";
const DISPLAY_STATE: &str = "pi/display/state";
const URL_CMD: &str = "pi/browser/command/url";
const URL_STATE: &str = "pi/browser/current_url";

#[tokio::test]
async fn test_brightness_is_clamped_and_published_with_two_decimals() {
    let cases = [
        ("1.5", "1.00"),
        ("0.333", "0.33"),
        ("-2", "0.00"),
        ("0.7", "0.70"),
        ("inf", "1.00"),
    ];
    for (payload, expected) in cases {
        let mut h = Harness::new();
        h.send(BRIGHTNESS_CMD, payload).await;
        assert_eq!(h.publisher.on(BRIGHTNESS_STATE), vec![expected], "{payload}");
        assert_eq!(h.state().await.brightness.to_string(), expected);
    }
}

#[tokio::test]
async fn test_brightness_end_to_end() {
    let mut h = Harness::new();
    h.send(BRIGHTNESS_CMD, "1.5").await;

    assert_eq!(
        h.device.calls(),
        vec![DeviceCall::SetBrightness(Brightness::saturating(1.0))]
    );
    assert_eq!(h.state().await.brightness.value(), 1.0);
    assert_eq!(
        h.publisher.published(),
        vec![(BRIGHTNESS_STATE.to_string(), "1.00".to_string())]
    );
}

#[tokio::test]
async fn test_malformed_brightness_is_dropped() {
    let mut h = Harness::new();
    for payload in ["abc", "", "NaN", "50%"] {
        h.send(BRIGHTNESS_CMD, payload).await;
    }
    assert!(h.publisher.published().is_empty());
    assert!(h.device.calls().is_empty());
    assert_eq!(h.state().await.brightness.value(), 0.5);
}

#[tokio::test]
async fn test_url_end_to_end() {
    let mut h = Harness::new();
    h.send(URL_CMD, "  http://dashboard.local/today \n").await;

    let events = h.processes.events();
    assert_eq!(events.len(), 1);
    let ProcessEvent::Spawn { args, .. } = &events[0] else {
        panic!("expected a spawn, got {events:?}");
    };
    assert_eq!(
        args,
        &[
            "--noerrdialogs",
            "--disable-infobars",
            "--kiosk",
            "http://dashboard.local/today"
        ]
    );
    assert_eq!(h.state().await.current_target, "http://dashboard.local/today");
    assert_eq!(
        h.publisher.on(URL_STATE),
        vec!["http://dashboard.local/today"]
    );
}

#[tokio::test]
async fn test_two_launches_never_overlap() {
    let mut h = Harness::new();
    h.send(URL_CMD, "http://a.local").await;
    h.send(URL_CMD, "http://b.local").await;

    let events = h.processes.events();
    assert!(matches!(events[0], ProcessEvent::Spawn { id: 1, .. }));
    assert_eq!(events[1], ProcessEvent::Terminate(1));
    assert!(matches!(events[2], ProcessEvent::Spawn { id: 2, .. }));
    assert_eq!(events.len(), 3);
    assert_eq!(h.processes.max_live(), 1);
    assert_eq!(h.processes.live(), 1);
    assert_eq!(
        h.publisher.on(URL_STATE),
        vec!["http://a.local", "http://b.local"]
    );
    assert_eq!(h.dispatcher.supervisor().target(), Some("http://b.local"));
}

#[tokio::test]
async fn test_failed_spawn_still_records_target() {
    let mut h = Harness::new();
    h.processes
        .behaviour
        .spawn_fails
        .store(true, Ordering::SeqCst);
    h.send(URL_CMD, "http://a.local").await;

    assert!(!h.dispatcher.supervisor().is_running());
    assert_eq!(h.state().await.current_target, "http://a.local");
    assert_eq!(h.publisher.on(URL_STATE), vec!["http://a.local"]);
}

#[tokio::test]
async fn test_display_off_end_to_end() {
    let mut h = Harness::new();
    h.send(DISPLAY_CMD, "OFF").await;

    assert_eq!(h.device.calls(), vec![DeviceCall::SetDisplay(false)]);
    assert_eq!(h.state().await.display, DisplayPower::Off);
    assert_eq!(h.publisher.on(DISPLAY_STATE), vec!["OFF"]);

    h.send(DISPLAY_CMD, " ON\n").await;
    assert_eq!(h.state().await.display, DisplayPower::On);
    assert_eq!(h.publisher.on(DISPLAY_STATE), vec!["OFF", "ON"]);
}

#[tokio::test]
async fn test_failed_host_action_still_mirrors_state() {
    let device = FakeDevice::default();
    device.fail_actions.store(true, Ordering::SeqCst);
    let mut h = Harness::with_device(device);

    h.send(DISPLAY_CMD, "OFF").await;
    h.send(BRIGHTNESS_CMD, "0.25").await;

    assert_eq!(h.publisher.on(DISPLAY_STATE), vec!["OFF"]);
    assert_eq!(h.publisher.on(BRIGHTNESS_STATE), vec!["0.25"]);
    assert_eq!(h.device.calls().len(), 2);
}

#[tokio::test]
async fn test_unknown_topics_and_payloads_do_nothing() {
    let mut h = Harness::new();
    h.send("pi/unknown/command", "ON").await;
    h.send(DISPLAY_STATE, "ON").await;
    h.send(DISPLAY_CMD, "on").await;
    h.send(DISPLAY_CMD, "unknown").await;
    h.send(DISPLAY_CMD, "").await;

    assert!(h.publisher.published().is_empty());
    assert!(h.device.calls().is_empty());
    assert!(h.processes.events().is_empty());
    assert_eq!(h.state().await.display, DisplayPower::Unknown);
}

#[tokio::test]
async fn test_refresh_and_restart() {
    let mut h = Harness::new();
    h.send("pi/browser/command/refresh", "REFRESH").await;
    h.send("pi/system/command/restart", "RESTART").await;

    assert_eq!(
        h.device.calls(),
        vec![
            DeviceCall::SendKeys("chromium-browser".to_string(), "ctrl+F5".to_string()),
            DeviceCall::Reboot,
        ]
    );
    assert!(h.publisher.published().is_empty());
}

#[tokio::test]
async fn test_failed_refresh_is_swallowed() {
    let device = FakeDevice::default();
    device.fail_actions.store(true, Ordering::SeqCst);
    let mut h = Harness::with_device(device);

    h.send("pi/browser/command/refresh", "").await;
    assert!(h.publisher.published().is_empty());
}

#[tokio::test]
async fn test_invalid_utf8_payload_is_decoded_lossily() {
    let mut h = Harness::new();
    h.dispatcher
        .handle(BRIGHTNESS_CMD, &[0xff, b'0', b'.', b'5'])
        .await;
    // The replacement character makes it non-numeric.
    assert!(h.publisher.published().is_empty());
}

#[tokio::test]
async fn test_run_handles_messages_in_order_until_closed() {
    let mut h = Harness::new();
    let (tx, mut rx) = mpsc::channel(8);
    let (close_sender, mut close_receiver) = watch::channel(false);

    tx.send(ReceivedMessage::new(DISPLAY_CMD, "OFF")).await.unwrap();
    tx.send(ReceivedMessage::new(BRIGHTNESS_CMD, "0.1")).await.unwrap();
    tx.send(ReceivedMessage::new(DISPLAY_CMD, "ON")).await.unwrap();
    // Dropping the sender ends run() once the queue is drained.
    drop(tx);

    h.dispatcher.run(&mut rx, &mut close_receiver).await;
    assert_eq!(
        h.publisher.published(),
        vec![
            (DISPLAY_STATE.to_string(), "OFF".to_string()),
            (BRIGHTNESS_STATE.to_string(), "0.10".to_string()),
            (DISPLAY_STATE.to_string(), "ON".to_string()),
        ]
    );
    drop(close_sender);
}

#[tokio::test]
async fn test_run_stops_on_close_signal() {
    let mut h = Harness::new();
    let (_tx, mut rx) = mpsc::channel::<ReceivedMessage>(8);
    let (close_sender, mut close_receiver) = watch::channel(false);
    close_sender.send(true).unwrap();

    tokio::time::timeout(
        std::time::Duration::from_secs(5),
        h.dispatcher.run(&mut rx, &mut close_receiver),
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_startup_launch_publishes_default_url() {
    let mut h = Harness::new();
    let default_url = h.config.browser.default_url.clone();
    h.dispatcher.launch(&default_url).await;

    assert_eq!(h.publisher.on(URL_STATE), vec![default_url.clone()]);
    assert_eq!(h.processes.live(), 1);
    h.publisher.clear();
    assert!(h.publisher.published().is_empty());
}
