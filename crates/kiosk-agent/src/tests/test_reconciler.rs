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

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::host::device::MockDeviceControl;
use crate::reconciler::DisplayReconciler;
use crate::state::{DeviceState, DisplayPower};
use crate::tests::common::{FakeDevice, RecordingPublisher};

const DISPLAY_STATE: &str = "pi/display/state";

fn reconciler(
    samples: Vec<Option<DisplayPower>>,
) -> (DisplayReconciler, Arc<RecordingPublisher>, crate::state::SharedState) {
    let publisher = Arc::new(RecordingPublisher::default());
    let state = DeviceState::shared("http://a.local");
    let reconciler = DisplayReconciler::new(
        Arc::new(FakeDevice::with_samples(samples)),
        publisher.clone(),
        state.clone(),
        DISPLAY_STATE,
    );
    (reconciler, publisher, state)
}

#[tokio::test]
async fn test_seed_then_publish_only_on_change() {
    let on = Some(DisplayPower::On);
    let off = Some(DisplayPower::Off);
    let (mut reconciler, publisher, state) = reconciler(vec![on, on, on, on, off, off, on]);

    assert_eq!(reconciler.seed().await, DisplayPower::On);
    assert_eq!(publisher.on(DISPLAY_STATE), vec!["ON"]);

    // Three identical polls publish nothing.
    for _ in 0..3 {
        assert!(!reconciler.tick().await);
    }
    assert_eq!(publisher.on(DISPLAY_STATE).len(), 1);

    assert!(reconciler.tick().await);
    assert_eq!(state.lock().await.display, DisplayPower::Off);
    assert!(!reconciler.tick().await);
    assert!(reconciler.tick().await);

    assert_eq!(publisher.on(DISPLAY_STATE), vec!["ON", "OFF", "ON"]);
}

#[tokio::test]
async fn test_query_failure_is_published_as_unknown() {
    let (mut reconciler, publisher, state) = reconciler(vec![
        Some(DisplayPower::Off),
        None,
        None,
        Some(DisplayPower::Off),
    ]);
    reconciler.seed().await;
    assert!(reconciler.tick().await);
    assert_eq!(state.lock().await.display, DisplayPower::Unknown);
    assert!(!reconciler.tick().await);
    assert!(reconciler.tick().await);

    assert_eq!(publisher.on(DISPLAY_STATE), vec!["OFF", "unknown", "OFF"]);
}

#[tokio::test]
async fn test_seed_publishes_even_when_unchanged() {
    let (mut reconciler, publisher, _) = reconciler(vec![None]);
    assert_eq!(reconciler.seed().await, DisplayPower::Unknown);
    assert_eq!(publisher.on(DISPLAY_STATE), vec!["unknown"]);
}

#[tokio::test]
async fn test_run_with_mocked_device() {
    let mut device = MockDeviceControl::new();
    device
        .expect_display_power()
        .returning(|| Ok(DisplayPower::Off));
    device.expect_set_display_power().never();

    let publisher = Arc::new(RecordingPublisher::default());
    let state = DeviceState::shared("http://a.local");
    let mut reconciler = DisplayReconciler::new(
        Arc::new(device),
        publisher.clone(),
        state.clone(),
        DISPLAY_STATE,
    );

    let (close_sender, mut close_receiver) = watch::channel(false);
    let task = tokio::spawn(async move {
        reconciler
            .run(Duration::from_millis(10), &mut close_receiver)
            .await
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    close_sender.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap();

    // Many polls, one value: only the seed went out.
    assert_eq!(publisher.on(DISPLAY_STATE), vec!["OFF"]);
    assert_eq!(state.lock().await.display, DisplayPower::Off);
}
