//! Full control loop over a simulated modem and a real UDP endpoint.
//! 基于模拟调制解调器和真实UDP端点的完整控制回路测试。

pub mod common;

use common::harness::{TestButtons, TestHarness};
use lte_link_control::{
    bootstrap,
    core::{Button, ButtonEvent, LinkState},
    error::Error,
    sim::LinkCall,
    transport::UdpTransport,
};
use std::time::Duration;

#[tokio::test]
async fn test_boot_sends_first_datagram_and_repeats() {
    let harness = TestHarness::new().await;
    let modem = harness.modem();
    let mut buttons = TestButtons::default();

    let booted = bootstrap::boot(&harness.config, modem.clone(), UdpTransport, &mut buttons)
        .await
        .unwrap();
    assert_eq!(booted.registration, LinkState::Online);
    let loop_task = tokio::spawn(booted.run());

    let first = harness.recv_datagram(Duration::from_secs(2)).await;
    assert_eq!(first, vec![0u8; harness.config.transmission.payload_size]);

    // The cycle reschedules itself after the configured interval.
    let second = harness.recv_datagram(Duration::from_secs(2)).await;
    assert_eq!(second.len(), harness.config.transmission.payload_size);

    let calls = modem.calls().await;
    assert_eq!(
        &calls[..4],
        &[
            LinkCall::Init,
            LinkCall::RequestPsm(true),
            LinkCall::RequestEdrx(false),
            LinkCall::AtCommand("AT%REL14FEAT=0,1,0,0,0".into()),
        ]
    );
    assert_eq!(calls[4], LinkCall::Connect);

    loop_task.abort();
}

#[tokio::test]
async fn test_toggle_offline_and_back_online() {
    let harness = TestHarness::new().await;
    let modem = harness.modem();
    let mut buttons = TestButtons::default();

    let booted = bootstrap::boot(&harness.config, modem.clone(), UdpTransport, &mut buttons)
        .await
        .unwrap();
    let mut state = booted.controller.subscribe();
    let loop_task = tokio::spawn(booted.run());
    modem.clear_calls().await;

    buttons.press(ButtonEvent::press(Button::ToggleLink)).await;
    tokio::time::timeout(Duration::from_secs(2), state.wait_for(|s| *s == LinkState::Offline))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(modem.calls().await, vec![LinkCall::GoOffline]);

    buttons.press(ButtonEvent::press(Button::ToggleLink)).await;
    tokio::time::timeout(Duration::from_secs(2), state.wait_for(|s| *s == LinkState::Online))
        .await
        .unwrap()
        .unwrap();

    let calls = modem.calls().await;
    assert_eq!(
        &calls[1..],
        &[
            LinkCall::GoOffline,
            LinkCall::SystemMode,
            LinkCall::AtCommand("AT%RAI=0".into()),
            LinkCall::ResumeNormal,
        ]
    );

    loop_task.abort();
}

#[tokio::test]
async fn test_transmit_button_sends_immediately() {
    let mut harness = TestHarness::new().await;
    harness.config.transmission.interval = Duration::from_secs(3600);
    let modem = harness.modem();
    let mut buttons = TestButtons::default();

    let booted = bootstrap::boot(&harness.config, modem, UdpTransport, &mut buttons)
        .await
        .unwrap();
    let loop_task = tokio::spawn(booted.run());

    harness.recv_datagram(Duration::from_secs(2)).await;
    buttons.press(ButtonEvent::press(Button::Transmit)).await;
    harness.recv_datagram(Duration::from_secs(2)).await;

    loop_task.abort();
}

#[tokio::test]
async fn test_loop_stops_when_event_stream_ends() {
    let harness = TestHarness::new().await;
    let modem = harness.modem();
    let mut buttons = TestButtons::default();

    let booted = bootstrap::boot(&harness.config, modem.clone(), UdpTransport, &mut buttons)
        .await
        .unwrap();
    let mut state = booted.controller.subscribe();
    let loop_task = tokio::spawn(booted.run());

    state.wait_for(|s| *s == LinkState::Online).await.unwrap();
    modem.disconnect().await;

    let result = tokio::time::timeout(Duration::from_secs(2), loop_task)
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(result, Err(Error::ChannelClosed)));
}
