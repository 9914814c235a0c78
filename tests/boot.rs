//! Boot sequence failure handling.
//! 启动序列的失败处理。

pub mod common;

use common::harness::{TestButtons, TestHarness, init_tracing};
use lte_link_control::{
    bootstrap,
    core::LinkState,
    error::Error,
    sim::{LinkCall, LinkOp, ScriptedTransport, SimConfig, SimulatedModem},
};
use std::{sync::Arc, time::Duration};

fn quiet_modem() -> Arc<SimulatedModem> {
    Arc::new(SimulatedModem::new(SimConfig::quiet()))
}

#[tokio::test]
async fn test_button_init_failure_is_fatal() {
    let harness = TestHarness::new().await;
    let modem = quiet_modem();
    let mut buttons = TestButtons::failing();

    let result = bootstrap::boot(&harness.config, modem.clone(), ScriptedTransport::new(), &mut buttons).await;
    assert!(matches!(result, Err(Error::InputInit(_))));
    assert!(modem.calls().await.is_empty());
}

#[tokio::test]
async fn test_modem_init_failure_is_fatal() {
    let harness = TestHarness::new().await;
    let modem = quiet_modem();
    modem.fail(LinkOp::Init).await;
    let mut buttons = TestButtons::default();

    let result = bootstrap::boot(&harness.config, modem.clone(), ScriptedTransport::new(), &mut buttons).await;
    assert!(matches!(result, Err(Error::LinkInit(_))));
    assert_eq!(modem.calls().await, vec![LinkCall::Init]);
}

#[tokio::test]
async fn test_invalid_server_address_is_fatal() {
    let mut harness = TestHarness::new().await;
    harness.config.server.address = "udp.example".to_string();
    let mut buttons = TestButtons::default();

    let result = bootstrap::boot(&harness.config, quiet_modem(), ScriptedTransport::new(), &mut buttons).await;
    assert!(matches!(result, Err(Error::AddressParse(_))));
}

#[tokio::test]
async fn test_unschedulable_interval_is_fatal() {
    let mut harness = TestHarness::new().await;
    harness.config.transmission.interval = Duration::from_secs(u64::MAX);
    let modem = quiet_modem();
    let mut buttons = TestButtons::default();

    let result = bootstrap::boot(&harness.config, modem.clone(), ScriptedTransport::new(), &mut buttons).await;
    assert!(matches!(result, Err(Error::IntervalOutOfRange(_))));
    assert!(modem.calls().await.is_empty());
}

#[tokio::test]
async fn test_low_power_failure_does_not_abort_boot() {
    init_tracing();
    let harness = TestHarness::new().await;
    let modem = Arc::new(SimulatedModem::new(SimConfig {
        registration_delay: Duration::from_millis(10),
        ..SimConfig::default()
    }));
    modem.fail(LinkOp::RequestPsm).await;
    modem.fail(LinkOp::AtCommand).await;
    let mut buttons = TestButtons::default();

    let booted = bootstrap::boot(&harness.config, modem, ScriptedTransport::new(), &mut buttons)
        .await
        .unwrap();
    assert_eq!(booted.registration, LinkState::Online);
    assert!(booted.controller.scheduler().is_pending(lte_link_control::core::JobId::Transmit));
}

#[tokio::test]
async fn test_connect_failure_ends_registration_wait() {
    let harness = TestHarness::new().await;
    let modem = quiet_modem();
    modem.fail(LinkOp::Connect).await;
    let mut buttons = TestButtons::default();

    let result = bootstrap::boot(&harness.config, modem, ScriptedTransport::new(), &mut buttons).await;
    assert!(matches!(result, Err(Error::ChannelClosed)));
}

#[tokio::test(start_paused = true)]
async fn test_registration_wait_ends_offline_when_not_registered() {
    let harness = TestHarness::new().await;
    let modem = quiet_modem();
    let mut buttons = TestButtons::default();
    let events_modem = modem.clone();

    let boot = tokio::spawn({
        let config = harness.config.clone();
        async move { bootstrap::boot(&config, modem, ScriptedTransport::new(), &mut buttons).await }
    });

    tokio::time::sleep(Duration::from_millis(10)).await;
    events_modem
        .emit(lte_link_control::link::LinkEvent::RegistrationStatus(
            lte_link_control::link::RegistrationStatus::Searching,
        ))
        .await;
    events_modem
        .emit(lte_link_control::link::LinkEvent::RegistrationStatus(
            lte_link_control::link::RegistrationStatus::NotRegistered,
        ))
        .await;

    let booted = boot.await.unwrap().unwrap();
    assert_eq!(booted.registration, LinkState::Offline);
}
