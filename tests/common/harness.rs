//! tests/common/harness.rs
use async_trait::async_trait;
use lte_link_control::{
    config::{Config, FeatureGates},
    core::{ButtonEvent, InputSource},
    error::{Error, Result},
    sim::{SimConfig, SimulatedModem},
};
use std::{
    net::SocketAddr,
    sync::{Arc, Once},
    time::Duration,
};
use tokio::{net::UdpSocket, sync::mpsc};

/// Initializes tracing for tests, ensuring it's only done once.
pub fn init_tracing() {
    static TRACING_INIT: Once = Once::new();
    TRACING_INIT.call_once(|| {
        let filter = std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "lte_link_control=debug".to_string());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}

/// Button input whose sender is handed back to the test after boot.
#[derive(Default)]
pub struct TestButtons {
    pub reports: Option<mpsc::Sender<ButtonEvent>>,
    pub fail: bool,
}

impl TestButtons {
    pub fn failing() -> Self {
        Self {
            reports: None,
            fail: true,
        }
    }

    pub async fn press(&self, event: ButtonEvent) {
        self.reports
            .as_ref()
            .expect("buttons not started")
            .send(event)
            .await
            .expect("control loop gone");
    }
}

#[async_trait]
impl InputSource for TestButtons {
    async fn start(&mut self, reports: mpsc::Sender<ButtonEvent>) -> Result<()> {
        if self.fail {
            return Err(Error::InputInit("no button device".to_string()));
        }
        self.reports = Some(reports);
        Ok(())
    }
}

/// A local UDP server standing in for the remote endpoint.
pub struct TestHarness {
    pub server: UdpSocket,
    pub server_addr: SocketAddr,
    pub config: Config,
}

impl TestHarness {
    pub async fn new() -> Self {
        init_tracing();
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let server_addr = server.local_addr().unwrap();

        let mut config = Config::default();
        config.server.address = server_addr.ip().to_string();
        config.server.port = server_addr.port();
        config.transmission.interval = Duration::from_millis(300);
        config.features = FeatureGates {
            psm: true,
            rai: true,
            edrx: false,
        };

        Self {
            server,
            server_addr,
            config,
        }
    }

    pub fn modem(&self) -> Arc<SimulatedModem> {
        Arc::new(SimulatedModem::new(SimConfig {
            registration_delay: Duration::from_millis(50),
            ..SimConfig::default()
        }))
    }

    /// Waits for the next datagram and returns its payload.
    pub async fn recv_datagram(&self, within: Duration) -> Vec<u8> {
        let mut buf = vec![0xffu8; 2048];
        let (len, _) = tokio::time::timeout(within, self.server.recv_from(&mut buf))
            .await
            .expect("no datagram before timeout")
            .unwrap();
        buf.truncate(len);
        buf
    }
}
