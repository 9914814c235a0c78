//! Common testing infrastructure for the control core.

use super::controller::Controller;
use crate::{
    config::{Config, FeatureGates},
    sim::{ScriptedTransport, SimConfig, SimulatedModem},
};
use std::{sync::Arc, sync::Once, time::Duration};

/// Initializes tracing for tests, ensuring it's only done once.
pub fn init_tracing() {
    static TRACING_INIT: Once = Once::new();
    TRACING_INIT.call_once(|| {
        let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "lte_link_control=debug".to_string());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Config with every feature gate on and a short interval.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.server.address = "192.0.2.10".to_string();
    config.transmission.interval = Duration::from_secs(30);
    config.features = FeatureGates {
        psm: true,
        rai: true,
        edrx: true,
    };
    config
}

pub struct TestController {
    pub controller: Controller<SimulatedModem, ScriptedTransport>,
    pub modem: Arc<SimulatedModem>,
    pub transport: ScriptedTransport,
}

/// A controller over a quiet simulated modem and a scripted transport.
pub fn test_controller(config: &Config, sim: SimConfig) -> TestController {
    init_tracing();
    let modem = Arc::new(SimulatedModem::new(sim));
    let transport = ScriptedTransport::new();
    let controller = Controller::new(config, modem.clone(), transport.clone()).unwrap();
    TestController {
        controller,
        modem,
        transport,
    }
}
