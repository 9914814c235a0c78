//! Runs the link controller against a simulated modem and a real UDP socket.
//!
//! Buttons are read from stdin: `1` transmit, `2` toggle online/offline,
//! `3` toggle PSM, `4` toggle RAI.
//!
//! 针对模拟调制解调器和真实UDP套接字运行链路控制器。
//!
//! 从标准输入读取按键：`1` 发送，`2` 切换在线/离线，`3` 切换PSM，`4` 切换RAI。

use async_trait::async_trait;
use clap::Parser;
use lte_link_control::{
    bootstrap,
    config::Config,
    core::{Button, ButtonEvent, InputSource},
    error::Result,
    sim::{SimConfig, SimulatedModem},
    transport::UdpTransport,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Runs the link controller against a simulated modem")]
struct Args {
    /// Server receiving the periodic datagram, as ip:port
    server: Option<SocketAddr>,
}

struct StdinButtons;

#[async_trait]
impl InputSource for StdinButtons {
    async fn start(&mut self, reports: mpsc::Sender<ButtonEvent>) -> Result<()> {
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let button = match line.trim() {
                    "1" => Button::Transmit,
                    "2" => Button::ToggleLink,
                    "3" => Button::TogglePsm,
                    "4" => Button::ToggleRai,
                    "" => continue,
                    other => {
                        warn!(input = other, "Unknown button, use 1-4");
                        continue;
                    }
                };
                if reports.send(ButtonEvent::press(button)).await.is_err() {
                    break;
                }
            }
            debug!("Stdin closed, no more button input");
        });
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lte_link_control=info,lte_link_sim=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = Config::default();
    if let Some(server) = args.server {
        config.server.address = server.ip().to_string();
        config.server.port = server.port();
    }

    let modem = Arc::new(SimulatedModem::new(SimConfig::default()));
    if let Err(e) = bootstrap::run(config, modem, UdpTransport, StdinButtons).await {
        error!(error = %e, "Link controller stopped");
        std::process::exit(1);
    }
}
