//! 主机入口：初始化状态、启动链路、等待首次注册并进入协作式回路。
//! Host entry point: initializes state, brings the link up, waits for the first
//! registration and enters the cooperative loop.

use crate::{
    config::Config,
    core::{ButtonEvent, Controller, InputSource, JobId, LinkState},
    error::{Error, Result},
    link::{LinkController, LinkEvent},
    transport::DatagramTransport,
};
use std::sync::Arc;
use tokio::{sync::mpsc, time::Duration};
use tracing::{error, info, warn};

/// A controller that finished boot and is ready to loop.
///
/// 已完成启动、准备进入回路的控制器。
pub struct Booted<L, T> {
    pub controller: Controller<L, T>,
    pub events: mpsc::Receiver<LinkEvent>,
    pub buttons: mpsc::Receiver<ButtonEvent>,
    /// Outcome of the initial registration wait.
    /// 首次注册等待的结果。
    pub registration: LinkState,
}

impl<L: LinkController, T: DatagramTransport> Booted<L, T> {
    /// Enters the cooperative loop.
    /// 进入协作式回路。
    pub async fn run(self) -> Result<()> {
        self.controller.run(self.events, self.buttons).await
    }
}

/// Performs the one-time boot sequence.
///
/// Input and link initialization failures abort boot. A failed low power
/// configuration or connect request is only logged; losing the event stream
/// while waiting for registration aborts boot as well.
///
/// 执行一次性启动序列。
///
/// 输入和链路初始化失败会中止启动。低功耗配置或连接请求失败只会被记录；
/// 等待注册期间丢失事件流同样会中止启动。
pub async fn boot<L, T, I>(config: &Config, link: Arc<L>, transport: T, input: &mut I) -> Result<Booted<L, T>>
where
    L: LinkController,
    T: DatagramTransport,
    I: InputSource,
{
    info!("Link control sample has started");

    let (button_tx, buttons) = mpsc::channel(config.queues.buttons);
    if let Err(e) = input.start(button_tx).await {
        error!(error = %e, "Failed to init buttons");
        return Err(into_boot_error(e, Error::InputInit));
    }

    let mut controller = Controller::new(config, link.clone(), transport)?;

    if let Err(e) = link.init().await {
        error!(error = %e, "Failed to initialize the modem, aborting");
        return Err(into_boot_error(e, Error::LinkInit));
    }

    // Low power setup depends on the system mode chosen during modem init.
    if let Err(e) = controller.power().configure_low_power(&config.power).await {
        warn!(error = %e, "Unable to set low power configuration");
    }

    let (event_tx, mut events) = mpsc::channel(config.queues.link_events);
    if let Err(e) = link.connect(event_tx).await {
        error!(error = %e, "Connecting to LTE network failed");
    }

    let registration = controller.wait_for_registration(&mut events).await?;
    info!(state = ?registration, "Initial registration complete");

    controller.schedule(JobId::Transmit, Duration::ZERO);

    Ok(Booted {
        controller,
        events,
        buttons,
        registration,
    })
}

/// Boots and runs the controller. Only returns on a fatal error.
///
/// 启动并运行控制器。仅在发生致命错误时返回。
pub async fn run<L, T, I>(config: Config, link: Arc<L>, transport: T, mut input: I) -> Result<()>
where
    L: LinkController,
    T: DatagramTransport,
    I: InputSource,
{
    boot(&config, link, transport, &mut input).await?.run().await
}

fn into_boot_error(err: Error, wrap: fn(String) -> Error) -> Error {
    match err {
        Error::InputInit(_) | Error::LinkInit(_) => err,
        other => wrap(other.to_string()),
    }
}
