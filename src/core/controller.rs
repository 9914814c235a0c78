//! 控制回路
//! Control Loop
//!
//! 控制器拥有所有共享状态，并在单个任务中依次处理链路事件、按键报告和到期作业。
//! 任意两个处理器都不会同时执行，这正是共享状态无需加锁的原因。
//!
//! The controller owns all shared state and handles link events, button reports
//! and due jobs one after another on a single task. No two handlers ever run at
//! the same time, which is what lets the shared state go without locks.

use super::{
    context::{LinkContext, LinkState, PowerSavingConfig},
    input::{self, ButtonEvent, InputAction},
    power::PowerFeatureController,
    scheduler::{JobId, Scheduler},
    state_machine::ConnectionStateMachine,
    transmission::TransmissionCycle,
};
use crate::{
    config::{Config, FeatureGates},
    error::{Error, Result},
    link::{LinkController, LinkEvent},
    transport::DatagramTransport,
};
use std::sync::Arc;
use tokio::{
    sync::{mpsc, watch},
    time::{self, Duration, Instant},
};
use tracing::{debug, info, trace, warn};

/// The connectivity controller.
///
/// 连接控制器。
pub struct Controller<L, T> {
    gates: FeatureGates,
    ctx: LinkContext,
    scheduler: Scheduler,
    machine: ConnectionStateMachine<L>,
    power: PowerFeatureController<L>,
    cycle: TransmissionCycle<T>,
}

impl<L: LinkController, T: DatagramTransport> Controller<L, T> {
    /// Builds a controller in the boot state: connecting, aiming for online.
    ///
    /// 构建处于启动状态的控制器：正在连接，目标为在线。
    pub fn new(config: &Config, link: Arc<L>, transport: T) -> Result<Self> {
        config.validate()?;
        let remote = config.remote_addr()?;
        let gates = config.features;
        Ok(Self {
            gates,
            ctx: LinkContext::new(PowerSavingConfig::from(&config.power)),
            scheduler: Scheduler::new(),
            machine: ConnectionStateMachine::new(link.clone(), gates.rai),
            power: PowerFeatureController::new(link, gates),
            cycle: TransmissionCycle::new(transport, remote, &config.transmission),
        })
    }

    pub fn context(&self) -> &LinkContext {
        &self.ctx
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn power(&self) -> &PowerFeatureController<L> {
        &self.power
    }

    pub fn subscribe(&self) -> watch::Receiver<LinkState> {
        self.ctx.subscribe()
    }

    /// Schedules `job` after `delay`, replacing a pending fire time.
    /// 在 `delay` 之后调度 `job`，替换待触发时间。
    pub fn schedule(&mut self, job: JobId, delay: Duration) {
        self.scheduler.schedule(job, delay);
    }

    /// Records a desired link state and schedules the transition job.
    /// 记录期望的链路状态并调度转换作业。
    pub fn request_transition(&mut self, target: LinkState) {
        self.machine
            .request_transition(&mut self.ctx, &mut self.scheduler, target);
    }

    pub fn handle_link_event(&mut self, event: LinkEvent) {
        self.machine.on_link_event(&mut self.ctx, &event);
    }

    /// Dispatches every button pressed in `report`.
    ///
    /// 分发 `report` 中每个被按下的按键。
    pub fn handle_buttons(&mut self, report: ButtonEvent) -> Vec<InputAction> {
        report
            .pressed()
            .map(|button| {
                let action = input::dispatch(
                    button,
                    &mut self.ctx,
                    &mut self.scheduler,
                    &self.machine,
                    self.gates,
                );
                debug!(button = ?button, action = ?action, "Button dispatched");
                action
            })
            .collect()
    }

    /// Runs every job that is due now. Jobs scheduled by the handlers wait for
    /// the next drain. Returns the jobs that ran, in order.
    ///
    /// 运行当前所有到期的作业。处理器调度的作业等待下一次清空。
    /// 按顺序返回已运行的作业。
    pub async fn run_due(&mut self) -> Vec<JobId> {
        let mark = self.scheduler.mark();
        let mut ran = Vec::new();
        while let Some(job) = self.scheduler.pop_due(mark) {
            self.run_job(job).await;
            ran.push(job);
        }
        ran
    }

    async fn run_job(&mut self, job: JobId) {
        trace!(job = ?job, "Running job");
        match job {
            JobId::Transmit => self.cycle.run(&self.ctx, &mut self.scheduler).await,
            JobId::ConnectTransition => self.machine.run_transition(&mut self.ctx, &self.power).await,
            JobId::PsmRenegotiate => {
                let enabled = self.ctx.power.psm_enabled;
                info!(enabled, "PSM mode setting is changed, renegotiate PSM");
                if let Err(e) = self.power.negotiate_power_saving_mode(enabled).await {
                    warn!(enabled, error = %e, "PSM request failed");
                }
            }
            JobId::RaiRenegotiate => {
                let enabled = self.ctx.power.rai_enabled;
                info!(enabled, "RAI setting changed");
                if let Err(e) = self.power.negotiate_early_release(enabled).await {
                    warn!(enabled, error = %e, "Release assistance request failed");
                }
            }
        }
    }

    /// Blocks until the first registration outcome: online, or offline when
    /// the network reports the device as not registered.
    ///
    /// 阻塞直到首次注册结果：在线，或网络报告设备未注册时的离线。
    pub async fn wait_for_registration(
        &mut self,
        events: &mut mpsc::Receiver<LinkEvent>,
    ) -> Result<LinkState> {
        while self.ctx.current() == LinkState::Connecting {
            debug!("Waiting for network registration");
            let event = events.recv().await.ok_or(Error::ChannelClosed)?;
            self.handle_link_event(event);
        }
        Ok(self.ctx.current())
    }

    /// Runs the cooperative loop until the link event stream ends.
    ///
    /// 运行协作式回路，直到链路事件流结束。
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<LinkEvent>,
        mut buttons: mpsc::Receiver<ButtonEvent>,
    ) -> Result<()> {
        let mut buttons_open = true;

        loop {
            self.run_due().await;
            let deadline = self.scheduler.next_deadline();

            tokio::select! {
                biased;
                event = events.recv() => match event {
                    Some(event) => self.handle_link_event(event),
                    None => {
                        warn!("Link event stream ended, stopping control loop");
                        return Err(Error::ChannelClosed);
                    }
                },
                report = buttons.recv(), if buttons_open => match report {
                    Some(report) => {
                        self.handle_buttons(report);
                    }
                    None => {
                        debug!("Button input closed");
                        buttons_open = false;
                    }
                },
                _ = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {}
            }
        }
    }
}
