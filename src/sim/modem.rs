//! A simulated cellular modem.
//!
//! 模拟蜂窝调制解调器。

use crate::{
    error::{Error, Result},
    link::{LinkController, LinkEvent, RegistrationStatus, RrcMode, SystemMode},
};
use async_trait::async_trait;
use std::{collections::HashSet, sync::Arc, time::Duration};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};

/// Error code reported for injected failures.
const SIM_FAILURE_CODE: i32 = -14;

/// Link operations that can be made to fail.
///
/// 可以注入失败的链路操作。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkOp {
    Init,
    Connect,
    GoOffline,
    ResumeNormal,
    RequestPsm,
    RequestEdrx,
    SystemMode,
    AtCommand,
}

impl LinkOp {
    fn name(self) -> &'static str {
        match self {
            LinkOp::Init => "init",
            LinkOp::Connect => "connect",
            LinkOp::GoOffline => "go_offline",
            LinkOp::ResumeNormal => "resume_normal",
            LinkOp::RequestPsm => "request_psm",
            LinkOp::RequestEdrx => "request_edrx",
            LinkOp::SystemMode => "system_mode",
            LinkOp::AtCommand => "at_command",
        }
    }
}

/// A call received by the simulated modem.
///
/// 模拟调制解调器收到的调用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkCall {
    Init,
    Connect,
    GoOffline,
    ResumeNormal,
    RequestPsm(bool),
    RequestEdrx(bool),
    SystemMode,
    AtCommand(String),
}

/// Behaviour of the simulated modem.
///
/// 模拟调制解调器的行为配置。
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Mode reported by `system_mode`.
    /// `system_mode` 报告的模式。
    pub system_mode: SystemMode,
    /// Emit network events in reaction to calls.
    /// 对调用做出反应并发出网络事件。
    pub emit_events: bool,
    /// Time between resuming the radio and the registration report.
    /// 从恢复无线电到上报注册之间的时间。
    pub registration_delay: Duration,
    /// Register as roaming instead of home.
    /// 以漫游而非归属网络注册。
    pub roaming: bool,
}

impl SimConfig {
    /// A modem that records calls but never emits events on its own.
    ///
    /// 只记录调用、从不主动发出事件的调制解调器。
    pub fn quiet() -> Self {
        Self {
            emit_events: false,
            ..Self::default()
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            system_mode: SystemMode::LteMGps,
            emit_events: true,
            registration_delay: Duration::from_secs(2),
            roaming: false,
        }
    }
}

#[derive(Debug, Default)]
struct SimState {
    calls: Vec<LinkCall>,
    failures: HashSet<LinkOp>,
    events: Option<mpsc::Sender<LinkEvent>>,
    system_mode: Option<SystemMode>,
    /// Bumped whenever the radio changes mode so stale delayed reports are dropped.
    generation: u64,
}

/// A modem that follows the call protocol of a real one.
///
/// 遵循真实调制解调器调用协议的模拟调制解调器。
#[derive(Debug)]
pub struct SimulatedModem {
    config: SimConfig,
    state: Arc<Mutex<SimState>>,
}

impl SimulatedModem {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(SimState::default())),
        }
    }

    /// Calls received so far, in order.
    /// 到目前为止按顺序收到的调用。
    pub async fn calls(&self) -> Vec<LinkCall> {
        self.state.lock().await.calls.clone()
    }

    pub async fn clear_calls(&self) {
        self.state.lock().await.calls.clear();
    }

    /// Makes every future call of `op` fail.
    /// 使之后每次 `op` 调用都失败。
    pub async fn fail(&self, op: LinkOp) {
        self.state.lock().await.failures.insert(op);
    }

    pub async fn recover(&self, op: LinkOp) {
        self.state.lock().await.failures.remove(&op);
    }

    pub async fn set_system_mode(&self, mode: SystemMode) {
        self.state.lock().await.system_mode = Some(mode);
    }

    /// Delivers `event` to the connected control loop, if any.
    ///
    /// 将 `event` 投递给已连接的控制回路（如果有）。
    pub async fn emit(&self, event: LinkEvent) {
        let tx = self.state.lock().await.events.clone();
        if let Some(tx) = tx {
            Self::deliver(&tx, event);
        }
    }

    /// Drops the event sender, ending the event stream.
    /// 丢弃事件发送端，结束事件流。
    pub async fn disconnect(&self) {
        self.state.lock().await.events = None;
    }

    fn deliver(tx: &mpsc::Sender<LinkEvent>, event: LinkEvent) {
        // The control loop may be the caller; never wait on its queue.
        if let Err(e) = tx.try_send(event) {
            warn!(error = %e, "Simulated link event dropped");
        }
    }

    /// Records the call and returns the injected failure, if any.
    async fn enter(&self, call: LinkCall, op: LinkOp) -> Result<()> {
        let mut state = self.state.lock().await;
        state.calls.push(call);
        if state.failures.contains(&op) {
            return Err(Error::LinkControl {
                operation: op.name(),
                code: SIM_FAILURE_CODE,
            });
        }
        Ok(())
    }

    /// Emits immediately when the simulation is active.
    async fn notify(&self, event: LinkEvent) {
        if self.config.emit_events {
            self.emit(event).await;
        }
    }

    /// Reports a successful registration after the configured delay, unless
    /// the radio changes mode in the meantime.
    async fn schedule_registration(&self) {
        if !self.config.emit_events {
            return;
        }
        let (tx, generation) = {
            let mut state = self.state.lock().await;
            state.generation += 1;
            match state.events.clone() {
                Some(tx) => (tx, state.generation),
                None => return,
            }
        };

        Self::deliver(&tx, LinkEvent::RegistrationStatus(RegistrationStatus::Searching));

        let status = if self.config.roaming {
            RegistrationStatus::RegisteredRoaming
        } else {
            RegistrationStatus::RegisteredHome
        };
        let delay = self.config.registration_delay;
        let state = self.state.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Re-read the sender so a disconnect during the delay ends the stream.
            let tx = {
                let state = state.lock().await;
                if state.generation != generation {
                    debug!("Radio changed mode before registration, report dropped");
                    return;
                }
                match state.events.clone() {
                    Some(tx) => tx,
                    None => return,
                }
            };
            Self::deliver(
                &tx,
                LinkEvent::CellUpdate {
                    id: rand::random::<u32>() & 0x0fff_ffff,
                    tac: rand::random::<u32>() & 0xffff,
                },
            );
            Self::deliver(&tx, LinkEvent::RegistrationStatus(status));
            Self::deliver(&tx, LinkEvent::RrcUpdate(RrcMode::Connected));
        });
    }
}

#[async_trait]
impl LinkController for SimulatedModem {
    async fn init(&self) -> Result<()> {
        self.enter(LinkCall::Init, LinkOp::Init).await
    }

    async fn connect(&self, events: mpsc::Sender<LinkEvent>) -> Result<()> {
        self.enter(LinkCall::Connect, LinkOp::Connect).await?;
        self.state.lock().await.events = Some(events);
        self.schedule_registration().await;
        Ok(())
    }

    async fn go_offline(&self) -> Result<()> {
        self.enter(LinkCall::GoOffline, LinkOp::GoOffline).await?;
        self.state.lock().await.generation += 1;
        self.notify(LinkEvent::RegistrationStatus(RegistrationStatus::NotRegistered))
            .await;
        Ok(())
    }

    async fn resume_normal(&self) -> Result<()> {
        self.enter(LinkCall::ResumeNormal, LinkOp::ResumeNormal).await?;
        self.schedule_registration().await;
        Ok(())
    }

    async fn request_psm(&self, enabled: bool) -> Result<()> {
        self.enter(LinkCall::RequestPsm(enabled), LinkOp::RequestPsm)
            .await?;
        let (tau, active_time) = if enabled { (3240, 60) } else { (-1, -1) };
        self.notify(LinkEvent::PsmUpdate { tau, active_time }).await;
        Ok(())
    }

    async fn request_edrx(&self, enabled: bool) -> Result<()> {
        self.enter(LinkCall::RequestEdrx(enabled), LinkOp::RequestEdrx)
            .await?;
        if enabled {
            self.notify(LinkEvent::EdrxUpdate {
                edrx: 81.92,
                ptw: 1.28,
            })
            .await;
        }
        Ok(())
    }

    async fn system_mode(&self) -> Result<SystemMode> {
        self.enter(LinkCall::SystemMode, LinkOp::SystemMode).await?;
        let configured = self.state.lock().await.system_mode;
        Ok(configured.unwrap_or(self.config.system_mode))
    }

    async fn at_command(&self, command: &str) -> Result<()> {
        self.enter(LinkCall::AtCommand(command.to_string()), LinkOp::AtCommand)
            .await
            .map_err(|e| match e {
                Error::LinkControl { code, .. } => Error::AtCommand {
                    command: command.to_string(),
                    code,
                },
                other => other,
            })
    }
}
