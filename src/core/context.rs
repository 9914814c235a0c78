//! Process-wide link context shared by every job handler.
//!
//! All fields are mutated only from the control loop task, which runs one
//! handler at a time, so no locking is needed.
//!
//! 所有作业处理器共享的进程级链路上下文。
//!
//! 所有字段只会在控制回路任务中修改，该任务一次只运行一个处理器，因此无需加锁。

use crate::config::PowerConfig;
use tokio::sync::watch;
use tracing::info;

/// Link connection state.
///
/// 链路连接状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkState {
    /// A transition is in flight or registration has not been confirmed yet.
    /// 转换正在进行中或注册尚未确认。
    Connecting,
    /// Registered to the home or a roaming network.
    /// 已注册到归属网络或漫游网络。
    Online,
    /// The network reported the device as not registered.
    /// 网络报告设备未注册。
    Offline,
}

/// Power-saving feature preferences, toggled by user input.
///
/// 省电功能偏好，由用户输入切换。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerSavingConfig {
    pub psm_enabled: bool,
    pub rai_enabled: bool,
}

impl From<&PowerConfig> for PowerSavingConfig {
    fn from(config: &PowerConfig) -> Self {
        Self {
            psm_enabled: config.psm_enabled,
            rai_enabled: config.rai_enabled,
        }
    }
}

/// Observed and desired link state plus power preferences.
///
/// 观察到的和期望的链路状态以及省电偏好。
#[derive(Debug)]
pub struct LinkContext {
    current: LinkState,
    /// Desired state, written by input and read by the transition job.
    /// 期望状态，由输入写入，由转换作业读取。
    pub target: LinkState,
    pub power: PowerSavingConfig,
    state_tx: watch::Sender<LinkState>,
}

impl LinkContext {
    /// Boot-time context: busy until the first registration, aiming for online.
    ///
    /// 启动时的上下文：在首次注册前处于忙状态，目标为在线。
    pub fn new(power: PowerSavingConfig) -> Self {
        let (state_tx, _) = watch::channel(LinkState::Connecting);
        Self {
            current: LinkState::Connecting,
            target: LinkState::Online,
            power,
            state_tx,
        }
    }

    pub fn current(&self) -> LinkState {
        self.current
    }

    /// Records the observed state and publishes it to subscribers.
    ///
    /// 记录观察到的状态并发布给订阅者。
    pub fn set_current(&mut self, state: LinkState) {
        if self.current != state {
            info!(from = ?self.current, to = ?state, "Link state changed");
        }
        self.current = state;
        self.state_tx.send_replace(state);
    }

    /// Subscribes to changes of the observed state.
    ///
    /// 订阅观察状态的变化。
    pub fn subscribe(&self) -> watch::Receiver<LinkState> {
        self.state_tx.subscribe()
    }
}
