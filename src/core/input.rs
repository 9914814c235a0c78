//! 输入分发器
//! Input Dispatcher
//!
//! 将离散的按键事件映射为共享状态的修改和作业的（重新）调度。
//! 分发器从不内联执行控制逻辑。
//!
//! Maps discrete button presses to shared state changes and job
//! (re)scheduling. The dispatcher never runs controller logic inline.

use super::{
    context::{LinkContext, LinkState},
    scheduler::{JobId, Scheduler},
    state_machine::ConnectionStateMachine,
    transmission::transmit_on_demand,
};
use crate::{config::FeatureGates, error::Result, link::LinkController};
use async_trait::async_trait;
use tokio::{sync::mpsc, time::Duration};
use tracing::{info, warn};

/// The four user buttons.
///
/// 四个用户按键。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    /// 立即发送
    /// Transmit now
    Transmit,
    /// 在线/离线切换
    /// Toggle online/offline
    ToggleLink,
    /// 切换PSM
    /// Toggle PSM
    TogglePsm,
    /// 切换释放辅助
    /// Toggle release assistance
    ToggleRai,
}

impl Button {
    pub const ALL: [Button; 4] = [
        Button::Transmit,
        Button::ToggleLink,
        Button::TogglePsm,
        Button::ToggleRai,
    ];

    pub fn mask(self) -> u32 {
        match self {
            Button::Transmit => 1 << 0,
            Button::ToggleLink => 1 << 1,
            Button::TogglePsm => 1 << 2,
            Button::ToggleRai => 1 << 3,
        }
    }
}

/// Raw button report: the level of every button and which ones changed.
///
/// 原始按键报告：每个按键的电平以及哪些按键发生了变化。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    pub state: u32,
    pub changed: u32,
}

impl ButtonEvent {
    /// A report of `button` going down.
    /// `button` 被按下的报告。
    pub fn press(button: Button) -> Self {
        Self {
            state: button.mask(),
            changed: button.mask(),
        }
    }

    /// Buttons that went down in this report, in dispatch order.
    ///
    /// 本次报告中被按下的按键，按分发顺序排列。
    pub fn pressed(&self) -> impl Iterator<Item = Button> + '_ {
        let edges = self.state & self.changed;
        Button::ALL
            .into_iter()
            .filter(move |button| edges & button.mask() != 0)
    }
}

/// Source of button reports.
///
/// 按键报告的来源。
#[async_trait]
pub trait InputSource: Send + 'static {
    /// Starts delivering reports on `reports`. Failure is fatal at boot.
    ///
    /// 开始通过 `reports` 投递报告。启动时失败是致命的。
    async fn start(&mut self, reports: mpsc::Sender<ButtonEvent>) -> Result<()>;
}

/// What a button press resulted in.
///
/// 一次按键产生的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    TransmitRequested,
    TransitionRequested(LinkState),
    PsmToggled(bool),
    RaiToggled(bool),
    Ignored,
}

/// Applies one button press.
///
/// 应用一次按键。
pub fn dispatch<L: LinkController>(
    button: Button,
    ctx: &mut LinkContext,
    scheduler: &mut Scheduler,
    machine: &ConnectionStateMachine<L>,
    gates: FeatureGates,
) -> InputAction {
    match button {
        Button::Transmit => {
            if transmit_on_demand(ctx, scheduler) {
                InputAction::TransmitRequested
            } else {
                InputAction::Ignored
            }
        }
        Button::ToggleLink => {
            let target = match ctx.current() {
                LinkState::Online => LinkState::Offline,
                LinkState::Offline => LinkState::Online,
                LinkState::Connecting => {
                    info!("Link transition in progress, toggle ignored");
                    return InputAction::Ignored;
                }
            };
            machine.request_transition(ctx, scheduler, target);
            InputAction::TransitionRequested(target)
        }
        Button::TogglePsm => {
            if !gates.psm {
                warn!("PSM is not enabled in this build");
                return InputAction::Ignored;
            }
            ctx.power.psm_enabled = !ctx.power.psm_enabled;
            scheduler.schedule(JobId::PsmRenegotiate, Duration::ZERO);
            InputAction::PsmToggled(ctx.power.psm_enabled)
        }
        Button::ToggleRai => {
            if !gates.rai {
                warn!("RAI is not enabled in this build");
                return InputAction::Ignored;
            }
            ctx.power.rai_enabled = !ctx.power.rai_enabled;
            scheduler.schedule(JobId::RaiRenegotiate, Duration::ZERO);
            InputAction::RaiToggled(ctx.power.rai_enabled)
        }
    }
}
