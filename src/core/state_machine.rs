//! 连接状态机
//! Connection State Machine
//!
//! 转换作业只负责把无线电驱动到请求的模式；观察到的状态只由链路的
//! 注册事件更新，在网络确认之前不会宣告成功。
//!
//! The transition job only drives the radio into the requested mode. The
//! observed state is updated by registration events from the link alone, so
//! success is never declared before the network confirms it.

use super::{
    context::{LinkContext, LinkState},
    power::PowerFeatureController,
    scheduler::{JobId, Scheduler},
};
use crate::link::{LinkController, LinkEvent, RegistrationStatus, RrcMode};
use std::sync::Arc;
use tokio::time::Duration;
use tracing::{debug, info, warn};

/// Drives the radio between online and offline.
///
/// 在在线和离线之间驱动无线电。
pub struct ConnectionStateMachine<L> {
    link: Arc<L>,
    /// Renegotiate release assistance while the radio is offline.
    /// 在无线电离线期间重新协商释放辅助。
    rai_gate: bool,
}

impl<L: LinkController> ConnectionStateMachine<L> {
    pub fn new(link: Arc<L>, rai_gate: bool) -> Self {
        Self { link, rai_gate }
    }

    /// Records the desired state and schedules the transition job to run now.
    ///
    /// 记录期望状态并调度转换作业立即运行。
    pub fn request_transition(
        &self,
        ctx: &mut LinkContext,
        scheduler: &mut Scheduler,
        target: LinkState,
    ) {
        debug!(current = ?ctx.current(), target = ?target, "Link transition requested");
        ctx.target = target;
        scheduler.schedule(JobId::ConnectTransition, Duration::ZERO);
    }

    /// The transition job.
    ///
    /// Link control failures are logged and the sequence carries on as if the
    /// step succeeded.
    ///
    /// 转换作业。
    ///
    /// 链路控制失败只会被记录，序列会像该步骤成功一样继续执行。
    pub async fn run_transition(&self, ctx: &mut LinkContext, power: &PowerFeatureController<L>) {
        ctx.set_current(LinkState::Connecting);

        match ctx.target {
            // Busy marker, nothing to drive.
            LinkState::Connecting => {}
            LinkState::Offline => {
                info!("Taking link offline");
                self.go_offline().await;
            }
            LinkState::Online => {
                info!("Bringing link online");
                // Start from a known radio state before reconfiguring.
                self.go_offline().await;

                if self.rai_gate {
                    let enabled = ctx.power.rai_enabled;
                    if let Err(e) = power.negotiate_early_release(enabled).await {
                        warn!(enabled, error = %e, "Release assistance request failed");
                    }
                }

                if let Err(e) = self.link.resume_normal().await {
                    warn!(error = %e, "Resuming normal operation failed");
                }
            }
        }
    }

    async fn go_offline(&self) {
        if let Err(e) = self.link.go_offline().await {
            warn!(error = %e, "Going offline failed");
        }
    }

    /// Handles an asynchronous event from the link.
    ///
    /// 处理来自链路的异步事件。
    pub fn on_link_event(&self, ctx: &mut LinkContext, event: &LinkEvent) {
        match *event {
            LinkEvent::RegistrationStatus(status) => {
                info!(status = ?status, code = status.code(), "Network registration status");
                match status {
                    RegistrationStatus::RegisteredHome => {
                        info!("Connected - home network");
                        ctx.set_current(LinkState::Online);
                    }
                    RegistrationStatus::RegisteredRoaming => {
                        info!("Connected - roaming");
                        ctx.set_current(LinkState::Online);
                    }
                    RegistrationStatus::NotRegistered => {
                        info!("LTE offline");
                        ctx.set_current(LinkState::Offline);
                    }
                    _ => {}
                }
            }
            LinkEvent::PsmUpdate { tau, active_time } => {
                info!(tau, active_time, "PSM parameter update");
            }
            LinkEvent::EdrxUpdate { edrx, ptw } => {
                info!(edrx, ptw, "eDRX parameter update");
            }
            LinkEvent::RrcUpdate(mode) => {
                let mode = match mode {
                    RrcMode::Connected => "Connected",
                    RrcMode::Idle => "Idle",
                };
                info!(mode, "RRC mode");
            }
            LinkEvent::CellUpdate { id, tac } => {
                info!(cell_id = id, tracking_area = tac, "LTE cell changed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::FeatureGates,
        core::context::PowerSavingConfig,
        link::SystemMode,
        sim::{LinkCall, LinkOp, SimConfig, SimulatedModem},
    };

    struct Fixture {
        modem: Arc<SimulatedModem>,
        machine: ConnectionStateMachine<SimulatedModem>,
        power: PowerFeatureController<SimulatedModem>,
        ctx: LinkContext,
    }

    fn fixture(sim: SimConfig, rai_gate: bool) -> Fixture {
        let modem = Arc::new(SimulatedModem::new(sim));
        let gates = FeatureGates {
            psm: true,
            rai: rai_gate,
            edrx: false,
        };
        Fixture {
            machine: ConnectionStateMachine::new(modem.clone(), rai_gate),
            power: PowerFeatureController::new(modem.clone(), gates),
            ctx: LinkContext::new(PowerSavingConfig {
                psm_enabled: true,
                rai_enabled: false,
            }),
            modem,
        }
    }

    #[tokio::test]
    async fn test_offline_transition_only_goes_offline() {
        let mut f = fixture(SimConfig::quiet(), true);
        f.ctx.set_current(LinkState::Online);
        f.ctx.target = LinkState::Offline;

        f.machine.run_transition(&mut f.ctx, &f.power).await;

        assert_eq!(f.ctx.current(), LinkState::Connecting);
        assert_eq!(f.modem.calls().await, vec![LinkCall::GoOffline]);
    }

    #[tokio::test]
    async fn test_online_transition_sequence() {
        let mut f = fixture(SimConfig::quiet(), true);
        f.ctx.set_current(LinkState::Offline);
        f.ctx.target = LinkState::Online;
        f.ctx.power.rai_enabled = true;

        f.machine.run_transition(&mut f.ctx, &f.power).await;

        assert_eq!(f.ctx.current(), LinkState::Connecting);
        assert_eq!(
            f.modem.calls().await,
            vec![
                LinkCall::GoOffline,
                LinkCall::SystemMode,
                LinkCall::AtCommand("AT%RAI=1".into()),
                LinkCall::ResumeNormal,
            ]
        );
    }

    #[tokio::test]
    async fn test_online_transition_without_rai_gate() {
        let mut f = fixture(SimConfig::quiet(), false);
        f.ctx.target = LinkState::Online;

        f.machine.run_transition(&mut f.ctx, &f.power).await;

        assert_eq!(
            f.modem.calls().await,
            vec![LinkCall::GoOffline, LinkCall::ResumeNormal]
        );
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_sequence() {
        let sim = SimConfig {
            system_mode: SystemMode::None,
            ..SimConfig::quiet()
        };
        let mut f = fixture(sim, true);
        f.modem.fail(LinkOp::GoOffline).await;
        f.ctx.target = LinkState::Online;

        f.machine.run_transition(&mut f.ctx, &f.power).await;

        assert_eq!(
            f.modem.calls().await,
            vec![
                LinkCall::GoOffline,
                LinkCall::SystemMode,
                LinkCall::ResumeNormal
            ]
        );
    }

    #[tokio::test]
    async fn test_busy_target_touches_nothing() {
        let mut f = fixture(SimConfig::quiet(), true);
        f.ctx.set_current(LinkState::Online);
        f.ctx.target = LinkState::Connecting;

        f.machine.run_transition(&mut f.ctx, &f.power).await;

        assert_eq!(f.ctx.current(), LinkState::Connecting);
        assert!(f.modem.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_registration_events_set_observed_state() {
        let mut f = fixture(SimConfig::quiet(), true);

        let searching = LinkEvent::RegistrationStatus(RegistrationStatus::Searching);
        f.machine.on_link_event(&mut f.ctx, &searching);
        assert_eq!(f.ctx.current(), LinkState::Connecting);

        let roaming = LinkEvent::RegistrationStatus(RegistrationStatus::RegisteredRoaming);
        f.machine.on_link_event(&mut f.ctx, &roaming);
        assert_eq!(f.ctx.current(), LinkState::Online);

        let denied = LinkEvent::RegistrationStatus(RegistrationStatus::RegistrationDenied);
        f.machine.on_link_event(&mut f.ctx, &denied);
        assert_eq!(f.ctx.current(), LinkState::Online);

        let gone = LinkEvent::RegistrationStatus(RegistrationStatus::NotRegistered);
        f.machine.on_link_event(&mut f.ctx, &gone);
        assert_eq!(f.ctx.current(), LinkState::Offline);

        f.machine
            .on_link_event(&mut f.ctx, &LinkEvent::RrcUpdate(RrcMode::Idle));
        assert_eq!(f.ctx.current(), LinkState::Offline);
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_transition_is_idempotent() {
        let mut f = fixture(SimConfig::quiet(), true);
        let mut scheduler = Scheduler::new();

        f.machine
            .request_transition(&mut f.ctx, &mut scheduler, LinkState::Offline);
        f.machine
            .request_transition(&mut f.ctx, &mut scheduler, LinkState::Online);

        assert_eq!(f.ctx.target, LinkState::Online);
        assert_eq!(scheduler.pending_count(), 1);
        assert!(scheduler.is_pending(JobId::ConnectTransition));
    }
}
