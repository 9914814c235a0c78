//! 省电功能控制器
//! Power Feature Controller
//!
//! 针对当前链路配置发起PSM、eDRX以及提前释放辅助（RAI）协商请求。
//!
//! Issues PSM, eDRX and release assistance (RAI) negotiation requests against
//! the current link configuration.

use crate::{
    config::{FeatureGates, PowerConfig},
    error::{Error, Result},
    link::LinkController,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// AT command enabling the release 14 feature family that RAI depends on.
/// 启用RAI所依赖的Release 14功能族的AT命令。
pub const REL14_FEATURE_COMMAND: &str = "AT%REL14FEAT=0,1,0,0,0";

/// Returns the AT command toggling release assistance.
/// 返回切换释放辅助的AT命令。
pub fn rai_command(enabled: bool) -> &'static str {
    if enabled { "AT%RAI=1" } else { "AT%RAI=0" }
}

/// Negotiates power saving features with the network through the link.
///
/// 通过链路与网络协商省电功能。
pub struct PowerFeatureController<L> {
    link: Arc<L>,
    gates: FeatureGates,
}

impl<L: LinkController> PowerFeatureController<L> {
    pub fn new(link: Arc<L>, gates: FeatureGates) -> Self {
        Self { link, gates }
    }

    /// Requests that PSM be enabled or disabled.
    ///
    /// 请求启用或禁用PSM。
    pub async fn negotiate_power_saving_mode(&self, enabled: bool) -> Result<()> {
        debug!(enabled, "Requesting PSM");
        self.link.request_psm(enabled).await
    }

    /// Toggles release assistance signalling.
    ///
    /// Only valid in the LTE-M / NB-IoT family, and only while the radio is
    /// offline. The caller owns the offline ordering; it is not re-checked here.
    ///
    /// 切换释放辅助信令。
    ///
    /// 仅在 LTE-M / NB-IoT 系列中有效，且只能在无线电离线时调用。
    /// 离线顺序由调用者保证，这里不再重复检查。
    pub async fn negotiate_early_release(&self, enabled: bool) -> Result<()> {
        let mode = self
            .link
            .system_mode()
            .await
            .map_err(|_| Error::SystemModeUnavailable)?;

        if !mode.is_cellular_iot() {
            return Err(Error::UnsupportedMode(mode));
        }

        debug!(enabled, mode = ?mode, "Requesting release assistance");
        self.link.at_command(rai_command(enabled)).await
    }

    /// Boot-time low power setup: PSM, then eDRX, then the release 14 feature
    /// family. Every step runs even if an earlier one fails; the last failure
    /// is returned.
    ///
    /// 启动时的低功耗配置：依次为PSM、eDRX和Release 14功能族。
    /// 即使前面的步骤失败，每一步仍会执行；返回最后一次失败。
    pub async fn configure_low_power(&self, power: &PowerConfig) -> Result<()> {
        let mut outcome = Ok(());

        let psm = self.gates.psm && power.psm_enabled;
        if let Err(e) = self.link.request_psm(psm).await {
            warn!(enabled = psm, error = %e, "PSM request failed");
            outcome = Err(e);
        }

        let edrx = self.gates.edrx && power.edrx_enabled;
        if let Err(e) = self.link.request_edrx(edrx).await {
            warn!(enabled = edrx, error = %e, "eDRX request failed");
            outcome = Err(e);
        }

        if self.gates.rai && power.release14_feature {
            if let Err(e) = self.link.at_command(REL14_FEATURE_COMMAND).await {
                warn!(error = %e, "Release 14 RAI feature AT command failed");
                outcome = Err(e);
            }
        }

        if outcome.is_ok() {
            info!(psm, edrx, "Low power configuration applied");
        }
        outcome
    }
}
