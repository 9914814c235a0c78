//! Radio system modes.
//!
//! 无线电系统模式。

/// The system mode the modem is configured for.
///
/// 调制解调器配置的系统模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemMode {
    LteM,
    LteMGps,
    NbIot,
    NbIotGps,
    LteMNbIot,
    LteMNbIotGps,
    /// GNSS only, no cellular radio.
    /// 仅GNSS，无蜂窝无线电。
    Gps,
    /// No mode configured.
    /// 未配置模式。
    None,
}

impl SystemMode {
    /// Returns `true` for the LTE-M / NB-IoT family, the only modes in which
    /// release assistance can be requested.
    ///
    /// 对 LTE-M / NB-IoT 系列返回 `true`，只有这些模式可以请求释放辅助。
    pub fn is_cellular_iot(self) -> bool {
        matches!(
            self,
            SystemMode::LteM
                | SystemMode::LteMGps
                | SystemMode::NbIot
                | SystemMode::NbIotGps
                | SystemMode::LteMNbIot
                | SystemMode::LteMNbIotGps
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cellular_iot_family() {
        assert!(SystemMode::LteM.is_cellular_iot());
        assert!(SystemMode::NbIotGps.is_cellular_iot());
        assert!(SystemMode::LteMNbIotGps.is_cellular_iot());
        assert!(!SystemMode::Gps.is_cellular_iot());
        assert!(!SystemMode::None.is_cellular_iot());
    }
}
