//! Asynchronous events reported by the link collaborator.
//!
//! 链路协作者上报的异步事件。

/// Network registration status as reported by the modem.
///
/// 调制解调器上报的网络注册状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationStatus {
    NotRegistered,
    RegisteredHome,
    Searching,
    RegistrationDenied,
    Unknown,
    RegisteredRoaming,
    UiccFail,
}

impl RegistrationStatus {
    /// Decodes the numeric status code used by the modem. Unrecognized codes
    /// decode as [`RegistrationStatus::Unknown`].
    ///
    /// 解码调制解调器使用的数字状态码。无法识别的代码解码为 `Unknown`。
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::NotRegistered,
            1 => Self::RegisteredHome,
            2 => Self::Searching,
            3 => Self::RegistrationDenied,
            5 => Self::RegisteredRoaming,
            90 => Self::UiccFail,
            _ => Self::Unknown,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::NotRegistered => 0,
            Self::RegisteredHome => 1,
            Self::Searching => 2,
            Self::RegistrationDenied => 3,
            Self::Unknown => 4,
            Self::RegisteredRoaming => 5,
            Self::UiccFail => 90,
        }
    }

    /// Attached to either the home network or a roaming network.
    /// 已附着到归属网络或漫游网络。
    pub fn is_registered(self) -> bool {
        matches!(self, Self::RegisteredHome | Self::RegisteredRoaming)
    }
}

/// Radio resource control connection state.
///
/// 无线资源控制连接状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RrcMode {
    Connected,
    Idle,
}

/// An event delivered by the link collaborator.
///
/// 链路协作者投递的事件。
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    /// 网络注册状态变化
    /// Network registration status changed
    RegistrationStatus(RegistrationStatus),
    /// 网络分配的PSM参数（秒）
    /// PSM parameters granted by the network, in seconds
    PsmUpdate { tau: i32, active_time: i32 },
    /// 网络分配的eDRX参数（秒）
    /// eDRX parameters granted by the network, in seconds
    EdrxUpdate { edrx: f32, ptw: f32 },
    /// RRC模式变化
    /// RRC mode changed
    RrcUpdate(RrcMode),
    /// 服务小区变化
    /// Serving cell changed
    CellUpdate { id: u32, tac: u32 },
}
