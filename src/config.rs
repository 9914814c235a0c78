//! 定义了链路控制回路的可配置参数。
//! Defines configurable parameters for the link control loop.

use crate::error::{Error, Result};
use std::{
    net::{IpAddr, SocketAddr},
    time::Duration,
};

/// Largest payload that fits into one IPv4 UDP datagram.
/// 单个IPv4 UDP数据报可容纳的最大载荷。
pub const MAX_DATAGRAM_PAYLOAD: usize = 65_507;

/// Longest accepted transmit interval (one year).
/// 可接受的最长发送间隔（一年）。
pub const MAX_TRANSMIT_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// A structure containing all configurable parameters of the controller.
///
/// 包含控制器所有可配置参数的结构体。
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// The remote endpoint that receives the periodic datagram.
    /// 接收周期性数据报的远端端点。
    pub server: ServerConfig,

    /// Transmission cycle parameters.
    /// 发送周期参数。
    pub transmission: TransmissionConfig,

    /// Initial power-saving preferences.
    /// 初始省电偏好。
    pub power: PowerConfig,

    /// Feature gates, fixed at build time by cargo features.
    /// 功能开关，在构建时由cargo特性确定。
    pub features: FeatureGates,

    /// Depths of the channels feeding the control loop.
    /// 向控制回路输入的通道深度。
    pub queues: QueueConfig,
}

/// Remote endpoint parameters.
///
/// 远端端点参数。
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The IP address of the server, in textual form.
    /// 服务器的IP地址（文本形式）。
    pub address: String,
    /// The UDP port of the server.
    /// 服务器的UDP端口。
    pub port: u16,
}

/// Transmission cycle parameters.
///
/// 发送周期参数。
#[derive(Debug, Clone)]
pub struct TransmissionConfig {
    /// Size of the all-zero payload sent every cycle, in bytes.
    /// 每个周期发送的全零载荷大小（字节）。
    pub payload_size: usize,
    /// Delay between the end of one successful cycle and the next.
    /// 一次成功周期结束到下一次之间的延迟。
    pub interval: Duration,
}

/// Initial power-saving preferences.
///
/// 初始省电偏好。
#[derive(Debug, Clone)]
pub struct PowerConfig {
    /// Request PSM at boot.
    /// 启动时请求PSM。
    pub psm_enabled: bool,
    /// Start with release assistance (RAI) enabled.
    /// 启动时启用释放辅助（RAI）。
    pub rai_enabled: bool,
    /// Request eDRX at boot when the `edrx` gate is on.
    /// 当 `edrx` 开关打开时在启动时请求eDRX。
    pub edrx_enabled: bool,
    /// The hardware needs `AT%REL14FEAT` before RAI requests succeed.
    /// 硬件需要先执行 `AT%REL14FEAT` 才能成功请求RAI。
    pub release14_feature: bool,
}

/// Build-time feature gates.
///
/// 构建时功能开关。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureGates {
    pub psm: bool,
    pub rai: bool,
    pub edrx: bool,
}

/// Channel depths.
///
/// 通道深度。
#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub link_events: usize,
    pub buttons: usize,
}

impl Config {
    /// Resolves the configured server into a socket address.
    ///
    /// 将配置的服务器解析为套接字地址。
    pub fn remote_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.server.address.parse()?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Checks values that cannot be expressed by the types alone.
    ///
    /// 检查仅靠类型无法表达的取值约束。
    pub fn validate(&self) -> Result<()> {
        if self.transmission.payload_size > MAX_DATAGRAM_PAYLOAD {
            return Err(Error::PayloadTooLarge);
        }
        let interval = self.transmission.interval;
        if interval.is_zero() || interval > MAX_TRANSMIT_INTERVAL {
            return Err(Error::IntervalOutOfRange(interval));
        }
        self.remote_addr().map(|_| ())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "8.8.8.8".to_string(),
            port: 2469,
        }
    }
}

impl Default for TransmissionConfig {
    fn default() -> Self {
        Self {
            payload_size: 10,
            interval: Duration::from_secs(900), // 15 minutes
        }
    }
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            psm_enabled: true,
            rai_enabled: false,
            edrx_enabled: true,
            release14_feature: true,
        }
    }
}

impl Default for FeatureGates {
    fn default() -> Self {
        Self {
            psm: cfg!(feature = "psm"),
            rai: cfg!(feature = "rai"),
            edrx: cfg!(feature = "edrx"),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            link_events: 32,
            buttons: 16,
        }
    }
}
