//! 定义了库中所有可能的错误类型。
//! Defines all possible error types in the library.

use crate::link::SystemMode;
use thiserror::Error;

/// The primary error type for the link control library.
/// 链路控制库的主要错误类型。
#[derive(Debug, Error)]
pub enum Error {
    /// An underlying I/O error occurred, usually in the datagram transport.
    /// 发生了底层的I/O错误，通常来自数据报传输。
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configured remote address could not be parsed.
    /// 配置的远端地址无法解析。
    #[error("Address parsing error: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    /// Early-release assistance was requested while the radio runs in a mode
    /// outside the LTE-M / NB-IoT family.
    ///
    /// 在无线电处于 LTE-M / NB-IoT 系列以外的模式时请求了提前释放辅助。
    #[error("Early release is not supported in system mode {0:?}")]
    UnsupportedMode(SystemMode),

    /// A link-control operation was rejected by the modem.
    /// 调制解调器拒绝了链路控制操作。
    #[error("Link operation `{operation}` failed with code {code}")]
    LinkControl { operation: &'static str, code: i32 },

    /// A raw AT command was rejected by the modem.
    /// 调制解调器拒绝了原始AT命令。
    #[error("AT command `{command}` failed with code {code}")]
    AtCommand { command: String, code: i32 },

    /// The current system mode could not be read from the modem.
    /// 无法从调制解调器读取当前系统模式。
    #[error("System mode could not be read")]
    SystemModeUnavailable,

    /// The button input collaborator could not be started.
    /// 按键输入协作者无法启动。
    #[error("Input initialization failed: {0}")]
    InputInit(String),

    /// The modem library could not be initialized.
    /// 调制解调器库无法初始化。
    #[error("Link initialization failed: {0}")]
    LinkInit(String),

    /// An internal channel was closed unexpectedly.
    /// 内部通道意外关闭。
    #[error("Internal channel is broken")]
    ChannelClosed,

    /// The configured payload does not fit into a single datagram.
    /// 配置的载荷无法放入单个数据报。
    #[error("the payload is too large to be sent in one datagram")]
    PayloadTooLarge,

    /// The transmit interval is zero or too long to schedule.
    /// 发送间隔为零或过长而无法调度。
    #[error("transmit interval {0:?} is out of range")]
    IntervalOutOfRange(std::time::Duration),
}

/// A specialized `Result` type for this library.
/// 本库专用的 `Result` 类型。
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        use std::io::ErrorKind;
        match err {
            Error::Io(e) => e,
            Error::AddressParse(e) => std::io::Error::new(ErrorKind::InvalidInput, e),
            Error::UnsupportedMode(_) => ErrorKind::Unsupported.into(),
            Error::LinkControl { .. } => ErrorKind::Other.into(),
            Error::AtCommand { .. } => ErrorKind::Other.into(),
            Error::SystemModeUnavailable => ErrorKind::NotFound.into(),
            Error::InputInit(msg) => std::io::Error::other(msg),
            Error::LinkInit(msg) => std::io::Error::other(msg),
            Error::ChannelClosed => ErrorKind::BrokenPipe.into(),
            Error::PayloadTooLarge => ErrorKind::InvalidInput.into(),
            Error::IntervalOutOfRange(_) => ErrorKind::InvalidInput.into(),
        }
    }
}
