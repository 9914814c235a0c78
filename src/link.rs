//! Link layer collaborator interface.
//!
//! The radio stack itself (bring-up, registration, AT command execution) is
//! provided by the modem library. This module only describes the boundary the
//! control loop talks to.
//!
//! 链路层协作者接口。
//!
//! 无线电协议栈本身（启动、注册、AT命令执行）由调制解调器库提供。
//! 此模块仅描述控制回路与之交互的边界。

pub mod event;
pub mod mode;

use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

pub use event::{LinkEvent, RegistrationStatus, RrcMode};
pub use mode::SystemMode;

/// Link control interface of the cellular modem.
///
/// 蜂窝调制解调器的链路控制接口。
#[async_trait]
pub trait LinkController: Send + Sync + 'static {
    /// Initializes the modem library. Failure is fatal at boot.
    ///
    /// 初始化调制解调器库。启动时失败是致命的。
    async fn init(&self) -> Result<()>;

    /// Starts asynchronous network attach. Events are delivered on `events`
    /// for as long as the link keeps the sender alive.
    ///
    /// 开始异步网络附着。只要链路保持发送端存活，事件就会通过 `events` 投递。
    async fn connect(&self, events: mpsc::Sender<LinkEvent>) -> Result<()>;

    /// Puts the radio into offline mode.
    /// 将无线电置于离线模式。
    async fn go_offline(&self) -> Result<()>;

    /// Returns the radio to normal operation, which triggers registration.
    /// 使无线电恢复正常工作，这会触发注册。
    async fn resume_normal(&self) -> Result<()>;

    /// Requests (or withdraws) power saving mode.
    /// 请求（或撤回）省电模式。
    async fn request_psm(&self, enabled: bool) -> Result<()>;

    /// Requests (or withdraws) extended discontinuous reception.
    /// 请求（或撤回）扩展非连续接收。
    async fn request_edrx(&self, enabled: bool) -> Result<()>;

    /// Reads the configured system mode.
    /// 读取已配置的系统模式。
    async fn system_mode(&self) -> Result<SystemMode>;

    /// Executes a raw AT command.
    /// 执行原始AT命令。
    async fn at_command(&self, command: &str) -> Result<()>;
}
