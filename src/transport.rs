//! Datagram transport abstraction.
//!
//! Each transmission cycle opens one short-lived session to the remote
//! endpoint, sends a single datagram and closes the session again.
//!
//! 数据报传输抽象。
//!
//! 每个发送周期都会向远端端点打开一个短生命周期的会话，发送单个数据报后再关闭该会话。

pub mod udp;

use crate::error::Result;
use async_trait::async_trait;
use std::net::SocketAddr;

pub use udp::{UdpSession, UdpTransport};

/// Release assistance hints attached to a session.
///
/// 附加到会话的释放辅助提示。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseHint {
    /// The next datagram is the last one before an expected idle period.
    /// 下一个数据报是预期空闲期之前的最后一个。
    LastSegment,
    /// No further data is expected, uplink or downlink.
    /// 预计不会再有上行或下行数据。
    NoFurtherData,
}

/// A connected, connectionless session towards one remote endpoint.
///
/// 面向单个远端端点的已连接的无连接会话。
#[async_trait]
pub trait TransportSession: Send + Sized {
    /// Marks the session with a release hint.
    /// 用释放提示标记会话。
    async fn set_release_hint(&mut self, hint: ReleaseHint) -> Result<()>;

    /// Sends one datagram and returns the number of bytes written.
    /// 发送一个数据报并返回写入的字节数。
    async fn send(&mut self, payload: &[u8]) -> Result<usize>;

    /// Closes the session. Closing never fails from the caller's point of view.
    /// 关闭会话。从调用者的角度看关闭永远不会失败。
    async fn close(self);
}

/// Factory for transport sessions.
///
/// 传输会话的工厂。
#[async_trait]
pub trait DatagramTransport: Send + Sync + 'static {
    type Session: TransportSession;

    /// Opens a session to `remote`.
    /// 打开到 `remote` 的会话。
    async fn open(&self, remote: SocketAddr) -> Result<Self::Session>;
}
