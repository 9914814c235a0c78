//! UDP-based transport implementation.
//!
//! 基于UDP的传输实现。

use super::{DatagramTransport, ReleaseHint, TransportSession};
use crate::error::Result;
use async_trait::async_trait;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;
use tracing::{debug, trace};

/// Opens one UDP socket per session.
///
/// 每个会话打开一个UDP套接字。
#[derive(Debug, Clone, Copy, Default)]
pub struct UdpTransport;

/// A UDP socket connected to the remote endpoint.
///
/// Host IP stacks have no release assistance socket option, so hints are
/// only recorded and logged here. Modem-backed transports apply them.
///
/// 连接到远端端点的UDP套接字。
///
/// 主机IP协议栈没有释放辅助套接字选项，因此这里只记录并打印提示。
/// 基于调制解调器的传输会真正应用它们。
#[derive(Debug)]
pub struct UdpSession {
    socket: UdpSocket,
    remote: SocketAddr,
    hints: Vec<ReleaseHint>,
}

impl UdpSession {
    /// Hints applied to this session so far, in order.
    /// 到目前为止按顺序应用于此会话的提示。
    pub fn hints(&self) -> &[ReleaseHint] {
        &self.hints
    }
}

#[async_trait]
impl DatagramTransport for UdpTransport {
    type Session = UdpSession;

    async fn open(&self, remote: SocketAddr) -> Result<UdpSession> {
        let bind_addr: SocketAddr = match remote {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(remote).await?;
        debug!(local = ?socket.local_addr().ok(), remote = %remote, "UDP session opened");
        Ok(UdpSession {
            socket,
            remote,
            hints: Vec::new(),
        })
    }
}

#[async_trait]
impl TransportSession for UdpSession {
    async fn set_release_hint(&mut self, hint: ReleaseHint) -> Result<()> {
        trace!(remote = %self.remote, hint = ?hint, "Release hint recorded");
        self.hints.push(hint);
        Ok(())
    }

    async fn send(&mut self, payload: &[u8]) -> Result<usize> {
        let sent = self.socket.send(payload).await?;
        trace!(remote = %self.remote, bytes = sent, "UDP datagram sent");
        Ok(sent)
    }

    async fn close(self) {
        debug!(remote = %self.remote, "UDP session closed");
    }
}
