//! 发送周期
//! Transmission Cycle
//!
//! 每个周期打开一个传输会话，发送一个固定大小的全零载荷，关闭会话，
//! 成功后在配置的间隔之后重新调度自身。
//!
//! Each cycle opens a transport session, sends one fixed-size all-zero payload,
//! closes the session and, on success, reschedules itself after the configured
//! interval.

use super::{
    context::{LinkContext, LinkState},
    scheduler::{JobId, Scheduler},
};
use crate::{
    config::TransmissionConfig,
    error::Result,
    transport::{DatagramTransport, ReleaseHint, TransportSession},
};
use bytes::{Bytes, BytesMut};
use std::net::SocketAddr;
use tokio::time::Duration;
use tracing::{debug, info, warn};

/// IPv4 plus UDP header overhead added to every payload on the air.
/// 空口上每个载荷额外附加的IPv4加UDP头部开销。
pub const UDP_IP_HEADER_SIZE: usize = 28;

/// Periodic sender of the fixed payload.
///
/// 固定载荷的周期性发送者。
pub struct TransmissionCycle<T> {
    transport: T,
    remote: SocketAddr,
    payload: Bytes,
    interval: Duration,
}

impl<T: DatagramTransport> TransmissionCycle<T> {
    pub fn new(transport: T, remote: SocketAddr, config: &TransmissionConfig) -> Self {
        Self {
            transport,
            remote,
            payload: BytesMut::zeroed(config.payload_size).freeze(),
            interval: config.interval,
        }
    }

    /// The transmit job: one cycle, rescheduled only when the send succeeded.
    ///
    /// 发送作业：执行一个周期，仅在发送成功时重新调度。
    pub async fn run(&self, ctx: &LinkContext, scheduler: &mut Scheduler) {
        match self.transmit_once(ctx.power.rai_enabled).await {
            Ok(_) => scheduler.schedule(JobId::Transmit, self.interval),
            Err(e) => {
                // TODO: retry with backoff; today only an on-demand request restarts the cycle.
                warn!(remote = %self.remote, error = %e, "Failed to transmit UDP packet, cycle stopped");
            }
        }
    }

    /// Sends the payload once. The session is always closed before returning,
    /// also when the send fails.
    ///
    /// 发送一次载荷。返回之前总会关闭会话，发送失败时也一样。
    pub async fn transmit_once(&self, rai_enabled: bool) -> Result<usize> {
        let mut session = self.transport.open(self.remote).await?;

        info!(
            bytes = self.payload.len() + UDP_IP_HEADER_SIZE,
            address = %self.remote.ip(),
            port = self.remote.port(),
            "Transmitting UDP/IP payload"
        );

        if rai_enabled {
            debug!("Marking session with RAI_LAST before the last packet");
            if let Err(e) = session.set_release_hint(ReleaseHint::LastSegment).await {
                warn!(error = %e, "Setting RAI_LAST failed");
            }
        }

        let result = session.send(&self.payload).await;

        if rai_enabled && result.is_ok() {
            debug!("Marking session with RAI_NO_DATA");
            if let Err(e) = session.set_release_hint(ReleaseHint::NoFurtherData).await {
                warn!(error = %e, "Setting RAI_NO_DATA failed");
            }
        }

        session.close().await;
        result
    }
}

/// Schedules an immediate transmission when the link is online. Returns
/// whether the request was accepted.
///
/// 当链路在线时调度一次立即发送。返回请求是否被接受。
pub fn transmit_on_demand(ctx: &LinkContext, scheduler: &mut Scheduler) -> bool {
    if ctx.current() != LinkState::Online {
        debug!(current = ?ctx.current(), "Transmit request ignored, link not online");
        return false;
    }
    info!("Send UDP package!");
    scheduler.schedule(JobId::Transmit, Duration::ZERO);
    true
}
