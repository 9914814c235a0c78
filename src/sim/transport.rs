//! A scripted datagram transport.
//!
//! 可编排的数据报传输。

use crate::{
    error::Result,
    transport::{DatagramTransport, ReleaseHint, TransportSession},
};
use async_trait::async_trait;
use std::{
    io,
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};
use tokio::sync::Mutex;

/// Everything that happened to one session.
///
/// 单个会话上发生的所有事情。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionRecord {
    pub remote: Option<SocketAddr>,
    /// Hints and payload lengths, interleaved in call order.
    /// 提示和载荷长度，按调用顺序交错记录。
    pub steps: Vec<SessionStep>,
    pub closed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStep {
    Hint(ReleaseHint),
    Send(Vec<u8>),
}

#[derive(Debug, Default)]
struct Script {
    fail_open: AtomicBool,
    fail_send: AtomicBool,
    sessions: Mutex<Vec<SessionRecord>>,
}

/// Transport whose sessions record their calls and fail on demand.
///
/// 会话会记录调用并可按需失败的传输。
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Script>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_open(&self, fail: bool) {
        self.script.fail_open.store(fail, Ordering::SeqCst);
    }

    pub fn fail_send(&self, fail: bool) {
        self.script.fail_send.store(fail, Ordering::SeqCst);
    }

    /// Sessions opened so far.
    /// 到目前为止打开的会话。
    pub async fn sessions(&self) -> Vec<SessionRecord> {
        self.script.sessions.lock().await.clone()
    }
}

/// Session handed out by [`ScriptedTransport`].
///
/// 由 `ScriptedTransport` 分发的会话。
#[derive(Debug)]
pub struct ScriptedSession {
    index: usize,
    script: Arc<Script>,
}

impl ScriptedSession {
    async fn record(&self, step: SessionStep) {
        if let Some(record) = self.script.sessions.lock().await.get_mut(self.index) {
            record.steps.push(step);
        }
    }
}

#[async_trait]
impl DatagramTransport for ScriptedTransport {
    type Session = ScriptedSession;

    async fn open(&self, remote: SocketAddr) -> Result<ScriptedSession> {
        if self.script.fail_open.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::NetworkUnreachable, "scripted open failure").into());
        }
        let mut sessions = self.script.sessions.lock().await;
        sessions.push(SessionRecord {
            remote: Some(remote),
            ..SessionRecord::default()
        });
        Ok(ScriptedSession {
            index: sessions.len() - 1,
            script: self.script.clone(),
        })
    }
}

#[async_trait]
impl TransportSession for ScriptedSession {
    async fn set_release_hint(&mut self, hint: ReleaseHint) -> Result<()> {
        self.record(SessionStep::Hint(hint)).await;
        Ok(())
    }

    async fn send(&mut self, payload: &[u8]) -> Result<usize> {
        if self.script.fail_send.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::NetworkDown, "scripted send failure").into());
        }
        self.record(SessionStep::Send(payload.to_vec())).await;
        Ok(payload.len())
    }

    async fn close(self) {
        if let Some(record) = self.script.sessions.lock().await.get_mut(self.index) {
            record.closed = true;
        }
    }
}
