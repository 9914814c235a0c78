//! 延迟作业调度器
//! Deferred Work Scheduler
//!
//! 一张以作业身份为键的固定大小表。每个作业最多只有一个待触发时间，
//! 重新调度会覆盖之前的触发时间而不是重复入队。
//!
//! A fixed-size table keyed by job identity. Each job has at most one pending
//! fire time; rescheduling overwrites the previous fire time instead of
//! enqueueing a duplicate.

use tokio::time::{Duration, Instant};
use tracing::{trace, warn};

/// The closed set of deferred jobs.
///
/// 延迟作业的封闭集合。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobId {
    /// 发送一个数据报
    /// Send one datagram
    Transmit,
    /// 将无线电驱动到目标状态
    /// Drive the radio towards the target state
    ConnectTransition,
    /// 重新协商PSM
    /// Renegotiate PSM
    PsmRenegotiate,
    /// 重新协商提前释放辅助
    /// Renegotiate early release assistance
    RaiRenegotiate,
}

impl JobId {
    pub const COUNT: usize = 4;
    pub const ALL: [JobId; JobId::COUNT] = [
        JobId::Transmit,
        JobId::ConnectTransition,
        JobId::PsmRenegotiate,
        JobId::RaiRenegotiate,
    ];

    fn slot(self) -> usize {
        match self {
            JobId::Transmit => 0,
            JobId::ConnectTransition => 1,
            JobId::PsmRenegotiate => 2,
            JobId::RaiRenegotiate => 3,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    due: Instant,
    /// Monotonic scheduling sequence, orders same-tick ties.
    seq: u64,
}

/// Marks the start of one drain pass. Jobs scheduled after the mark wait for
/// the next pass, so a handler rescheduling itself with no delay cannot starve
/// the loop.
///
/// 标记一次清空过程的开始。在标记之后调度的作业要等到下一次清空，
/// 因此以零延迟重新调度自身的处理器不会让回路饿死。
#[derive(Debug, Clone, Copy)]
pub struct DrainMark {
    now: Instant,
    horizon: u64,
}

/// Cooperative scheduler for the fixed job set.
///
/// 固定作业集合的协作式调度器。
#[derive(Debug, Default)]
pub struct Scheduler {
    slots: [Option<Pending>; JobId::COUNT],
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `job` to fire after `delay`, replacing any pending fire time.
    /// A delay past the clock's range leaves the job unscheduled.
    ///
    /// 调度 `job` 在 `delay` 之后触发，替换任何待触发时间。
    /// 超出时钟范围的延迟会使作业保持未调度状态。
    pub fn schedule(&mut self, job: JobId, delay: Duration) {
        let Some(due) = Instant::now().checked_add(delay) else {
            warn!(job = ?job, delay = ?delay, "Delay out of range, job not scheduled");
            self.slots[job.slot()] = None;
            return;
        };
        let seq = self.next_seq;
        self.next_seq += 1;
        let previous = self.slots[job.slot()].replace(Pending { due, seq });
        trace!(job = ?job, delay = ?delay, rescheduled = previous.is_some(), "Job scheduled");
    }

    pub fn is_pending(&self, job: JobId) -> bool {
        self.slots[job.slot()].is_some()
    }

    /// The fire time of `job`, if pending.
    /// 如果 `job` 待触发，返回其触发时间。
    pub fn due_time(&self, job: JobId) -> Option<Instant> {
        self.slots[job.slot()].map(|p| p.due)
    }

    pub fn pending_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Earliest fire time over all pending jobs.
    /// 所有待触发作业中最早的触发时间。
    pub fn next_deadline(&self) -> Option<Instant> {
        self.slots.iter().flatten().map(|p| p.due).min()
    }

    pub fn mark(&self) -> DrainMark {
        DrainMark {
            now: Instant::now(),
            horizon: self.next_seq,
        }
    }

    /// Removes and returns the next job that is due at `mark`, earliest fire
    /// time first and scheduling order for ties.
    ///
    /// 移除并返回在 `mark` 时刻到期的下一个作业，按最早触发时间优先，
    /// 同一时刻按调度顺序。
    pub fn pop_due(&mut self, mark: DrainMark) -> Option<JobId> {
        let job = JobId::ALL
            .iter()
            .copied()
            .filter_map(|job| self.slots[job.slot()].map(|p| (job, p)))
            .filter(|(_, p)| p.due <= mark.now && p.seq < mark.horizon)
            .min_by_key(|(_, p)| (p.due, p.seq))
            .map(|(job, _)| job)?;
        self.slots[job.slot()] = None;
        Some(job)
    }
}
