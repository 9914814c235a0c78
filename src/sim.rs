//! Simulated collaborators.
//!
//! Stand-ins for the modem and the datagram transport so the control loop can
//! run on a host and under test. Both record every call they receive.
//!
//! 模拟协作者。
//!
//! 调制解调器和数据报传输的替身，使控制回路可以在主机上和测试中运行。
//! 两者都会记录收到的每一次调用。

pub mod modem;
pub mod transport;

pub use modem::{LinkCall, LinkOp, SimConfig, SimulatedModem};
pub use transport::{ScriptedSession, ScriptedTransport, SessionRecord, SessionStep};
