//! The connectivity control core: shared context, deferred work scheduler,
//! connection state machine, power feature controller, transmission cycle and
//! input dispatcher.
//!
//! 连接控制核心：共享上下文、延迟作业调度器、连接状态机、省电功能控制器、
//! 发送周期和输入分发器。

pub mod context;
pub mod controller;
pub mod input;
pub mod power;
pub mod scheduler;
pub mod state_machine;
pub mod transmission;

#[cfg(test)]
pub(crate) mod test_utils;

pub use context::{LinkContext, LinkState, PowerSavingConfig};
pub use controller::Controller;
pub use input::{Button, ButtonEvent, InputAction, InputSource};
pub use scheduler::{JobId, Scheduler};
