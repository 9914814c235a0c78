#![deny(clippy::expect_used, clippy::unwrap_used)]

//! Connectivity control loop for a cellular IoT device.
//! 蜂窝物联网设备的连接控制回路。

pub mod bootstrap;
pub mod config;
pub mod core;
pub mod error;
pub mod link;
pub mod sim;
pub mod transport;
