//! 酒店门禁授权系统
//!
//! 这是酒店/宿舍运营后台的门禁授权子系统，支持：
//! - 基于RFC 4226 HOTP算法的时间窗口门禁码签发与验证
//! - 归属/共享两级的房间进入权限评估
//! - 已认证 → 在房间内 → 已入住 三道执行链守卫
//! - 经MQTT向门锁控制器分发 lock/unlock/sound 指令
//! - SQLite数据库存储

pub mod access;
pub mod codec;
pub mod config;
pub mod database;
pub mod dispatch;
pub mod error;
pub mod otp;
pub mod types;

// 重新导出常用类型
pub use access::{AccessGate, DoorAccessService, RoomPermissionService};
pub use codec::AccessPayload;
pub use config::AppConfig;
pub use database::Database;
pub use dispatch::{ActuationDispatcher, CommandChannel, MqttChannel};
pub use error::{AppError, Result};
pub use types::{ActuationRequest, ActuationTarget, DoorCommand, Guest, Reservation, RoomGrant, Staff};
