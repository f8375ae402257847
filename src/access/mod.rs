//! 门禁授权服务模块

pub mod door_service;
pub mod gate;
pub mod permission;

pub use door_service::DoorAccessService;
pub use gate::AccessGate;
pub use permission::{EnterableRooms, RequesterRole, RoomPermissionService};
