//! 系统类型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 门禁指令枚举
///
/// 指令以字面字符串形式发布到消息通道，控制器端不回执。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorCommand {
    /// 上锁
    Lock,
    /// 开锁
    Unlock,
    /// 蜂鸣
    Sound,
}

impl DoorCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            DoorCommand::Lock => "lock",
            DoorCommand::Unlock => "unlock",
            DoorCommand::Sound => "sound",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "lock" => Some(DoorCommand::Lock),
            "unlock" => Some(DoorCommand::Unlock),
            "sound" => Some(DoorCommand::Sound),
            _ => None,
        }
    }
}

/// 员工表实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    /// 数据库唯一ID
    pub unique_id: i64,
    /// 员工业务ID（门禁码的subject字段）
    pub id: String,
    /// 姓名
    pub name: Option<String>,
    /// 密码哈希（认证由外部系统完成，这里仅存储）
    pub password_hash: Option<String>,
}

impl Staff {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self {
            unique_id: 0, // 由数据库自动分配
            id: id.into(),
            name: None,
            password_hash: None,
        }
    }
}

/// 住客表实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guest {
    /// 数据库唯一ID
    pub unique_id: i64,
    /// 住客业务ID
    pub id: String,
    /// 姓名
    pub name: Option<String>,
    /// 联系邮箱（房间共享授权的匹配键）
    pub email: String,
}

impl Guest {
    pub fn new<S: Into<String>>(id: S, email: S) -> Self {
        Self {
            unique_id: 0,
            id: id.into(),
            name: None,
            email: email.into(),
        }
    }
}

/// 预订表实体
///
/// 一条预订属于一位住客，覆盖一个入住时间窗口，分配一组房间。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    /// 数据库唯一ID
    pub unique_id: i64,
    /// 预订归属住客的业务ID
    pub guest_id: String,
    /// 入住时间
    pub check_in: DateTime<Utc>,
    /// 退房时间
    pub check_out: DateTime<Utc>,
    /// 分配的房间ID集合
    pub rooms: Vec<String>,
    /// 最后更新时间
    pub update_at: DateTime<Utc>,
}

impl Reservation {
    pub fn new<S: Into<String>>(
        guest_id: S,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
        rooms: Vec<String>,
    ) -> Self {
        Self {
            unique_id: 0,
            guest_id: guest_id.into(),
            check_in,
            check_out,
            rooms,
            update_at: Utc::now(),
        }
    }

    /// 指定时刻是否在入住窗口内
    pub fn covers(&self, at: DateTime<Utc>) -> bool {
        self.check_in <= at && at <= self.check_out
    }

    /// 房间是否属于本预订
    pub fn has_room(&self, room_id: &str) -> bool {
        self.rooms.iter().any(|r| r == room_id)
    }
}

/// 房间共享授权表实体
///
/// 一条记录 = 一个 (预订, 房间, 受授权邮箱) 三元组。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomGrant {
    /// 数据库唯一ID
    pub unique_id: i64,
    /// 所属预订
    pub reservation_id: i64,
    /// 被共享的房间ID
    pub room_id: String,
    /// 受授权住客的联系邮箱
    pub grantee_email: String,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl RoomGrant {
    pub fn new<S: Into<String>>(reservation_id: i64, room_id: S, grantee_email: S) -> Self {
        Self {
            unique_id: 0,
            reservation_id,
            room_id: room_id.into(),
            grantee_email: grantee_email.into(),
            created_at: Utc::now(),
        }
    }
}

/// 执行指令的目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActuationTarget {
    /// 全局 door 主题（前台/员工操作）
    Global,
    /// 按房间主题 door/{roomID}（住客开锁）
    Room(String),
}

/// 进入执行链的门禁请求
#[derive(Debug, Clone)]
pub struct ActuationRequest {
    /// 声称的住客身份ID，缺失即认证失败
    pub guest_id: Option<String>,
    /// 目标
    pub target: ActuationTarget,
    /// 指令
    pub command: DoorCommand,
}
