//! 执行链守卫模块
//!
//! 每个执行请求按固定顺序过三道守卫：已认证 → 在房间内 → 已入住。
//! 任一环节失败立即中止，指令不会发布，不存在部分执行。

use crate::access::permission::RoomPermissionService;
use crate::database::{Database, GuestRepository};
use crate::dispatch::{ActuationDispatcher, CommandChannel};
use crate::error::{AppError, Result};
use crate::types::{ActuationRequest, ActuationTarget, Guest};
use chrono::Utc;

/// 执行链守卫
pub struct AccessGate<C: CommandChannel> {
    database: Database,
    permission: RoomPermissionService,
    dispatcher: ActuationDispatcher<C>,
}

impl<C: CommandChannel> AccessGate<C> {
    /// 创建守卫，协作方全部由构造参数注入
    pub fn new(
        database: Database,
        permission: RoomPermissionService,
        dispatcher: ActuationDispatcher<C>,
    ) -> Self {
        Self {
            database,
            permission,
            dispatcher,
        }
    }

    /// 授权并执行一个门禁请求
    pub async fn actuate(&self, request: &ActuationRequest) -> Result<()> {
        let now = Utc::now();

        // 第一道：已认证
        let guest = self.authenticate(request).await?;

        // 第二道：在房间内
        match &request.target {
            ActuationTarget::Room(room_id) => {
                let allowed = self
                    .permission
                    .has_permission_to_enter_room(&guest.id, &guest.email, now, room_id)
                    .await?;
                if !allowed {
                    return Err(AppError::forbidden(format!(
                        "住客 {} 无权操作房间 {}",
                        guest.id, room_id
                    )));
                }
            }
            // 全局指令不针对单个房间，但调用者必须持有生效预订
            ActuationTarget::Global => {
                self.permission
                    .find_enterable_rooms(&guest.id, &guest.email, now)
                    .await?;
            }
        }

        // 第三道：已入住
        if !self
            .permission
            .is_checked_in(&guest.id, &guest.email, now)
            .await?
        {
            return Err(AppError::forbidden(format!("住客 {} 不在入住窗口内", guest.id)));
        }

        // 三道守卫全部通过，发布指令
        match &request.target {
            ActuationTarget::Global => self.dispatcher.dispatch_global(request.command).await,
            ActuationTarget::Room(room_id) => {
                self.dispatcher.dispatch_room(room_id, request.command).await
            }
        }
    }

    /// 解析调用者身份，缺失或无效即拒绝
    async fn authenticate(&self, request: &ActuationRequest) -> Result<Guest> {
        let guest_id = request
            .guest_id
            .as_deref()
            .ok_or_else(|| AppError::forbidden("请求未携带身份"))?;

        GuestRepository::find_by_guest_id(self.database.pool(), guest_id)
            .await?
            .ok_or_else(|| AppError::forbidden(format!("未知身份: {}", guest_id)))
    }
}
