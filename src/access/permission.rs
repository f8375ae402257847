//! 房间进入权限评估模块
//!
//! 每次请求现场评估，无缓存状态。归属者对预订名下全部房间有权限，
//! 受共享授权的住客只对被共享的那一个房间有权限。

use crate::database::{Database, GrantRepository, ReservationRepository};
use crate::error::{AppError, Result};
use crate::types::{Reservation, RoomGrant};
use chrono::{DateTime, Utc};

/// 请求者相对预订的身份
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequesterRole {
    /// 预订归属者
    Owner,
    /// 共享授权受益人
    Grantee,
}

/// 权限评估结果：生效的预订与可进入的房间集合
#[derive(Debug, Clone)]
pub struct EnterableRooms {
    pub reservation: Reservation,
    pub role: RequesterRole,
    pub rooms: Vec<String>,
}

/// 房间权限服务
pub struct RoomPermissionService {
    database: Database,
}

impl RoomPermissionService {
    /// 创建新的权限服务实例
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// 定位住客在指定时刻可进入的房间集合
    ///
    /// 归属预订优先于共享授权；同类多条生效预订取最近更新的一条。
    ///
    /// # 失败
    /// * 既非归属者也无共享授权 → NotFound（未在入住时间内）
    pub async fn find_enterable_rooms(
        &self,
        guest_id: &str,
        email: &str,
        at: DateTime<Utc>,
    ) -> Result<EnterableRooms> {
        // 归属者：预订名下全部房间
        if let Some(reservation) =
            ReservationRepository::find_active_for_owner(self.database.pool(), guest_id, at)
                .await?
        {
            let rooms = reservation.rooms.clone();
            return Ok(EnterableRooms {
                reservation,
                role: RequesterRole::Owner,
                rooms,
            });
        }

        // 受授权者：仅被共享的单个房间
        if let Some((reservation, granted_room)) =
            ReservationRepository::find_active_for_grantee(self.database.pool(), email, at)
                .await?
        {
            return Ok(EnterableRooms {
                reservation,
                role: RequesterRole::Grantee,
                rooms: vec![granted_room],
            });
        }

        Err(AppError::not_found(format!(
            "住客 {} 未在入住时间内",
            guest_id
        )))
    }

    /// 住客在指定时刻是否可以进入指定房间
    pub async fn has_permission_to_enter_room(
        &self,
        guest_id: &str,
        email: &str,
        at: DateTime<Utc>,
        room_id: &str,
    ) -> Result<bool> {
        let enterable = self.find_enterable_rooms(guest_id, email, at).await?;
        Ok(enterable.rooms.iter().any(|r| r == room_id))
    }

    /// 住客在指定时刻是否处于入住窗口内
    pub async fn is_checked_in(
        &self,
        guest_id: &str,
        email: &str,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        match self.find_enterable_rooms(guest_id, email, at).await {
            Ok(enterable) => Ok(enterable.reservation.covers(at)),
            Err(AppError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// 将预订中的一个房间共享给指定邮箱
    ///
    /// # 失败
    /// * 预订不存在 → NotFound
    /// * 调用者不是预订归属者 → Forbidden
    /// * 房间不在预订的房间集合内 → BadInput
    pub async fn share_room(
        &self,
        owner_id: &str,
        grantee_email: &str,
        reservation_id: i64,
        room_id: &str,
    ) -> Result<i64> {
        let reservation =
            ReservationRepository::find_by_id(self.database.pool(), reservation_id)
                .await?
                .ok_or_else(|| {
                    AppError::not_found(format!("预订不存在: {}", reservation_id))
                })?;

        if reservation.guest_id != owner_id {
            return Err(AppError::forbidden("只有预订归属者可以共享房间"));
        }

        if !reservation.has_room(room_id) {
            return Err(AppError::bad_input(format!(
                "房间 {} 不属于预订 {}",
                room_id, reservation_id
            )));
        }

        let grant = RoomGrant::new(reservation_id, room_id, grantee_email);
        let mut tx = self.database.begin_transaction().await?;
        let grant_id = GrantRepository::create(&mut tx, &grant).await?;
        tx.commit().await?;

        log::info!(
            "住客 {} 将房间 {} 共享给 {} (预订 {})",
            owner_id,
            room_id,
            grantee_email,
            reservation_id
        );
        Ok(grant_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::types::Reservation;
    use chrono::Duration;
    use tempfile::NamedTempFile;

    /// 建库并录入一条覆盖当前时刻的预订：g1 名下房间 {1, 2, 3}
    async fn setup() -> Result<(RoomPermissionService, i64)> {
        let temp_file = NamedTempFile::new()?;
        let db_url = format!("sqlite:{}", temp_file.path().to_str().unwrap());
        temp_file.keep().map_err(|e| e.error)?;
        let database = Database::new(&db_url).await?;

        let now = Utc::now();
        let reservation = Reservation::new(
            "g1",
            now - Duration::days(1),
            now + Duration::days(1),
            vec!["1".to_string(), "2".to_string(), "3".to_string()],
        );

        let mut tx = database.begin_transaction().await?;
        let reservation_id = ReservationRepository::create(&mut tx, &reservation).await?;
        tx.commit().await?;

        Ok((RoomPermissionService::new(database), reservation_id))
    }

    #[tokio::test]
    async fn test_owner_enters_any_assigned_room() -> Result<()> {
        let (service, _) = setup().await?;
        let now = Utc::now();

        assert!(
            service
                .has_permission_to_enter_room("g1", "g1@example.com", now, "2")
                .await?
        );
        assert!(
            !service
                .has_permission_to_enter_room("g1", "g1@example.com", now, "99")
                .await?
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_grantee_enters_only_shared_room() -> Result<()> {
        let (service, reservation_id) = setup().await?;
        let now = Utc::now();

        service
            .share_room("g1", "friend@example.com", reservation_id, "2")
            .await?;

        assert!(
            service
                .has_permission_to_enter_room("g2", "friend@example.com", now, "2")
                .await?
        );
        assert!(
            !service
                .has_permission_to_enter_room("g2", "friend@example.com", now, "3")
                .await?
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_share_room_by_non_owner_forbidden() -> Result<()> {
        let (service, reservation_id) = setup().await?;

        let result = service
            .share_room("g2", "friend@example.com", reservation_id, "2")
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        Ok(())
    }

    #[tokio::test]
    async fn test_share_room_outside_reservation_rejected() -> Result<()> {
        let (service, reservation_id) = setup().await?;

        let result = service
            .share_room("g1", "friend@example.com", reservation_id, "99")
            .await;
        assert!(matches!(result, Err(AppError::BadInput(_))));

        Ok(())
    }

    #[tokio::test]
    async fn test_share_room_unknown_reservation() -> Result<()> {
        let (service, _) = setup().await?;

        let result = service
            .share_room("g1", "friend@example.com", 9999, "2")
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        Ok(())
    }

    #[tokio::test]
    async fn test_not_checked_in() -> Result<()> {
        let (service, _) = setup().await?;
        let outside = Utc::now() + Duration::days(7);

        // 窗口外：权限查询失败，checked-in 为 false
        let result = service
            .has_permission_to_enter_room("g1", "g1@example.com", outside, "2")
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        assert!(!service.is_checked_in("g1", "g1@example.com", outside).await?);
        assert!(service.is_checked_in("g1", "g1@example.com", Utc::now()).await?);

        Ok(())
    }
}
