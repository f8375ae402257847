//! 预订表操作模块

use crate::error::Result;
use crate::types::Reservation;
use chrono::{DateTime, Utc};
use sqlx::{Row, Sqlite, Transaction};

/// 预订数据库操作
pub struct ReservationRepository;

impl ReservationRepository {
    /// 创建预订及其房间集合
    pub async fn create(
        tx: &mut Transaction<'_, Sqlite>,
        reservation: &Reservation,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO reservation (guest_id, check_in, check_out, update_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&reservation.guest_id)
        .bind(reservation.check_in)
        .bind(reservation.check_out)
        .bind(reservation.update_at)
        .execute(&mut **tx)
        .await?;

        let reservation_id = result.last_insert_rowid();

        for room_id in &reservation.rooms {
            sqlx::query(
                r#"
                INSERT INTO reservation_room (reservation_id, room_id)
                VALUES (?, ?)
                "#,
            )
            .bind(reservation_id)
            .bind(room_id)
            .execute(&mut **tx)
            .await?;
        }

        Ok(reservation_id)
    }

    /// 通过unique_id查找预订（含房间集合）
    pub async fn find_by_id(
        pool: &sqlx::Pool<Sqlite>,
        unique_id: i64,
    ) -> Result<Option<Reservation>> {
        let row = sqlx::query(
            r#"
            SELECT unique_id, guest_id, check_in, check_out, update_at
            FROM reservation
            WHERE unique_id = ?
            "#,
        )
        .bind(unique_id)
        .fetch_optional(pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_reservation(pool, row).await?)),
            None => Ok(None),
        }
    }

    /// 查找住客名下覆盖指定时刻的预订
    ///
    /// 多条同时生效时取最近更新的一条，保证结果确定。
    pub async fn find_active_for_owner(
        pool: &sqlx::Pool<Sqlite>,
        guest_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Reservation>> {
        let row = sqlx::query(
            r#"
            SELECT unique_id, guest_id, check_in, check_out, update_at
            FROM reservation
            WHERE guest_id = ? AND check_in <= ? AND check_out >= ?
            ORDER BY update_at DESC
            LIMIT 1
            "#,
        )
        .bind(guest_id)
        .bind(at)
        .bind(at)
        .fetch_optional(pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_reservation(pool, row).await?)),
            None => Ok(None),
        }
    }

    /// 查找通过共享授权关联到指定邮箱、且覆盖指定时刻的预订
    ///
    /// 返回预订及被共享的那一个房间ID。
    pub async fn find_active_for_grantee(
        pool: &sqlx::Pool<Sqlite>,
        grantee_email: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<(Reservation, String)>> {
        let row = sqlx::query(
            r#"
            SELECT r.unique_id, r.guest_id, r.check_in, r.check_out, r.update_at,
                   g.room_id AS granted_room
            FROM reservation r
            JOIN room_grant g ON g.reservation_id = r.unique_id
            WHERE g.grantee_email = ? AND r.check_in <= ? AND r.check_out >= ?
            ORDER BY r.update_at DESC, g.created_at DESC
            LIMIT 1
            "#,
        )
        .bind(grantee_email)
        .bind(at)
        .bind(at)
        .fetch_optional(pool)
        .await?;

        match row {
            Some(row) => {
                let granted_room: String = row.try_get("granted_room")?;
                let reservation = Self::row_to_reservation(pool, row).await?;
                Ok(Some((reservation, granted_room)))
            }
            None => Ok(None),
        }
    }

    /// 获取预订的房间ID集合
    pub async fn rooms_of(pool: &sqlx::Pool<Sqlite>, reservation_id: i64) -> Result<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT room_id
            FROM reservation_room
            WHERE reservation_id = ?
            ORDER BY room_id
            "#,
        )
        .bind(reservation_id)
        .fetch_all(pool)
        .await?;

        let mut rooms = Vec::with_capacity(rows.len());
        for row in rows {
            rooms.push(row.try_get("room_id")?);
        }

        Ok(rooms)
    }

    /// 行转换为预订实体（补全房间集合）
    async fn row_to_reservation(
        pool: &sqlx::Pool<Sqlite>,
        row: sqlx::sqlite::SqliteRow,
    ) -> Result<Reservation> {
        let unique_id: i64 = row.try_get("unique_id")?;
        let rooms = Self::rooms_of(pool, unique_id).await?;

        Ok(Reservation {
            unique_id,
            guest_id: row.try_get("guest_id")?,
            check_in: row.try_get("check_in")?,
            check_out: row.try_get("check_out")?,
            rooms,
            update_at: row.try_get("update_at")?,
        })
    }
}
