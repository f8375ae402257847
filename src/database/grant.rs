//! 房间共享授权表操作模块

use crate::error::Result;
use crate::types::RoomGrant;
use sqlx::{Row, Sqlite, Transaction};

/// 共享授权数据库操作
///
/// 并发的同三元组创建可能产生重复授权，数据层不去重，
/// 权限判定不受影响（任意一条即可放行）。
pub struct GrantRepository;

impl GrantRepository {
    /// 创建共享授权
    pub async fn create(tx: &mut Transaction<'_, Sqlite>, grant: &RoomGrant) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO room_grant (reservation_id, room_id, grantee_email, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(grant.reservation_id)
        .bind(&grant.room_id)
        .bind(&grant.grantee_email)
        .bind(grant.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// 按邮箱和预订查找授权
    pub async fn find_by_email_and_reservation(
        pool: &sqlx::Pool<Sqlite>,
        grantee_email: &str,
        reservation_id: i64,
    ) -> Result<Option<RoomGrant>> {
        let row = sqlx::query(
            r#"
            SELECT unique_id, reservation_id, room_id, grantee_email, created_at
            FROM room_grant
            WHERE grantee_email = ? AND reservation_id = ?
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(grantee_email)
        .bind(reservation_id)
        .fetch_optional(pool)
        .await?;

        if let Some(row) = row {
            Ok(Some(Self::row_to_grant(row)?))
        } else {
            Ok(None)
        }
    }

    /// 预订名下的全部授权
    pub async fn find_by_reservation(
        pool: &sqlx::Pool<Sqlite>,
        reservation_id: i64,
    ) -> Result<Vec<RoomGrant>> {
        let rows = sqlx::query(
            r#"
            SELECT unique_id, reservation_id, room_id, grantee_email, created_at
            FROM room_grant
            WHERE reservation_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(reservation_id)
        .fetch_all(pool)
        .await?;

        let mut grants = Vec::with_capacity(rows.len());
        for row in rows {
            grants.push(Self::row_to_grant(row)?);
        }

        Ok(grants)
    }

    /// 行转换为授权实体
    fn row_to_grant(row: sqlx::sqlite::SqliteRow) -> Result<RoomGrant> {
        Ok(RoomGrant {
            unique_id: row.try_get("unique_id")?,
            reservation_id: row.try_get("reservation_id")?,
            room_id: row.try_get("room_id")?,
            grantee_email: row.try_get("grantee_email")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{Database, ReservationRepository};
    use crate::types::Reservation;
    use chrono::{Duration, Utc};
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_grant_create_and_find() -> Result<()> {
        let temp_file = NamedTempFile::new()?;
        let db_url = format!("sqlite:{}", temp_file.path().to_str().unwrap());
        let database = Database::new(&db_url).await?;

        // 外键约束要求授权挂在真实预订下
        let now = Utc::now();
        let reservation = Reservation::new(
            "g1",
            now - Duration::days(1),
            now + Duration::days(1),
            vec!["102".to_string()],
        );

        let mut tx = database.begin_transaction().await?;
        let reservation_id = ReservationRepository::create(&mut tx, &reservation).await?;
        let grant = RoomGrant::new(reservation_id, "102", "friend@example.com");
        GrantRepository::create(&mut tx, &grant).await?;
        tx.commit().await?;

        let found = GrantRepository::find_by_email_and_reservation(
            database.pool(),
            "friend@example.com",
            reservation_id,
        )
        .await?;
        assert!(found.is_some());
        assert_eq!(found.unwrap().room_id, "102");

        // 其他邮箱查不到
        let missing = GrantRepository::find_by_email_and_reservation(
            database.pool(),
            "stranger@example.com",
            reservation_id,
        )
        .await?;
        assert!(missing.is_none());

        let all = GrantRepository::find_by_reservation(database.pool(), reservation_id).await?;
        assert_eq!(all.len(), 1);

        database.close().await;
        Ok(())
    }
}
