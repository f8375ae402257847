//! 住客表操作模块

use crate::error::Result;
use crate::types::Guest;
use sqlx::{Row, Sqlite, Transaction};

/// 住客数据库操作
pub struct GuestRepository;

impl GuestRepository {
    /// 创建住客记录
    pub async fn create(tx: &mut Transaction<'_, Sqlite>, guest: &Guest) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO guest (id, name, email)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&guest.id)
        .bind(&guest.name)
        .bind(&guest.email)
        .execute(&mut **tx)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// 通过业务ID查找住客
    pub async fn find_by_guest_id(
        pool: &sqlx::Pool<Sqlite>,
        guest_id: &str,
    ) -> Result<Option<Guest>> {
        let row = sqlx::query(
            r#"
            SELECT unique_id, id, name, email
            FROM guest
            WHERE id = ?
            "#,
        )
        .bind(guest_id)
        .fetch_optional(pool)
        .await?;

        if let Some(row) = row {
            Ok(Some(Self::row_to_guest(row)?))
        } else {
            Ok(None)
        }
    }

    /// 行转换为住客实体
    fn row_to_guest(row: sqlx::sqlite::SqliteRow) -> Result<Guest> {
        Ok(Guest {
            unique_id: row.try_get("unique_id")?,
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
        })
    }
}
