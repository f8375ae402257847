//! 员工表操作模块

use crate::error::Result;
use crate::types::Staff;
use sqlx::{Row, Sqlite, Transaction};

/// 员工数据库操作
pub struct StaffRepository;

impl StaffRepository {
    /// 创建员工记录
    pub async fn create(tx: &mut Transaction<'_, Sqlite>, staff: &Staff) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO staff (id, name, password_hash)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&staff.id)
        .bind(&staff.name)
        .bind(&staff.password_hash)
        .execute(&mut **tx)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// 通过业务ID查找员工
    pub async fn find_by_staff_id(
        pool: &sqlx::Pool<Sqlite>,
        staff_id: &str,
    ) -> Result<Option<Staff>> {
        let row = sqlx::query(
            r#"
            SELECT unique_id, id, name, password_hash
            FROM staff
            WHERE id = ?
            "#,
        )
        .bind(staff_id)
        .fetch_optional(pool)
        .await?;

        if let Some(row) = row {
            Ok(Some(Self::row_to_staff(row)?))
        } else {
            Ok(None)
        }
    }

    /// 员工是否存在
    pub async fn exists_by_staff_id(pool: &sqlx::Pool<Sqlite>, staff_id: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM staff WHERE id = ?")
            .bind(staff_id)
            .fetch_optional(pool)
            .await?;

        Ok(row.is_some())
    }

    /// 行转换为员工实体
    fn row_to_staff(row: sqlx::sqlite::SqliteRow) -> Result<Staff> {
        Ok(Staff {
            unique_id: row.try_get("unique_id")?,
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            password_hash: row.try_get("password_hash")?,
        })
    }
}
