//! 数据库模块

pub mod grant;
pub mod guest;
pub mod reservation;
pub mod staff;

// 重新导出数据库操作
pub use grant::GrantRepository;
pub use guest::GuestRepository;
pub use reservation::ReservationRepository;
pub use staff::StaffRepository;

use crate::error::Result;
use sqlx::{sqlite::SqlitePool, Pool, Sqlite};
use std::path::Path;

/// 数据库连接池类型
pub type DbPool = Pool<Sqlite>;

/// 数据库管理器
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// 初始化数据库连接
    pub async fn new(database_url: &str) -> Result<Self> {
        // 确保数据库文件所在目录存在
        if let Some(path) = database_url.strip_prefix("sqlite:") {
            if let Some(parent) = Path::new(path).parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // 创建连接池
        let pool = SqlitePool::connect(database_url).await?;

        let database = Self { pool };

        // 初始化数据库表结构
        database.init_tables().await?;

        Ok(database)
    }

    /// 获取数据库连接池
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// 初始化数据库表结构
    async fn init_tables(&self) -> Result<()> {
        // 创建staff表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS staff (
                unique_id INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                name TEXT,
                password_hash TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // 创建guest表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS guest (
                unique_id INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                name TEXT,
                email TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // 创建reservation表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reservation (
                unique_id INTEGER PRIMARY KEY AUTOINCREMENT,
                guest_id TEXT NOT NULL,
                check_in DATETIME NOT NULL,
                check_out DATETIME NOT NULL,
                update_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // 创建reservation_room表（预订的房间集合）
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reservation_room (
                reservation_id INTEGER NOT NULL,
                room_id TEXT NOT NULL,
                UNIQUE (reservation_id, room_id),
                FOREIGN KEY (reservation_id) REFERENCES reservation (unique_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // 创建room_grant表（房间共享授权）
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS room_grant (
                unique_id INTEGER PRIMARY KEY AUTOINCREMENT,
                reservation_id INTEGER NOT NULL,
                room_id TEXT NOT NULL,
                grantee_email TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (reservation_id) REFERENCES reservation (unique_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // 创建索引以提高查询性能
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_staff_id ON staff (id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_guest_id ON guest (id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_reservation_guest ON reservation (guest_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_grant_email ON room_grant (grantee_email)")
            .execute(&self.pool)
            .await?;

        log::info!("数据库表结构初始化完成");
        Ok(())
    }

    /// 检查数据库连接
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// 关闭数据库连接
    pub async fn close(self) {
        self.pool.close().await;
    }

    /// 开始事务
    pub async fn begin_transaction(&self) -> Result<sqlx::Transaction<'_, Sqlite>> {
        Ok(self.pool.begin().await?)
    }
}
