//! 配置管理模块

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 应用程序配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 数据库配置
    pub database: DatabaseConfig,
    /// MQTT消息通道配置
    pub mqtt: MqttConfig,
    /// 门禁码配置
    pub access: AccessConfig,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    pub path: String,
}

/// MQTT配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttConfig {
    /// Broker主机
    pub host: String,
    /// Broker端口
    pub port: u16,
    /// 客户端ID前缀（实际ID附加随机后缀以避免冲突）
    pub client_id: String,
}

/// 门禁码配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// 签发时的时间窗口前移量（秒）。签发的码对应 now + offset 的计数器，
    /// 验证端的前向容差覆盖该区间，使码从签发起约 offset 秒内有效。
    pub code_window_offset: i64,
    /// 验证时向过去回看的秒数（时钟漂移容差）
    pub verify_lookback: i64,
}

impl AppConfig {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<()> {
        if self.database.path.is_empty() {
            return Err(AppError::config("数据库路径不能为空"));
        }

        if self.mqtt.host.is_empty() {
            return Err(AppError::config("MQTT主机不能为空"));
        }

        if self.access.code_window_offset <= 0 {
            return Err(AppError::config("时间窗口前移量必须为正数"));
        }

        if self.access.verify_lookback < 0 {
            return Err(AppError::config("验证回看秒数不能为负数"));
        }

        Ok(())
    }

    /// 获取数据库URL
    pub fn get_database_url(&self) -> String {
        format!("sqlite:{}", self.database.path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                path: "./data/door_access.db".to_string(),
            },
            mqtt: MqttConfig {
                host: "localhost".to_string(),
                port: 1883,
                client_id: "door-access".to_string(),
            },
            access: AccessConfig {
                code_window_offset: 300,
                verify_lookback: 1,
            },
        }
    }
}
