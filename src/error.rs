//! 错误处理模块

use thiserror::Error;

/// 应用程序错误类型
///
/// NotFound / Forbidden / BadInput 均为客户端错误：请求内不重试，
/// 也不会升级为系统故障。
#[derive(Error, Debug)]
pub enum AppError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("消息通道错误: {0}")]
    Channel(String),

    #[error("未找到: {0}")]
    NotFound(String),

    #[error("权限不足: {0}")]
    Forbidden(String),

    #[error("无效输入: {0}")]
    BadInput(String),

    #[error("门禁码生成错误: {0}")]
    CodeGeneration(String),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// 创建未找到错误
    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        Self::NotFound(msg.into())
    }

    /// 创建权限错误
    pub fn forbidden<T: Into<String>>(msg: T) -> Self {
        Self::Forbidden(msg.into())
    }

    /// 创建无效输入错误
    pub fn bad_input<T: Into<String>>(msg: T) -> Self {
        Self::BadInput(msg.into())
    }

    /// 创建消息通道错误
    pub fn channel<T: Into<String>>(msg: T) -> Self {
        Self::Channel(msg.into())
    }

    /// 创建配置错误
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    /// 是否为客户端错误（不重试）
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::Forbidden(_) | Self::BadInput(_)
        )
    }
}

impl From<rumqttc::ClientError> for AppError {
    fn from(err: rumqttc::ClientError) -> Self {
        Self::Channel(err.to_string())
    }
}

/// 应用程序Result类型
pub type Result<T> = std::result::Result<T, AppError>;
