//! 酒店门禁授权系统 - 主程序入口

use hotel_door_access::access::{AccessGate, DoorAccessService, RoomPermissionService};
use hotel_door_access::config::AppConfig;
use hotel_door_access::database::Database;
use hotel_door_access::dispatch::{ActuationDispatcher, MqttChannel};
use hotel_door_access::error::Result;
use std::env;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    init_logger();

    log::info!("🚀 酒店门禁授权系统启动中...");

    // 获取配置文件路径
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.json".to_string());

    // 检查配置文件是否存在
    if !Path::new(&config_path).exists() {
        log::error!("配置文件 {} 不存在！", config_path);
        log::info!("请创建配置文件，参考格式：");
        print_config_example();
        return Err(hotel_door_access::AppError::config(format!(
            "配置文件 {} 不存在",
            config_path
        )));
    }

    // 加载配置
    log::info!("📖 加载配置文件: {}", config_path);
    let config = AppConfig::from_file(&config_path)?;

    log::info!("✅ 配置验证通过");
    log::info!("🗄️  数据库路径: {}", config.database.path);
    log::info!("📡 MQTT Broker: {}:{}", config.mqtt.host, config.mqtt.port);
    log::info!("⏰ 门禁码窗口前移: {} 秒", config.access.code_window_offset);

    // 初始化数据库
    let database = Database::new(&config.get_database_url()).await?;
    database.ping().await?;

    // 连接MQTT通道
    let channel = MqttChannel::connect(&config.mqtt).await?;
    let dispatcher = ActuationDispatcher::new(channel);

    // 组装服务（协作方显式注入，进程启动时构造一次）
    let permission = RoomPermissionService::new(database.clone());
    let _door_access = DoorAccessService::new(database.clone(), config.access.clone());
    let _gate = AccessGate::new(database.clone(), permission, dispatcher);

    log::info!("🎯 门禁服务准备就绪，等待外部路由层接入");

    // 阻塞直到收到停止信号
    wait_for_shutdown().await?;

    database.close().await;
    log::info!("👋 酒店门禁授权系统已停止");
    Ok(())
}

/// 初始化日志记录器
fn init_logger() {
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&log_level))
        .format_timestamp_secs()
        .init();

    log::info!("📝 日志级别: {}", log_level);
}

/// 打印配置文件示例
fn print_config_example() {
    println!(
        r#"
{{
  "database": {{
    "path": "./data/door_access.db"
  }},
  "mqtt": {{
    "host": "localhost",
    "port": 1883,
    "client_id": "door-access"
  }},
  "access": {{
    "code_window_offset": 300,
    "verify_lookback": 1
  }}
}}

配置说明：
- database.path: SQLite数据库文件路径
- mqtt.host / mqtt.port: 门锁控制器接入的MQTT Broker
- mqtt.client_id: 客户端ID前缀（自动附加随机后缀）
- access.code_window_offset: 门禁码签发窗口前移秒数（约等于有效期）
- access.verify_lookback: 验证时向过去回看的秒数（时钟漂移容差）
"#
    );
}

/// 处理优雅关闭信号
async fn wait_for_shutdown() -> Result<()> {
    use tokio::signal;

    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => {
                log::info!("收到SIGTERM信号，开始优雅关闭...");
            }
            _ = sigint.recv() => {
                log::info!("收到SIGINT信号，开始优雅关闭...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        log::info!("收到Ctrl+C信号，开始优雅关闭...");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_example() {
        // 测试配置示例打印不会panic
        print_config_example();
    }
}
