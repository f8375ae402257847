//! 执行指令分发模块
//!
//! 指令经MQTT发布给物理门锁控制器，QoS为至多一次，无回执、无重试。
//! 发布失败会作为错误返回给调用方，而不是乐观地报告成功。

use crate::config::MqttConfig;
use crate::error::Result;
use crate::types::DoorCommand;
use rumqttc::{AsyncClient, MqttOptions, QoS};
use std::time::Duration;
use uuid::Uuid;

/// 全局门禁主题（前台/员工操作）
pub const GLOBAL_TOPIC: &str = "door";

/// 房间主题前缀
const ROOM_TOPIC_PREFIX: &str = "door/";

/// 按房间生成主题名
pub fn room_topic(room_id: &str) -> String {
    format!("{}{}", ROOM_TOPIC_PREFIX, room_id)
}

/// 指令通道抽象
///
/// 生产环境唯一实现为 [`MqttChannel`]，测试中用内存通道记录发布的帧。
pub trait CommandChannel {
    /// 向主题发布一条载荷，尽力而为
    fn publish(
        &self,
        topic: &str,
        payload: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// MQTT指令通道
#[derive(Clone)]
pub struct MqttChannel {
    client: AsyncClient,
}

impl MqttChannel {
    /// 连接Broker并在后台驱动事件循环
    pub async fn connect(config: &MqttConfig) -> Result<Self> {
        // 客户端ID附加随机后缀，避免多实例互踢
        let client_id = format!("{}-{}", config.client_id, Uuid::new_v4().simple());
        let mut options = MqttOptions::new(client_id, config.host.clone(), config.port);
        options.set_keep_alive(Duration::from_secs(30));

        let (client, mut event_loop) = AsyncClient::new(options, 64);

        // 事件循环必须持续轮询，连接错误记录后退避重试
        tokio::spawn(async move {
            loop {
                if let Err(e) = event_loop.poll().await {
                    log::warn!("MQTT事件循环错误: {}", e);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        });

        log::info!("MQTT通道已连接: {}:{}", config.host, config.port);
        Ok(Self { client })
    }
}

impl CommandChannel for MqttChannel {
    async fn publish(&self, topic: &str, payload: &str) -> Result<()> {
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload.as_bytes())
            .await?;
        Ok(())
    }
}

/// 执行指令分发器
pub struct ActuationDispatcher<C: CommandChannel> {
    channel: C,
}

impl<C: CommandChannel> ActuationDispatcher<C> {
    /// 创建分发器
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    /// 向全局主题发布指令
    pub async fn dispatch_global(&self, command: DoorCommand) -> Result<()> {
        self.dispatch(GLOBAL_TOPIC, command).await
    }

    /// 向指定房间主题发布指令
    pub async fn dispatch_room(&self, room_id: &str, command: DoorCommand) -> Result<()> {
        self.dispatch(&room_topic(room_id), command).await
    }

    async fn dispatch(&self, topic: &str, command: DoorCommand) -> Result<()> {
        match self.channel.publish(topic, command.as_str()).await {
            Ok(()) => {
                log::info!("已发布指令 {} -> {}", command.as_str(), topic);
                Ok(())
            }
            Err(e) => {
                log::error!("指令发布失败 {} -> {}: {}", command.as_str(), topic, e);
                Err(e)
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::MemoryChannel;
    use super::*;

    #[test]
    fn test_room_topic_format() {
        assert_eq!(room_topic("101"), "door/101");
        assert_eq!(GLOBAL_TOPIC, "door");
    }

    #[tokio::test]
    async fn test_dispatch_payload_is_literal_command() {
        let channel = MemoryChannel::new();
        let dispatcher = ActuationDispatcher::new(channel.clone());

        dispatcher.dispatch_global(DoorCommand::Lock).await.unwrap();
        dispatcher
            .dispatch_room("101", DoorCommand::Unlock)
            .await
            .unwrap();

        let frames = channel.frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], ("door".to_string(), "lock".to_string()));
        assert_eq!(frames[1], ("door/101".to_string(), "unlock".to_string()));
    }

    #[tokio::test]
    async fn test_dispatch_surfaces_publish_failure() {
        let dispatcher = ActuationDispatcher::new(MemoryChannel::failing());
        let result = dispatcher.dispatch_global(DoorCommand::Sound).await;
        assert!(result.is_err());
    }
}
