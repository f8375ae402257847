//! 门禁码服务模块 - 签发与验证
//!
//! 码不落库：密钥由身份三元组现场拼接派生，同一三元组随时可重算出
//! 同一个码，签发与验证因此完全无状态。

use crate::codec::AccessPayload;
use crate::config::AccessConfig;
use crate::database::{Database, StaffRepository};
use crate::error::{AppError, Result};
use crate::otp;

/// 门禁码服务
pub struct DoorAccessService {
    database: Database,
    config: AccessConfig,
}

impl DoorAccessService {
    /// 创建新的门禁码服务实例
    pub fn new(database: Database, config: AccessConfig) -> Self {
        Self { database, config }
    }

    /// 为员工签发门禁码
    ///
    /// 三元组 (员工ID, 房间ID, 证件ID) 全部来自调用方，不做占位替换。
    /// 码对应 now + code_window_offset 的时间窗口，配合验证端的前向
    /// 容差，自签发起约 offset 秒内可被接受。
    ///
    /// # 失败
    /// * 员工不存在 → NotFound
    /// * 身份字段含分隔符 → BadInput
    pub async fn issue_code(
        &self,
        subject_id: &str,
        room_id: &str,
        document_id: &str,
    ) -> Result<String> {
        let staff = StaffRepository::find_by_staff_id(self.database.pool(), subject_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("员工不存在: {}", subject_id)))?;

        let mut payload = AccessPayload::new(staff.id.as_str(), room_id, document_id, "");
        let code = otp::time_code(&payload.secret(), self.config.code_window_offset);
        payload.code = otp::format_code(code);

        let encoded = payload.encode()?;
        log::info!(
            "为员工 {} 签发门禁码, 房间 {}, 窗口前移 {} 秒",
            subject_id,
            room_id,
            self.config.code_window_offset
        );

        Ok(encoded)
    }

    /// 验证门禁码
    ///
    /// 在 [now - verify_lookback, now + code_window_offset] 容差带内
    /// 逐个窗口重算比对，覆盖签发前移与时钟漂移。
    ///
    /// # 失败
    /// * 载荷畸形（字段数错误、码非数字） → BadInput
    pub async fn verify(&self, encoded: &str) -> Result<bool> {
        let payload = AccessPayload::decode(encoded)?;

        let presented: u32 = payload
            .code
            .parse()
            .map_err(|_| AppError::bad_input(format!("码字段不是数字: {}", payload.code)))?;

        let secret = payload.secret();
        let start = otp::current_counter(-self.config.verify_lookback);
        let end = otp::current_counter(self.config.code_window_offset);

        for counter in start..=end {
            if otp::counter_code(&secret, counter) == presented {
                return Ok(true);
            }
        }

        log::debug!("门禁码验证失败: subject={}", payload.subject_id);
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Staff;
    use tempfile::NamedTempFile;

    async fn test_service() -> Result<DoorAccessService> {
        let temp_file = NamedTempFile::new()?;
        let db_url = format!("sqlite:{}", temp_file.path().to_str().unwrap());
        temp_file.keep().map_err(|e| e.error)?;
        let database = Database::new(&db_url).await?;

        let mut tx = database.begin_transaction().await?;
        StaffRepository::create(&mut tx, &Staff::new("s1")).await?;
        tx.commit().await?;

        let config = AccessConfig {
            code_window_offset: 300,
            verify_lookback: 1,
        };
        Ok(DoorAccessService::new(database, config))
    }

    #[tokio::test]
    async fn test_issue_code_matches_recomputed() -> Result<()> {
        let service = test_service().await?;

        let encoded = service.issue_code("s1", "101", "D123").await?;
        let payload = AccessPayload::decode(&encoded)?;

        assert_eq!(payload.subject_id, "s1");
        assert_eq!(payload.room_id, "101");
        assert_eq!(payload.document_id, "D123");
        assert_eq!(payload.code.len(), 6);

        // 独立重算同一窗口的码必须一致
        let expected = otp::format_code(otp::time_code(b"s1101D123", 300));
        assert_eq!(payload.code, expected);

        Ok(())
    }

    #[tokio::test]
    async fn test_issued_code_verifies_immediately() -> Result<()> {
        let service = test_service().await?;

        let encoded = service.issue_code("s1", "101", "D123").await?;
        assert!(service.verify(&encoded).await?);

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_staff_rejected() -> Result<()> {
        let service = test_service().await?;

        let result = service.issue_code("ghost", "101", "D123").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        Ok(())
    }

    #[tokio::test]
    async fn test_verify_rejects_malformed_payload() -> Result<()> {
        let service = test_service().await?;

        assert!(matches!(
            service.verify("only|three|fields").await,
            Err(AppError::BadInput(_))
        ));
        assert!(matches!(
            service.verify("s1|101|D123|notdigits").await,
            Err(AppError::BadInput(_))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_verify_rejects_wrong_code() -> Result<()> {
        let service = test_service().await?;

        // 在一个宽裕的窗口区间内收集所有可能命中的码，
        // 然后挑一个必然不命中的码值
        let secret = b"s1101D123";
        let start = otp::current_counter(-10);
        let end = otp::current_counter(310);
        let mut reachable: Vec<u32> = (start..=end)
            .map(|c| otp::counter_code(secret, c))
            .collect();
        reachable.sort_unstable();

        let unreachable = (0..1_000_000u32)
            .find(|v| reachable.binary_search(v).is_err())
            .unwrap();

        let code = otp::format_code(unreachable);
        let payload = AccessPayload::new("s1", "101", "D123", code.as_str());
        assert!(!service.verify(&payload.encode()?).await?);

        Ok(())
    }
}
