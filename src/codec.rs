//! 门禁码载荷编解码模块
//!
//! 线上格式为竖线分隔的四段字符串 `subject|room|document|code`。
//! 分隔符不做转义，因此身份字段禁止包含 `|`，编码时显式拒绝。

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// 字段分隔符
const DELIMITER: char = '|';

/// 门禁码载荷：身份三元组 + 6位码
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPayload {
    /// 员工业务ID
    pub subject_id: String,
    /// 房间ID
    pub room_id: String,
    /// 证件ID
    pub document_id: String,
    /// 零填充的6位码
    pub code: String,
}

impl AccessPayload {
    pub fn new<S: Into<String>>(subject_id: S, room_id: S, document_id: S, code: S) -> Self {
        Self {
            subject_id: subject_id.into(),
            room_id: room_id.into(),
            document_id: document_id.into(),
            code: code.into(),
        }
    }

    /// 派生HMAC密钥：三个身份字段按序拼接
    pub fn secret(&self) -> Vec<u8> {
        let mut secret = String::with_capacity(
            self.subject_id.len() + self.room_id.len() + self.document_id.len(),
        );
        secret.push_str(&self.subject_id);
        secret.push_str(&self.room_id);
        secret.push_str(&self.document_id);
        secret.into_bytes()
    }

    /// 编码为线上字符串
    ///
    /// 身份字段包含分隔符时拒绝编码，否则解码端无法还原字段边界。
    pub fn encode(&self) -> Result<String> {
        for field in [&self.subject_id, &self.room_id, &self.document_id] {
            if field.contains(DELIMITER) {
                return Err(AppError::bad_input(format!(
                    "身份字段不能包含分隔符 '{}': {}",
                    DELIMITER, field
                )));
            }
        }

        Ok(format!(
            "{}{d}{}{d}{}{d}{}",
            self.subject_id,
            self.room_id,
            self.document_id,
            self.code,
            d = DELIMITER
        ))
    }

    /// 从线上字符串解码
    ///
    /// 字段数不等于4即视为畸形载荷。
    pub fn decode(encoded: &str) -> Result<Self> {
        let parts: Vec<&str> = encoded.split(DELIMITER).collect();
        if parts.len() != 4 {
            return Err(AppError::bad_input(format!(
                "载荷字段数错误: 期望4段, 实际{}段",
                parts.len()
            )));
        }

        Ok(Self::new(parts[0], parts[1], parts[2], parts[3]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_roundtrip() {
        let payload = AccessPayload::new("s1", "101", "D123", "755224");
        let encoded = payload.encode().unwrap();

        assert_eq!(encoded, "s1|101|D123|755224");
        assert_eq!(AccessPayload::decode(&encoded).unwrap(), payload);
    }

    #[test]
    fn test_decode_wrong_field_count() {
        assert!(matches!(
            AccessPayload::decode("s1|101|D123"),
            Err(AppError::BadInput(_))
        ));
        assert!(matches!(
            AccessPayload::decode("s1|101|D123|755224|extra"),
            Err(AppError::BadInput(_))
        ));
        assert!(AccessPayload::decode("").is_err());
    }

    #[test]
    fn test_encode_rejects_embedded_delimiter() {
        let payload = AccessPayload::new("s|1", "101", "D123", "755224");
        assert!(matches!(payload.encode(), Err(AppError::BadInput(_))));
    }

    #[test]
    fn test_secret_concatenation() {
        let payload = AccessPayload::new("s1", "101", "D123", "000000");
        assert_eq!(payload.secret(), b"s1101D123".to_vec());
    }
}
