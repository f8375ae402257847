//! 一次性门禁码生成算法（RFC 4226 HOTP）
//!
//! 纯函数实现：同一 (secret, counter) 永远得到同一个6位码，
//! 无内部状态，可在并发请求中直接调用。

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// 6位码的取值空间
const CODE_SPACE: u32 = 1_000_000;

/// 基于计数器生成6位门禁码
///
/// # 参数
/// * `secret` - HMAC密钥（身份三元组拼接后的字节序列）
/// * `counter` - 8字节大端表示的计数器
///
/// # 返回值
/// 始终落在 [0, 999999] 区间内的码值
pub fn counter_code(secret: &[u8], counter: u64) -> u32 {
    let mut mac = HmacSha1::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    // RFC 4226 动态截断：末字节低4位作为偏移，取4字节大端值并屏蔽符号位
    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let binary = u32::from_be_bytes([
        digest[offset] & 0x7f,
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]);

    binary % CODE_SPACE
}

/// 基于时间窗口生成6位门禁码
///
/// 计数器 = 当前Unix秒 + `window_offset`。偏移量为0时码仅在当前秒有效；
/// 签发方传入正偏移并由验证方的前向容差覆盖，实现"自签发起N秒内有效"。
pub fn time_code(secret: &[u8], window_offset: i64) -> u32 {
    counter_code(secret, current_counter(window_offset))
}

/// 当前时刻对应的时间窗口计数器
///
/// 时间来源为Unix秒，负偏移导致的负计数器截断为0。
pub fn current_counter(window_offset: i64) -> u64 {
    (Utc::now().timestamp() + window_offset).max(0) as u64
}

/// 将码值渲染为零填充的6位十进制字符串
pub fn format_code(code: u32) -> String {
    format!("{:06}", code)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// RFC 4226 Appendix D 测试向量
    #[test]
    fn test_rfc4226_vectors() {
        let secret = b"12345678901234567890";
        let expected = [
            755224, 287082, 359152, 969429, 338314, 254676, 287922, 162583, 399871, 520489,
        ];

        for (counter, &code) in expected.iter().enumerate() {
            assert_eq!(counter_code(secret, counter as u64), code);
        }
    }

    #[test]
    fn test_counter_code_deterministic() {
        let secret = b"s1101D123";
        let first = counter_code(secret, 1234567890);
        let second = counter_code(secret, 1234567890);

        assert_eq!(first, second);
        assert!(first < 1_000_000);
    }

    #[test]
    fn test_format_code_zero_padded() {
        assert_eq!(format_code(42), "000042");
        assert_eq!(format_code(755224), "755224");
        assert_eq!(format_code(0), "000000");
        assert_eq!(format_code(42).len(), 6);
    }

    #[test]
    fn test_time_code_stable_within_second() {
        let secret = b"stable-secret";
        let counter = current_counter(0);
        // 直接用同一计数器比较，避免跨秒边界的偶发失败
        assert_eq!(counter_code(secret, counter), counter_code(secret, counter));
    }

    #[test]
    fn test_negative_offset_clamped() {
        // 极端负偏移不会panic，计数器截断为0
        let secret = b"secret";
        assert_eq!(time_code(secret, i64::MIN + 1_000_000_000), counter_code(secret, 0));
    }
}
