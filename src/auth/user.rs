//! # 统一用户资料

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 与厂商无关的用户资料。
///
/// `provider` 与 `user_id` 共同标识一次资料获取结果，其余字段均为尽力填充，
/// 厂商未提供时为空。`raw_data` 保留厂商原始响应，供需要额外字段的调用方使用。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// 提供商注册名
    pub provider: String,
    /// 厂商侧用户 ID
    pub user_id: String,
    /// 显示名称
    pub name: String,
    /// 名
    pub first_name: String,
    /// 姓
    pub last_name: String,
    /// 昵称
    pub nick_name: String,
    /// 个人简介
    pub description: String,
    /// 所在地
    pub location: String,
    /// 邮箱
    pub email: String,
    /// 头像地址
    pub avatar_url: String,
    /// 访问令牌
    pub access_token: String,
    /// 仅 OAuth1 提供商填充
    pub access_token_secret: String,
    /// 刷新令牌
    pub refresh_token: String,
    /// 访问令牌过期时间
    pub expires_at: Option<DateTime<Utc>>,
    /// 厂商返回的原始资料
    pub raw_data: Map<String, Value>,
}

impl User {
    /// 以提供商名创建空资料
    pub fn for_provider<S: Into<String>>(provider: S) -> Self {
        Self {
            provider: provider.into(),
            ..Self::default()
        }
    }
}

/// 从 JSON 对象中读取字符串字段，缺失或非字符串时返回空串
pub(crate) fn string_field(raw: &Map<String, Value>, key: &str) -> String {
    match raw.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}
