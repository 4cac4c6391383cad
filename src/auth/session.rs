//! # 会话契约
//!
//! 会话保存一次登录尝试的中间状态与授权后的凭据。会话本身没有独立身份，
//! 由调用方负责持久化 `marshal` 的结果（例如放进 cookie）。

use async_trait::async_trait;

use super::params::Params;
use super::provider::Provider;
use super::types::Credentials;
use crate::error::Result;

/// 单次登录会话
#[async_trait]
pub trait Session: Send + Sync + std::fmt::Debug + std::fmt::Display {
    /// `begin_auth` 生成的授权跳转地址；未设置时返回 `AuthError::NoAuthUrl`
    fn get_auth_url(&self) -> Result<String>;

    /// 用回调参数向所属提供商兑换访问令牌，成功后就地更新会话并返回访问令牌
    async fn authorize(&mut self, provider: &dyn Provider, params: &dyn Params) -> Result<String>;

    /// 序列化为 JSON；相同字段值总是得到相同输出
    fn marshal(&self) -> Result<String>;

    /// 授权完成后持有的凭据
    fn credentials(&self) -> Option<Credentials>;
}

/// `Display` 实现的公共部分：序列化失败时报告 `fmt::Error`
pub(crate) fn display_marshaled(
    session: &dyn Session,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    let data = session.marshal().map_err(|_| std::fmt::Error)?;
    f.write_str(&data)
}
