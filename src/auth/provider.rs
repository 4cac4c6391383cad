//! # 提供商契约
//!
//! 每个身份厂商一个实现，统一驱动 `begin_auth → authorize → fetch_user` 流程。
//! OAuth1 与 OAuth2 两个协议族对外暴露完全相同的方法与错误类别，
//! 调用方无需按厂商分支。

use async_trait::async_trait;

use super::params::Params;
use super::session::Session;
use super::types::{Credentials, OAuthToken, PendingGrant};
use super::user::User;
use crate::error::Result;

/// 身份提供商
#[async_trait]
pub trait Provider: Send + Sync + std::fmt::Debug {
    /// 注册表中使用的名称
    fn name(&self) -> &str;

    /// 修改名称。注册后注册表持有共享引用，此方法无法再被调用；
    /// 需要换名时先改名再注册。
    fn set_name(&mut self, name: String);

    /// 开始一次登录：生成带 `state` 的授权跳转地址。
    ///
    /// OAuth2 仅在本地拼接 URL；OAuth1 需要先向厂商申请请求令牌，可能失败。
    async fn begin_auth(&self, state: &str) -> Result<Box<dyn Session>>;

    /// 将 `Session::marshal` 的输出还原为本提供商的会话
    fn unmarshal_session(&self, data: &str) -> Result<Box<dyn Session>>;

    /// 用回调中的授权凭据在厂商令牌端点换取访问凭据。
    ///
    /// 由 `Session::authorize` 调用；会话根据返回的凭据类型更新自身字段。
    async fn exchange_grant(
        &self,
        grant: PendingGrant<'_>,
        params: &dyn Params,
    ) -> Result<Credentials>;

    /// 使用会话中的访问凭据获取统一用户资料
    async fn fetch_user(&self, session: &dyn Session) -> Result<User>;

    /// 是否支持刷新令牌
    fn refresh_token_available(&self) -> bool;

    /// 刷新访问令牌；不支持刷新的厂商返回 `Ok(None)`
    async fn refresh_token(&self, refresh_token: &str) -> Result<Option<OAuthToken>>;

    /// 打开后以 debug 级别记录厂商原始响应
    fn debug(&self, enabled: bool);
}
