//! # 错误处理
//!
//! 登录流程中所有失败的统一错误类型。每个错误只作用于当前这一次登录尝试，
//! 不做任何自动重试：授权码与 verifier 都是一次性的。

use thiserror::Error;

/// A unified `Result` type for the entire crate.
pub type Result<T> = std::result::Result<T, AuthError>;

/// 登录流程的主要错误类型
#[derive(Debug, Error)]
pub enum AuthError {
    /// 注册表中没有该名称的提供商
    #[error("no provider for {0} exists")]
    ProviderNotFound(String),

    /// 会话还没有（或已不再有）授权跳转地址
    #[error("an AuthURL has not been set")]
    NoAuthUrl,

    /// 用授权凭据换取访问令牌失败（网络或厂商拒绝）
    #[error("{provider} token exchange failed: {message}")]
    TokenExchangeFailed {
        provider: String,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 厂商返回了结构完整但语义无效的令牌
    #[error("invalid token received from {provider}: {reason}")]
    InvalidToken { provider: String, reason: String },

    /// 用户资料接口调用失败
    #[error("{provider} profile fetch failed: {message}")]
    ProfileFetchFailed {
        provider: String,
        status: Option<u16>,
        message: String,
    },

    /// 用户资料接口因授权范围不足而拒绝（需要重新征求授权）
    #[error(
        "{provider} responded with a 403 because the {scope} scope, which is required to fetch the user profile, was not granted"
    )]
    InsufficientScope { provider: String, scope: String },

    /// 会话字符串无法解析
    #[error("failed to decode session: {0}")]
    SessionDecodeFailed(#[source] serde_json::Error),

    /// 会话无法序列化
    #[error("failed to encode session: {0}")]
    SessionEncodeFailed(#[source] serde_json::Error),

    /// 会话与提供商不属于同一协议族
    #[error("{provider} expected {expected} credentials but the session holds a different kind")]
    CredentialsMismatch {
        provider: String,
        expected: &'static str,
    },

    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },
}

/// 错误分类，便于调用方按类别分支处理
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 见 [`AuthError::ProviderNotFound`]
    ProviderNotFound,
    /// 见 [`AuthError::NoAuthUrl`]
    NoAuthUrl,
    /// 见 [`AuthError::TokenExchangeFailed`]
    TokenExchangeFailed,
    /// 见 [`AuthError::InvalidToken`]
    InvalidToken,
    /// 见 [`AuthError::ProfileFetchFailed`]
    ProfileFetchFailed,
    /// 见 [`AuthError::InsufficientScope`]
    InsufficientScope,
    /// 见 [`AuthError::SessionDecodeFailed`]
    SessionDecodeFailed,
    /// 见 [`AuthError::SessionEncodeFailed`]
    SessionEncodeFailed,
    /// 见 [`AuthError::CredentialsMismatch`]
    CredentialsMismatch,
    /// 见 [`AuthError::Config`]
    Config,
}

impl AuthError {
    /// 创建令牌交换错误
    pub fn token_exchange<P: Into<String>, M: Into<String>>(provider: P, message: M) -> Self {
        Self::TokenExchangeFailed {
            provider: provider.into(),
            message: message.into(),
            source: None,
        }
    }

    /// 创建带源错误的令牌交换错误
    pub fn token_exchange_with_source<P, M, E>(provider: P, message: M, source: E) -> Self
    where
        P: Into<String>,
        M: Into<String>,
        E: Into<anyhow::Error>,
    {
        Self::TokenExchangeFailed {
            provider: provider.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建无效令牌错误
    pub fn invalid_token<P: Into<String>, R: Into<String>>(provider: P, reason: R) -> Self {
        Self::InvalidToken {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// 创建资料获取错误
    pub fn profile_fetch<P: Into<String>, M: Into<String>>(
        provider: P,
        status: Option<u16>,
        message: M,
    ) -> Self {
        Self::ProfileFetchFailed {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    /// 创建配置错误
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带源错误的配置错误
    pub fn config_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: Into<anyhow::Error>,
    {
        Self::Config {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 错误所属类别
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ProviderNotFound(_) => ErrorKind::ProviderNotFound,
            Self::NoAuthUrl => ErrorKind::NoAuthUrl,
            Self::TokenExchangeFailed { .. } => ErrorKind::TokenExchangeFailed,
            Self::InvalidToken { .. } => ErrorKind::InvalidToken,
            Self::ProfileFetchFailed { .. } => ErrorKind::ProfileFetchFailed,
            Self::InsufficientScope { .. } => ErrorKind::InsufficientScope,
            Self::SessionDecodeFailed(_) => ErrorKind::SessionDecodeFailed,
            Self::SessionEncodeFailed(_) => ErrorKind::SessionEncodeFailed,
            Self::CredentialsMismatch { .. } => ErrorKind::CredentialsMismatch,
            Self::Config { .. } => ErrorKind::Config,
        }
    }

    /// 资料获取失败（包括授权范围不足这一子类）
    pub const fn is_profile_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::ProfileFetchFailed { .. } | Self::InsufficientScope { .. }
        )
    }

    /// 调用方应丢弃当前会话并从 `begin_auth` 重新开始
    pub const fn requires_restart(&self) -> bool {
        matches!(
            self,
            Self::NoAuthUrl
                | Self::TokenExchangeFailed { .. }
                | Self::InvalidToken { .. }
                | Self::SessionDecodeFailed(_)
        )
    }
}

impl From<toml::de::Error> for AuthError {
    fn from(err: toml::de::Error) -> Self {
        Self::config_with_source("配置文件解析失败", err)
    }
}
