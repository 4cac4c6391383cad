//! # 身份厂商适配
//!
//! 每个厂商一个模块，提供 `new(...) -> Result<Box<dyn Provider>>` 工厂函数。
//! OAuth2 厂商只描述端点、默认范围与资料映射，流程由 `crate::oauth2` 驱动；
//! Xero 走 `crate::oauth1`。

pub mod azuread;
pub mod bitly;
pub mod faux;
pub mod microsoftonline;
pub mod reddit;
pub mod xero;

pub use azuread::AzureAd;
pub use bitly::Bitly;
pub use faux::Faux;
pub use microsoftonline::MicrosoftOnline;
pub use reddit::Reddit;
pub use xero::Xero;
