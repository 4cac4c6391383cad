//! # 提供商注册表
//!
//! 名称 → 提供商的映射，进程内唯一的跨请求共享状态。
//! 由调用方在启动时创建，再以引用传给各请求处理器。

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::provider::Provider;
use crate::error::{AuthError, Result};

/// 提供商注册表
///
/// 四个操作共用同一把读写锁，每个操作对其它线程都是原子的。
#[derive(Debug, Default)]
pub struct Registry {
    providers: RwLock<HashMap<String, Arc<dyn Provider>>>,
}

impl Registry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 以各提供商当前名称注册；同名时后注册者覆盖先注册者
    pub fn use_providers<I>(&self, providers: I)
    where
        I: IntoIterator<Item = Arc<dyn Provider>>,
    {
        let mut map = self.write();
        for provider in providers {
            let name = provider.name().to_string();
            if name.is_empty() {
                tracing::warn!(?provider, "skipping provider registered without a name");
                continue;
            }
            if map.insert(name.clone(), provider).is_some() {
                tracing::debug!(provider = %name, "replaced existing provider");
            } else {
                tracing::debug!(provider = %name, "registered provider");
            }
        }
    }

    /// 按名称查找
    pub fn get_provider(&self, name: &str) -> Result<Arc<dyn Provider>> {
        self.read()
            .get(name)
            .cloned()
            .ok_or_else(|| AuthError::ProviderNotFound(name.to_string()))
    }

    /// 当前映射的快照；修改返回值不影响注册表
    pub fn get_providers(&self) -> HashMap<String, Arc<dyn Provider>> {
        self.read().clone()
    }

    /// 清空注册表
    pub fn clear_providers(&self) {
        self.write().clear();
    }

    /// 已注册数量
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // 单次 insert/clear 不会留下半完成的映射，锁中毒时直接沿用内部数据
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<dyn Provider>>> {
        self.providers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<dyn Provider>>> {
        self.providers.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::faux;

    fn faux_named(name: &str) -> Arc<dyn Provider> {
        let mut provider = faux::new();
        provider.set_name(name.to_string());
        Arc::from(provider)
    }

    #[test]
    fn use_and_get_provider() {
        let registry = Registry::new();
        let provider: Arc<dyn Provider> = Arc::from(faux::new());
        registry.use_providers([provider.clone()]);

        assert_eq!(registry.get_providers().len(), 1);
        let found = registry.get_provider(provider.name()).unwrap();
        assert!(Arc::ptr_eq(&found, &provider));
    }

    #[test]
    fn unknown_provider_message() {
        let registry = Registry::new();
        let err = registry.get_provider("unknown").unwrap_err();
        assert_eq!(err.to_string(), "no provider for unknown exists");
    }

    #[test]
    fn last_registration_wins() {
        let registry = Registry::new();
        let first = faux_named("dup");
        let second = faux_named("dup");
        registry.use_providers([first, second.clone()]);

        assert_eq!(registry.len(), 1);
        assert!(Arc::ptr_eq(&registry.get_provider("dup").unwrap(), &second));
    }

    #[test]
    fn clear_empties_mapping() {
        let registry = Registry::new();
        registry.use_providers([faux_named("a"), faux_named("b")]);
        registry.clear_providers();
        assert!(registry.get_providers().is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn snapshot_is_detached() {
        let registry = Registry::new();
        registry.use_providers([faux_named("a")]);
        let mut snapshot = registry.get_providers();
        snapshot.clear();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn empty_name_is_skipped() {
        let registry = Registry::new();
        registry.use_providers([faux_named("")]);
        assert!(registry.is_empty());
    }

    #[test]
    fn rename_after_registration_is_impossible() {
        let registry = Registry::new();
        let mut handle = faux_named("faux");
        registry.use_providers([handle.clone()]);

        assert!(Arc::get_mut(&mut handle).is_none());
        for (key, provider) in registry.get_providers() {
            assert_eq!(key, provider.name());
        }
    }
}
