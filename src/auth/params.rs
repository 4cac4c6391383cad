//! # 回调参数
//!
//! 厂商回调请求里的查询/表单参数（`code`、`oauth_token`、`oauth_verifier` 等）。
//! 缺失的键一律返回空字符串，必填校验由各提供商在授权阶段自行完成。

use std::collections::{BTreeMap, HashMap};

/// 回调参数访问器
pub trait Params: Send + Sync {
    /// 读取参数值，缺失时返回 `""`
    fn get(&self, key: &str) -> &str;
}

impl Params for HashMap<String, String> {
    fn get(&self, key: &str) -> &str {
        Self::get(self, key).map_or("", String::as_str)
    }
}

impl Params for BTreeMap<String, String> {
    fn get(&self, key: &str) -> &str {
        Self::get(self, key).map_or("", String::as_str)
    }
}

/// 从原始查询串或表单体解析出的回调参数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    values: HashMap<String, String>,
}

impl CallbackParams {
    /// 解析 `a=1&b=2` 形式的字符串，允许带前导 `?`；重复的键保留第一次出现的值
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        url::form_urlencoded::parse(query.as_bytes()).collect()
    }

    /// 从完整回调 URL 中取查询部分解析
    pub fn from_url(url: &url::Url) -> Self {
        Self::parse(url.query().unwrap_or_default())
    }

    /// 追加一个参数（已存在时覆盖）
    #[must_use]
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl Params for CallbackParams {
    fn get(&self, key: &str) -> &str {
        self.values.get(key).map_or("", String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CallbackParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values: HashMap<String, String> = HashMap::new();
        for (key, value) in iter {
            values.entry(key.into()).or_insert_with(|| value.into());
        }
        Self { values }
    }
}
