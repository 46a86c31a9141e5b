//! 分类结果缓存
//! 以 (配置指纹, URL, 时长) 为键记录最近一次广告判定，容量不设上限，需显式清空

use std::collections::HashMap;

use serde::Serialize;

/// 缓存统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub size: usize,
    pub total_detections: u64,
    pub ad_detections: u64,
}

/// 缓存键：配置指纹 + URL + 时长（按位比较，未知时长为 None）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    config: u64,
    url: String,
    duration_bits: Option<u64>,
}

impl CacheKey {
    fn new(config: u64, url: &str, duration: Option<f64>) -> Self {
        Self {
            config,
            url: url.to_string(),
            duration_bits: duration.map(f64::to_bits),
        }
    }
}

/// 分类结果缓存
#[derive(Debug, Default)]
pub struct ClassifierCache {
    entries: HashMap<CacheKey, bool>,
    total_detections: u64,
    ad_detections: u64,
}

impl ClassifierCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 查询缓存，`config` 为 [`FilterConfiguration::fingerprint`] 的结果
    ///
    /// [`FilterConfiguration::fingerprint`]: crate::config::FilterConfiguration::fingerprint
    pub fn get(&self, config: u64, url: &str, duration: Option<f64>) -> Option<bool> {
        self.entries.get(&CacheKey::new(config, url, duration)).copied()
    }

    /// 写入/覆盖缓存
    pub fn insert(&mut self, config: u64, url: &str, duration: Option<f64>, is_ad: bool) {
        self.entries.insert(CacheKey::new(config, url, duration), is_ad);
    }

    /// 记录一次检测（含缓存命中）
    pub fn record(&mut self, is_ad: bool) {
        self.total_detections += 1;
        if is_ad {
            self.ad_detections += 1;
        }
    }

    /// 清空缓存与统计
    pub fn clear(&mut self) {
        self.entries.clear();
        self.total_detections = 0;
        self.ad_detections = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            total_detections: self.total_detections,
            ad_detections: self.ad_detections,
        }
    }
}
