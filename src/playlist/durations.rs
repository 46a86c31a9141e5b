//! 广告切片时长表
//! 部分资源站插入的广告切片时长固定，可按时长精确识别
//! - 资源站专属时长：任何模式下都生效
//! - 全局通用时长：仅非严格模式生效

use std::collections::HashMap;

use tracing::trace;
use url::Url;

/// 默认匹配容差（秒）
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// 浮点比较余量，避免 5.01 - 5.0 这类误差越过容差
const EPSILON: f64 = 1e-9;

/// 时长命中来源
#[derive(Debug, Clone, PartialEq)]
pub enum DurationMatch {
    /// 资源站专属时长
    Source { source: String, duration: f64 },
    /// 全局通用时长
    Global { duration: f64 },
}

/// 广告时长表
#[derive(Debug, Clone, PartialEq)]
pub struct AdDurationTable {
    pub tolerance: f64,
    pub global: Vec<f64>,
    pub sources: HashMap<String, Vec<f64>>,
}

impl Default for AdDurationTable {
    fn default() -> Self {
        let sources = [
            ("ruyi", vec![5.64, 2.96, 3.48, 4.0, 0.96, 1.2]),
            ("ffzy", vec![6.4, 3.2, 2.64]),
            ("lzzy", vec![7.2, 2.4, 1.88]),
            ("bfzy", vec![3.36, 4.88]),
        ]
        .into_iter()
        .map(|(id, durations)| (id.to_string(), durations))
        .collect();

        Self {
            tolerance: DEFAULT_TOLERANCE,
            global: vec![5.64, 2.96, 3.48, 0.96],
            sources,
        }
    }
}

impl AdDurationTable {
    /// 空表
    pub fn empty() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            global: Vec::new(),
            sources: HashMap::new(),
        }
    }

    /// 设置资源站专属时长（覆盖原有列表）
    pub fn set_source(&mut self, source: impl Into<String>, durations: Vec<f64>) {
        self.sources.insert(source.into(), durations);
    }

    /// 判断时长是否为已知广告时长
    ///
    /// 专属时长优先；`strict_mode` 为真时不使用全局时长。
    pub fn matches(&self, duration: f64, source: Option<&str>, strict_mode: bool) -> Option<DurationMatch> {
        if !duration.is_finite() {
            return None;
        }

        if let Some(source) = source {
            if let Some(durations) = self.sources.get(source) {
                if let Some(hit) = durations.iter().copied().find(|d| self.close(*d, duration)) {
                    return Some(DurationMatch::Source { source: source.to_string(), duration: hit });
                }
            }
        }

        if strict_mode {
            return None;
        }

        self.global
            .iter()
            .copied()
            .find(|d| self.close(*d, duration))
            .map(|hit| DurationMatch::Global { duration: hit })
    }

    fn close(&self, expected: f64, actual: f64) -> bool {
        (expected - actual).abs() <= self.tolerance + EPSILON
    }

    /// 按播放列表地址的主机名推断资源站标识
    ///
    /// 主机名按 `.` 与 `-` 切分，资源站标识须与连续的完整片段一致，
    /// 如 `cdn.ruyi-vod.com` 命中 `ruyi`，`notruyi.com` 不命中。
    pub fn detect_source(&self, manifest_url: &str) -> Option<String> {
        let url = Url::parse(manifest_url).ok()?;
        let host = url.host_str()?.to_lowercase();
        let labels: Vec<&str> = host.split(['.', '-']).collect();

        let mut ids: Vec<&String> = self.sources.keys().collect();
        ids.sort();
        let source = ids
            .into_iter()
            .find(|id| {
                let parts: Vec<&str> = id.split(['.', '-']).collect();
                labels.windows(parts.len()).any(|w| w == parts.as_slice())
            })
            .cloned();
        trace!("资源站识别：主机={}，结果={:?}", host, source);
        source
    }
}
