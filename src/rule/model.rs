//! 规则与检测数据模型定义
//! 仅存储数据，无任何业务逻辑，支持序列化/反序列化

use std::fmt;
use serde::{Deserialize, Serialize};

/// 规则模式的匹配方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// 包含匹配（忽略大小写）
    #[default]
    Contains,
    /// 正则匹配
    Regex,
}

/// 时长区间（闭区间，单位：秒）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurationRange {
    pub min: f64,
    pub max: f64,
}

impl DurationRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, duration: f64) -> bool {
        duration >= self.min && duration <= self.max
    }
}

/// 广告识别规则
///
/// `name` 在同一规则集中唯一；`priority` 仅作展示用途，不参与匹配顺序。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub url_patterns: Vec<String>,
    #[serde(default)]
    pub title_patterns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_range: Option<DurationRange>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub match_type: MatchType,
}

fn default_true() -> bool {
    true
}

impl Rule {
    /// 创建一条空规则（默认启用、包含匹配）
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            url_patterns: Vec::new(),
            title_patterns: Vec::new(),
            duration_range: None,
            priority: 0,
            match_type: MatchType::Contains,
        }
    }

    pub fn url_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.url_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn title_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.title_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn duration_range(mut self, min: f64, max: f64) -> Self {
        self.duration_range = Some(DurationRange::new(min, max));
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn match_type(mut self, match_type: MatchType) -> Self {
        self.match_type = match_type;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// 单个播放切片的描述信息（瞬态，不做持久化）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FragmentDescriptor {
    pub url: String,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub index: Option<usize>,
    /// 所在序列的切片总数，仅用于片尾判断
    #[serde(default)]
    pub total: Option<usize>,
}

impl FragmentDescriptor {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }

    /// 有效时长：缺失、非有限值或非正数都视为未知
    pub fn known_duration(&self) -> Option<f64> {
        self.duration.filter(|d| d.is_finite() && *d > 0.0)
    }
}

/// 广告类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdType {
    Short,
    MidRoll,
    Embedded,
    PreRoll,
    PostRoll,
    Unknown,
}

impl fmt::Display for AdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AdType::Short => "short",
            AdType::MidRoll => "mid-roll",
            AdType::Embedded => "embedded",
            AdType::PreRoll => "pre-roll",
            AdType::PostRoll => "post-roll",
            AdType::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// 单次检测结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub is_ad: bool,
    pub confidence: f64,
    /// 诊断信息，不参与控制流
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_type: Option<AdType>,
}

impl DetectionResult {
    /// 广告判定
    pub fn ad(confidence: f64, reason: impl Into<String>, ad_type: AdType) -> Self {
        Self {
            is_ad: true,
            confidence: confidence.clamp(0.0, 1.0),
            reason: reason.into(),
            ad_type: Some(ad_type),
        }
    }

    /// 正片判定
    pub fn content(confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            is_ad: false,
            confidence: confidence.clamp(0.0, 1.0),
            reason: reason.into(),
            ad_type: None,
        }
    }
}

impl fmt::Display for DetectionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.is_ad { "广告" } else { "正片" };
        match self.ad_type {
            Some(ad_type) => write!(f, "{}({}) 置信度={:.2} 原因={}", verdict, ad_type, self.confidence, self.reason),
            None => write!(f, "{} 置信度={:.2} 原因={}", verdict, self.confidence, self.reason),
        }
    }
}
