//! 检测调参常量
//! 所有阈值与时长分桶都是可调整的启发式参数，不是固定契约

use crate::rule::AdType;

/// 时长分桶：`min <= 时长 < max`
#[derive(Debug, Clone, PartialEq)]
pub struct DurationBucket {
    pub min: f64,
    pub max: f64,
    pub is_ad: bool,
    pub confidence: f64,
    pub ad_type: Option<AdType>,
    pub reason: &'static str,
}

impl DurationBucket {
    pub const fn new(
        min: f64,
        max: f64,
        is_ad: bool,
        confidence: f64,
        ad_type: Option<AdType>,
        reason: &'static str,
    ) -> Self {
        Self { min, max, is_ad, confidence, ad_type, reason }
    }

    pub fn contains(&self, duration: f64) -> bool {
        duration >= self.min && duration < self.max
    }
}

/// 默认时长分桶（正片下限 min_content_duration 与广告上限 max_ad_duration 由配置另行控制）
pub const DEFAULT_DURATION_BUCKETS: &[DurationBucket] = &[
    DurationBucket::new(0.0, 3.0, true, 0.30, Some(AdType::Short), "极短切片"),
    DurationBucket::new(3.0, 15.0, false, 0.10, None, "常规切片时长"),
    DurationBucket::new(15.0, 30.0, true, 0.35, Some(AdType::MidRoll), "常见广告时长"),
    DurationBucket::new(30.0, f64::INFINITY, false, 0.20, None, "较长切片"),
];

/// 分类器调参
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierTuning {
    /// 高置信度阈值：分类器结果直接采用
    pub high_threshold: f64,
    /// 中等置信度阈值：非严格模式下的兜底判定
    pub medium_threshold: f64,
    /// 缓存命中时返回的固定置信度
    pub cache_hit_confidence: f64,

    pub duration_buckets: Vec<DurationBucket>,
    pub long_content_confidence: f64,
    pub over_max_ad_confidence: f64,
    pub missing_duration_confidence: f64,
    /// 中插分桶命中但未启用中插过滤时的正片置信度
    pub mid_roll_disabled_confidence: f64,

    /// 高可信关键词命中置信度（URL/标题）
    pub very_high_confidence: f64,
    /// 普通关键词累加：min(base + step * 命中数, cap)
    pub keyword_base: f64,
    pub keyword_step: f64,
    pub keyword_cap: f64,
    /// URL正则特征命中后的最低置信度
    pub url_regex_confidence: f64,

    /// 片头/片尾窗口大小（切片个数）
    pub sequence_window: usize,
    /// 序列分析只关注短于该值的切片
    pub sequence_max_duration: f64,
    pub sequence_confidence: f64,
    pub sequence_neutral_confidence: f64,
}

impl Default for ClassifierTuning {
    fn default() -> Self {
        Self {
            high_threshold: 0.7,
            medium_threshold: 0.4,
            cache_hit_confidence: 0.9,
            duration_buckets: DEFAULT_DURATION_BUCKETS.to_vec(),
            long_content_confidence: 0.95,
            over_max_ad_confidence: 0.2,
            missing_duration_confidence: 0.05,
            mid_roll_disabled_confidence: 0.05,
            very_high_confidence: 0.9,
            keyword_base: 0.3,
            keyword_step: 0.15,
            keyword_cap: 0.65,
            url_regex_confidence: 0.75,
            sequence_window: 3,
            sequence_max_duration: 15.0,
            sequence_confidence: 0.3,
            sequence_neutral_confidence: 0.05,
        }
    }
}

impl ClassifierTuning {
    /// 普通关键词命中数对应的置信度
    pub fn keyword_confidence(&self, hits: usize) -> f64 {
        if hits == 0 {
            return 0.0;
        }
        (self.keyword_base + self.keyword_step * hits as f64).min(self.keyword_cap)
    }

    pub fn bucket_for(&self, duration: f64) -> Option<&DurationBucket> {
        self.duration_buckets.iter().find(|b| b.contains(duration))
    }
}
