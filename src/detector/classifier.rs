//! 切片分类器：整合四路分析信号，输出单个切片的广告判定
use tracing::debug;

use super::analyzer::{DurationAnalyzer, SequenceAnalyzer, TitleAnalyzer, UrlAnalyzer};
use super::cache::{CacheStats, ClassifierCache};
use super::tuning::ClassifierTuning;
use crate::config::FilterConfiguration;
use crate::rule::{AdType, DetectionResult, FragmentDescriptor};
use crate::utils::DetectionMerger;

/// 切片分类器
///
/// 除缓存写入外不产生副作用；同一实例只允许单线程写入。
#[derive(Debug, Default)]
pub struct SegmentClassifier {
    tuning: ClassifierTuning,
    cache: ClassifierCache,
}

impl SegmentClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tuning(tuning: ClassifierTuning) -> Self {
        Self {
            tuning,
            cache: ClassifierCache::new(),
        }
    }

    pub fn tuning(&self) -> &ClassifierTuning {
        &self.tuning
    }

    /// 分类单个切片
    ///
    /// 缓存命中时直接返回缓存判定（固定置信度），不再评估标题与序列信号。
    /// 缓存按配置分区，不同配置下的判定互不影响。
    pub fn classify(&mut self, fragment: &FragmentDescriptor, config: &FilterConfiguration) -> DetectionResult {
        self.classify_keyed(fragment, config, config.fingerprint())
    }

    /// 使用已计算好的配置指纹分类
    pub(crate) fn classify_keyed(
        &mut self,
        fragment: &FragmentDescriptor,
        config: &FilterConfiguration,
        fingerprint: u64,
    ) -> DetectionResult {
        let duration = fragment.known_duration();

        // 1. 缓存命中
        if let Some(is_ad) = self.cache.get(fingerprint, &fragment.url, duration) {
            self.cache.record(is_ad);
            let reason = "缓存命中";
            return if is_ad {
                DetectionResult::ad(self.tuning.cache_hit_confidence, reason, AdType::Unknown)
            } else {
                DetectionResult::content(self.tuning.cache_hit_confidence, reason)
            };
        }

        // 2. 四路分析（顺序决定同分时的原因归属）
        let results = vec![
            DurationAnalyzer::analyze(fragment, config, &self.tuning),
            UrlAnalyzer::analyze(&fragment.url, &self.tuning),
            TitleAnalyzer::analyze(fragment.title.as_deref(), &self.tuning),
            SequenceAnalyzer::analyze(fragment, config, &self.tuning),
        ];
        let result = DetectionMerger::merge(results);

        debug!(
            "切片分类完成：URL={}，时长={:?}，结果={}",
            fragment.url, duration, result
        );

        // 3. 写入缓存
        self.cache.insert(fingerprint, &fragment.url, duration, result.is_ad);
        self.cache.record(result.is_ad);

        result
    }

    /// 以外部给出的最终判定覆盖该配置下的缓存
    pub fn remember(&mut self, fragment: &FragmentDescriptor, config: &FilterConfiguration, is_ad: bool) {
        self.remember_keyed(fragment, config.fingerprint(), is_ad);
    }

    pub(crate) fn remember_keyed(&mut self, fragment: &FragmentDescriptor, fingerprint: u64, is_ad: bool) {
        self.cache.insert(fingerprint, &fragment.url, fragment.known_duration(), is_ad);
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
        debug!("分类缓存已清空");
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ad_segment_url_flagged() {
        let mut classifier = SegmentClassifier::new();
        let config = FilterConfiguration::default();
        let result = classifier.classify(
            &FragmentDescriptor::new("https://x/video/ad_segment_001.ts").with_duration(8.0),
            &config,
        );

        assert!(result.is_ad);
        assert!((result.confidence - 0.45).abs() < 1e-9);
        assert!(result.reason.contains("URL"));
    }

    #[test]
    fn test_long_episode_not_ad() {
        let mut classifier = SegmentClassifier::new();
        let config = FilterConfiguration::default();
        let result = classifier.classify(
            &FragmentDescriptor::new("https://x/video/episode_001.ts").with_duration(1800.0),
            &config,
        );

        assert!(!result.is_ad);
        assert_eq!(result.confidence, 0.95);
    }

    #[test]
    fn test_cache_hit_skips_title_signal() {
        let mut classifier = SegmentClassifier::new();
        let config = FilterConfiguration::default();
        let plain = FragmentDescriptor::new("https://x/v/seg_010.ts").with_duration(6.0);

        let first = classifier.classify(&plain, &config);
        assert!(!first.is_ad);

        // 同一 URL+时长，标题改为强广告特征，仍返回缓存判定
        let titled = plain.clone().with_title("插播广告");
        let second = classifier.classify(&titled, &config);
        assert_eq!(second.is_ad, first.is_ad);
        assert_eq!(second.confidence, 0.9);
        assert_eq!(second.reason, "缓存命中");
    }

    #[test]
    fn test_missing_duration_still_checks_url() {
        let mut classifier = SegmentClassifier::new();
        let config = FilterConfiguration::default();
        let result = classifier.classify(&FragmentDescriptor::new("https://ads.doubleclick.net/seg.ts"), &config);

        assert!(result.is_ad);
        assert_eq!(result.confidence, 0.9);
    }

    #[test]
    fn test_confidence_within_unit_range() {
        let mut classifier = SegmentClassifier::new();
        let config = FilterConfiguration::default();
        let fragment = FragmentDescriptor::new("https://doubleclick.net/ad/_ad_/ad_slot/promo.ts")
            .with_duration(1.0)
            .with_title("广告时间 advertisement 推广")
            .with_index(0);
        let result = classifier.classify(&fragment, &config);

        assert!(result.is_ad);
        assert!((0.0..=1.0).contains(&result.confidence));
    }

    #[test]
    fn test_stats_and_clear() {
        let mut classifier = SegmentClassifier::new();
        let config = FilterConfiguration::default();
        let ad = FragmentDescriptor::new("https://x/ad/1.ts").with_duration(5.0);
        let content = FragmentDescriptor::new("https://x/v/1.ts").with_duration(6.0);

        classifier.classify(&ad, &config);
        classifier.classify(&ad, &config);
        classifier.classify(&content, &config);

        let stats = classifier.cache_stats();
        assert_eq!(stats.size, 2);
        assert_eq!(stats.total_detections, 3);
        assert_eq!(stats.ad_detections, 2);

        classifier.clear_cache();
        assert_eq!(classifier.cache_stats(), CacheStats::default());
    }

    #[test]
    fn test_remember_overrides_cached_verdict() {
        let mut classifier = SegmentClassifier::new();
        let config = FilterConfiguration::default();
        let fragment = FragmentDescriptor::new("https://x/v/seg.ts").with_duration(6.0);

        classifier.remember(&fragment, &config, true);
        let result = classifier.classify(&fragment, &config);
        assert!(result.is_ad);
        assert_eq!(result.confidence, 0.9);
    }

    #[test]
    fn test_cache_partitioned_by_config() {
        let mut classifier = SegmentClassifier::new();
        let loose = FilterConfiguration::default();
        let strict = crate::config::ConfigManager::custom().strict_mode(true).build();
        let fragment = FragmentDescriptor::new("https://x/v/seg.ts").with_duration(6.0);

        classifier.remember(&fragment, &loose, true);
        let result = classifier.classify(&fragment, &strict);
        assert!(!result.is_ad);
        assert_ne!(result.reason, "缓存命中");
        assert_eq!(classifier.cache_stats().size, 2);
    }
}
