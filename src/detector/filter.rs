//! 综合广告过滤器
//! 整合分类器、用户规则与模式开关，输出最终广告判定
use tracing::debug;

use super::cache::CacheStats;
use super::classifier::SegmentClassifier;
use super::tuning::ClassifierTuning;
use crate::compiler::RuleCompiler;
use crate::config::FilterConfiguration;
use crate::playlist::{AdDurationTable, PlaylistRewriteResult, PlaylistRewriter};
use crate::rule::{DetectionResult, FragmentDescriptor};

/// 综合广告过滤器
///
/// 持有一份默认配置，`*_with` 系列接口可临时传入其它配置。
/// 最终判定按配置写回分类缓存，保证同一配置下重复过滤结果一致，
/// 不同配置（含 `*_with` 传入的临时配置）之间互不影响。
#[derive(Debug, Default)]
pub struct AdFilter {
    config: FilterConfiguration,
    classifier: SegmentClassifier,
    compiler: RuleCompiler,
    rewriter: PlaylistRewriter,
}

impl AdFilter {
    pub fn new(config: FilterConfiguration) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn with_tuning(config: FilterConfiguration, tuning: ClassifierTuning) -> Self {
        Self {
            config,
            classifier: SegmentClassifier::with_tuning(tuning),
            ..Default::default()
        }
    }

    /// 替换广告时长表
    pub fn with_durations(mut self, durations: AdDurationTable) -> Self {
        self.rewriter = PlaylistRewriter::with_durations(durations);
        self
    }

    pub fn config(&self) -> &FilterConfiguration {
        &self.config
    }

    /// 替换配置并清空分类缓存（旧判定可能不再适用）
    pub fn set_config(&mut self, config: FilterConfiguration) {
        self.config = config;
        self.classifier.clear_cache();
    }

    /// 修改配置（如切换规则开关），完成后清空分类缓存
    pub fn update_config<F>(&mut self, update: F)
    where
        F: FnOnce(&mut FilterConfiguration),
    {
        update(&mut self.config);
        self.classifier.clear_cache();
    }

    /// 分类器原始结果
    pub fn classify(&mut self, fragment: &FragmentDescriptor) -> DetectionResult {
        self.classifier.classify(fragment, &self.config)
    }

    pub fn classify_with(&mut self, fragment: &FragmentDescriptor, config: &FilterConfiguration) -> DetectionResult {
        self.classifier.classify(fragment, config)
    }

    /// 最终广告判定
    pub fn is_ad(&mut self, fragment: &FragmentDescriptor) -> bool {
        Self::decide(&mut self.classifier, &mut self.compiler, fragment, &self.config)
    }

    pub fn is_ad_with(&mut self, fragment: &FragmentDescriptor, config: &FilterConfiguration) -> bool {
        Self::decide(&mut self.classifier, &mut self.compiler, fragment, config)
    }

    /// 过滤广告切片，保持原有顺序
    pub fn filter_fragments(&mut self, fragments: &[FragmentDescriptor]) -> Vec<FragmentDescriptor> {
        self.partition_fragments(fragments).0
    }

    pub fn filter_fragments_with(
        &mut self,
        fragments: &[FragmentDescriptor],
        config: &FilterConfiguration,
    ) -> Vec<FragmentDescriptor> {
        self.partition_fragments_with(fragments, config).0
    }

    /// 拆分为（保留，移除）两组，各自保持原有顺序
    pub fn partition_fragments(
        &mut self,
        fragments: &[FragmentDescriptor],
    ) -> (Vec<FragmentDescriptor>, Vec<FragmentDescriptor>) {
        let config = std::mem::take(&mut self.config);
        let parts = self.partition_fragments_with(fragments, &config);
        self.config = config;
        parts
    }

    pub fn partition_fragments_with(
        &mut self,
        fragments: &[FragmentDescriptor],
        config: &FilterConfiguration,
    ) -> (Vec<FragmentDescriptor>, Vec<FragmentDescriptor>) {
        let mut kept = Vec::with_capacity(fragments.len());
        let mut removed = Vec::new();
        for fragment in fragments {
            if Self::decide(&mut self.classifier, &mut self.compiler, fragment, config) {
                removed.push(fragment.clone());
            } else {
                kept.push(fragment.clone());
            }
        }
        debug!("切片过滤完成：总数={}，移除={}", fragments.len(), removed.len());
        (kept, removed)
    }

    /// 重写播放列表文本
    pub fn rewrite_playlist(&mut self, manifest: &str, source_id: Option<&str>) -> PlaylistRewriteResult {
        self.rewriter.rewrite(manifest, source_id, &self.config)
    }

    pub fn rewrite_playlist_with(
        &mut self,
        manifest: &str,
        source_id: Option<&str>,
        config: &FilterConfiguration,
    ) -> PlaylistRewriteResult {
        self.rewriter.rewrite(manifest, source_id, config)
    }

    /// 按播放列表地址推断资源站标识
    pub fn detect_source(&self, manifest_url: &str) -> Option<String> {
        self.rewriter.durations().detect_source(manifest_url)
    }

    pub fn clear_cache(&mut self) {
        self.classifier.clear_cache();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.classifier.cache_stats()
    }

    /// 判定流程（按顺序，先决定者生效）：
    /// 1. 过滤关闭 → 否
    /// 2. 分类器高置信度 → 采用分类器结果
    /// 3. 用户规则命中 → 是
    /// 4. 非严格模式：内置兜底规则命中 → 是
    /// 5. 非严格模式：分类器判为广告且达到中等置信度 → 是
    /// 6. 否
    fn decide(
        classifier: &mut SegmentClassifier,
        compiler: &mut RuleCompiler,
        fragment: &FragmentDescriptor,
        config: &FilterConfiguration,
    ) -> bool {
        if !config.enabled {
            return false;
        }

        let fingerprint = config.fingerprint();
        let detection = classifier.classify_keyed(fragment, config, fingerprint);
        let tuning = classifier.tuning();

        let verdict = if detection.confidence >= tuning.high_threshold {
            detection.is_ad
        } else if compiler.match_configured(fragment, config).is_some() {
            true
        } else {
            !config.strict_mode && detection.is_ad && detection.confidence >= tuning.medium_threshold
        };

        classifier.remember_keyed(fragment, fingerprint, verdict);
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use crate::rule::Rule;

    fn fragment(url: &str, duration: f64) -> FragmentDescriptor {
        FragmentDescriptor::new(url).with_duration(duration)
    }

    #[test]
    fn test_scenarios() {
        let mut filter = AdFilter::default();
        assert!(filter.is_ad(&fragment("https://x/video/ad_segment_001.ts", 8.0)));
        assert!(!filter.is_ad(&fragment("https://x/video/episode_001.ts", 1800.0)));
    }

    #[test]
    fn test_disabled_never_ad() {
        let config = ConfigManager::custom().enabled(false).build();
        let mut filter = AdFilter::new(config);

        for f in [
            fragment("https://doubleclick.net/ad/1.ts", 5.0),
            fragment("https://x/ad_segment.ts", 1.0).with_title("插播广告"),
        ] {
            assert!(!filter.is_ad(&f));
        }
        assert_eq!(filter.cache_stats().total_detections, 0);
    }

    #[test]
    fn test_medium_confidence_only_in_non_strict() {
        // 无用户规则：标题普通关键词 0.45 只在非严格模式下生效
        let f = fragment("https://x/v/seg1.ts", 8.0).with_title("品牌推广");

        let mut loose = AdFilter::new(ConfigManager::custom().rules(Vec::new()).build());
        let mut strict = AdFilter::new(ConfigManager::custom().rules(Vec::new()).strict_mode(true).build());

        assert!(loose.is_ad(&f));
        assert!(!strict.is_ad(&f));
    }

    #[test]
    fn test_registry_applies_in_strict_mode() {
        let rule = Rule::new("自定义插播").url_patterns(["/break/"]);
        let f = fragment("https://x/break/seg1.ts", 8.0);

        let mut loose = AdFilter::new(ConfigManager::custom().rules(vec![rule.clone()]).build());
        let mut strict = AdFilter::new(ConfigManager::custom().rules(vec![rule]).strict_mode(true).build());

        assert!(loose.is_ad(&f));
        assert!(strict.is_ad(&f));
    }

    #[test]
    fn test_high_confidence_short_circuits_rules() {
        // 长时长正片高置信度，即使命中用户规则也采用分类器结果
        let rule = Rule::new("宽泛").url_patterns(["episode"]);
        let mut filter = AdFilter::new(ConfigManager::custom().rules(vec![rule]).build());
        assert!(!filter.is_ad(&fragment("https://x/episode_01.ts", 1800.0)));
    }

    #[test]
    fn test_filter_fragments_keeps_order_and_is_idempotent() {
        let fragments = vec![
            fragment("https://x/v/seg0.ts", 10.0).with_index(0),
            fragment("https://x/ads/spot.ts", 15.0).with_index(1),
            fragment("https://x/v/seg1.ts", 10.0).with_index(2),
            fragment("https://x/v/seg2.ts", 2.0).with_index(3),
            fragment("https://x/v/seg3.ts", 10.0).with_index(4).with_title("赞助"),
            fragment("https://x/v/seg4.ts", 10.0).with_index(5),
        ];
        let mut filter = AdFilter::default();

        let once = filter.filter_fragments(&fragments);
        let urls: Vec<&str> = once.iter().map(|f| f.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://x/v/seg0.ts", "https://x/v/seg1.ts", "https://x/v/seg2.ts", "https://x/v/seg4.ts"]
        );

        let twice = filter.filter_fragments(&once);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_per_call_configs_do_not_share_verdicts() {
        let f = fragment("https://x/sponsor/1.ts", 8.0);
        let loose = ConfigManager::custom().rules(Vec::new()).build();
        let strict = ConfigManager::custom().rules(Vec::new()).strict_mode(true).build();

        let mut filter = AdFilter::default();
        assert!(!filter.is_ad_with(&f, &strict));
        assert!(filter.is_ad_with(&f, &loose));

        let mut filter = AdFilter::default();
        assert!(filter.is_ad_with(&f, &loose));
        assert!(!filter.is_ad_with(&f, &strict));

        // 各自配置下重复判定仍保持一致
        assert!(filter.is_ad_with(&f, &loose));
        assert!(!filter.is_ad_with(&f, &strict));
    }

    #[test]
    fn test_partition() {
        let fragments = vec![
            fragment("https://x/v/seg0.ts", 10.0),
            fragment("https://x/ad/seg1.ts", 10.0),
        ];
        let mut filter = AdFilter::default();
        let (kept, removed) = filter.partition_fragments(&fragments);
        assert_eq!(kept, vec![fragments[0].clone()]);
        assert_eq!(removed, vec![fragments[1].clone()]);
    }

    #[test]
    fn test_set_config_clears_cache() {
        let mut filter = AdFilter::default();
        filter.is_ad(&fragment("https://x/ad/seg1.ts", 10.0));
        assert_eq!(filter.cache_stats().size, 1);

        filter.update_config(|c| {
            c.rules.set_enabled("通用广告路径", false);
        });
        assert_eq!(filter.cache_stats().size, 0);
        assert!(!filter.config().rules.get("通用广告路径").unwrap().enabled);
    }

    #[test]
    fn test_rewrite_playlist_uses_owned_config() {
        let mut filter = AdFilter::default();
        let result = filter.rewrite_playlist("#EXTINF:5.640000,\nsegment01.ts\n#EXTINF:10,\nseg02.ts", Some("ruyi"));
        assert_eq!(result.content, "#EXTINF:10,\nseg02.ts");
        assert_eq!(result.removed_segments, 1);
        assert_eq!(filter.detect_source("https://v.ruyi.example/index.m3u8").as_deref(), Some("ruyi"));
    }
}
