//! 检测分析器：时长/URL/标题/序列四路独立信号
//! 每个分析器只返回自己的判定，合并由分类器负责
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use super::tuning::ClassifierTuning;
use crate::config::FilterConfiguration;
use crate::rule::{AdType, DetectionResult, FragmentDescriptor};
use crate::utils::KeywordMatcher;

/// URL高可信关键词（广告联盟域名、投放协议）
const VERY_HIGH_URL_KEYWORDS: &[&str] = &[
    "doubleclick.net",
    "googlesyndication",
    "googleadservices",
    "imasdk.googleapis",
    "adservice.",
    "adsystem.",
    "adserver",
    "adsrvr.org",
    "advertisement",
    "/vast/",
    "vast.xml",
    "/vmap/",
];

/// URL普通广告词（按词元匹配）
const GENERIC_URL_KEYWORDS: &[&str] = &[
    "ad",
    "ads",
    "adv",
    "advert",
    "adverts",
    "commercial",
    "sponsor",
    "sponsored",
    "promo",
    "promotion",
    "preroll",
    "midroll",
    "postroll",
    "guanggao",
];

/// URL结构特征
static URL_AD_REGEXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"/ads?/",
        r"/commercials?/",
        r"_ad_",
        r"-ad-",
        r"\.ad\.",
        r"ad_slot",
        r"ad_unit",
        r"[?&](ad_?id|ad_?type|adunit)=",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// 标题高可信关键词
const VERY_HIGH_TITLE_KEYWORDS: &[&str] = &[
    "贴片广告",
    "插播广告",
    "广告时间",
    "广告位",
    "advertisement",
    "commercial break",
];

/// 标题普通关键词（中英双语）
const GENERIC_TITLE_KEYWORDS: &[&str] = &[
    "广告",
    "推广",
    "赞助",
    "商业",
    "ad",
    "ads",
    "promo",
    "sponsor",
    "sponsored",
    "commercial",
];

/// 时长分析器
pub struct DurationAnalyzer;

impl DurationAnalyzer {
    pub fn analyze(
        fragment: &FragmentDescriptor,
        config: &FilterConfiguration,
        tuning: &ClassifierTuning,
    ) -> DetectionResult {
        let Some(duration) = fragment.known_duration() else {
            return DetectionResult::content(tuning.missing_duration_confidence, "无时长信息");
        };

        if duration >= config.min_content_duration {
            return DetectionResult::content(
                tuning.long_content_confidence,
                format!("时长{:.2}秒达到正片下限", duration),
            );
        }

        let Some(bucket) = tuning.bucket_for(duration) else {
            return DetectionResult::content(tuning.missing_duration_confidence, "时长不在任何分桶内");
        };

        if !bucket.is_ad {
            return DetectionResult::content(bucket.confidence, bucket.reason);
        }

        if duration > config.max_ad_duration {
            return DetectionResult::content(
                tuning.over_max_ad_confidence,
                format!("时长{:.2}秒超过广告最大时长", duration),
            );
        }

        let ad_type = bucket.ad_type.unwrap_or(AdType::Unknown);
        if ad_type == AdType::MidRoll && !config.skip_mid_roll {
            return DetectionResult::content(tuning.mid_roll_disabled_confidence, "未启用中插广告过滤");
        }

        DetectionResult::ad(bucket.confidence, bucket.reason, ad_type)
    }
}

/// URL分析器
pub struct UrlAnalyzer;

impl UrlAnalyzer {
    pub fn analyze(url: &str, tuning: &ClassifierTuning) -> DetectionResult {
        let url_lower = url.to_lowercase();

        // 1. 高可信关键词，命中即返回
        if let Some(keyword) = KeywordMatcher::first_hit(&url_lower, VERY_HIGH_URL_KEYWORDS) {
            trace!("URL命中高可信关键词：{}，URL={}", keyword, url);
            return DetectionResult::ad(
                tuning.very_high_confidence,
                format!("URL命中高可信广告关键词：{}", keyword),
                AdType::Embedded,
            );
        }

        // 2. 普通关键词累加
        let hits = KeywordMatcher::all_hits(&url_lower, GENERIC_URL_KEYWORDS);
        let mut confidence = tuning.keyword_confidence(hits.len());
        let mut reason = if hits.is_empty() {
            None
        } else {
            Some(format!("URL命中广告关键词：{}", hits.join(",")))
        };

        // 3. 结构特征只升不降
        if let Some(regex) = URL_AD_REGEXES.iter().find(|r| r.is_match(&url_lower)) {
            if tuning.url_regex_confidence > confidence {
                confidence = tuning.url_regex_confidence;
                reason = Some(format!("URL命中广告结构特征：{}", regex.as_str()));
            }
        }

        match reason {
            Some(reason) => DetectionResult::ad(confidence, reason, AdType::Unknown),
            None => DetectionResult::content(0.0, "URL无广告特征"),
        }
    }
}

/// 标题分析器
pub struct TitleAnalyzer;

impl TitleAnalyzer {
    pub fn analyze(title: Option<&str>, tuning: &ClassifierTuning) -> DetectionResult {
        let Some(title) = title.filter(|t| !t.trim().is_empty()) else {
            return DetectionResult::content(0.0, "无标题信息");
        };
        let title_lower = title.to_lowercase();

        if let Some(keyword) = KeywordMatcher::first_hit(&title_lower, VERY_HIGH_TITLE_KEYWORDS) {
            return DetectionResult::ad(
                tuning.very_high_confidence,
                format!("标题命中高可信广告关键词：{}", keyword),
                AdType::Unknown,
            );
        }

        let hits = KeywordMatcher::all_hits(&title_lower, GENERIC_TITLE_KEYWORDS);
        if hits.is_empty() {
            return DetectionResult::content(0.0, "标题无广告特征");
        }

        DetectionResult::ad(
            tuning.keyword_confidence(hits.len()),
            format!("标题命中广告关键词：{}", hits.join(",")),
            AdType::Unknown,
        )
    }
}

/// 序列分析器（最弱信号，默认倾向正片）
pub struct SequenceAnalyzer;

impl SequenceAnalyzer {
    pub fn analyze(
        fragment: &FragmentDescriptor,
        config: &FilterConfiguration,
        tuning: &ClassifierTuning,
    ) -> DetectionResult {
        let neutral = || DetectionResult::content(tuning.sequence_neutral_confidence, "序列位置无异常");

        let (Some(index), Some(duration)) = (fragment.index, fragment.known_duration()) else {
            return neutral();
        };
        if duration >= tuning.sequence_max_duration {
            return neutral();
        }

        // 片头短切片
        if config.skip_pre_roll && index < tuning.sequence_window {
            return DetectionResult::ad(
                tuning.sequence_confidence,
                format!("第{}个切片位于片头且时长较短", index + 1),
                AdType::PreRoll,
            );
        }

        // 片尾短切片
        if let Some(total) = fragment.total {
            if config.skip_post_roll && index < total && total - index <= tuning.sequence_window.saturating_sub(1) {
                return DetectionResult::ad(
                    tuning.sequence_confidence,
                    format!("第{}/{}个切片位于片尾且时长较短", index + 1, total),
                    AdType::PostRoll,
                );
            }
        }

        neutral()
    }
}
