//! 内置规则表
//! - 默认规则：写入新配置，用户可编辑
//! - 兜底规则：固定不可编辑，仅在非严格模式下生效

use once_cell::sync::Lazy;

use super::model::{MatchType, Rule};

/// 新配置使用的默认规则集
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule::new("通用广告路径")
            .url_patterns(["/ad/", "/ads/", "/adv/", "/advert", "/commercial/"])
            .priority(10),
        Rule::new("广告联盟域名")
            .url_patterns([
                "doubleclick.net",
                "googlesyndication.com",
                "googleadservices.com",
                "imasdk.googleapis.com",
                "adservice.",
                "adsystem.",
            ])
            .priority(9),
        Rule::new("广告标题")
            .title_patterns(["广告", "advertisement", "sponsored"])
            .priority(8),
        Rule::new("短时广告切片")
            .url_patterns([r"(^|[/_\-.])ads?[_\-.]"])
            .duration_range(0.0, 30.0)
            .match_type(MatchType::Regex)
            .priority(5),
    ]
}

/// 非严格模式下的通用兜底规则
pub static FALLBACK_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new("兜底-广告关键词")
            .url_patterns(["advertis", "commercial", "sponsor", "preroll", "midroll", "postroll"]),
        Rule::new("兜底-广告标题")
            .title_patterns(["广告", "推广", "赞助", "promo", "commercial"]),
        Rule::new("兜底-广告片段")
            .url_patterns([r"[/_\-.](ad|ads|adv)\d*[/_\-.]"])
            .duration_range(0.0, 60.0)
            .match_type(MatchType::Regex),
    ]
});
