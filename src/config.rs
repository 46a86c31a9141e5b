//! 过滤配置管理，存储所有用户可调整的过滤选项

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::AdResult;
use crate::rule::{PatternRegistry, Rule};

/// 过滤配置（由调用方持有，按引用传入每次检测）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterConfiguration {
    // 总开关，关闭后任何切片都不视为广告
    pub enabled: bool,
    // 严格模式：只使用用户配置的规则，关闭内置兜底与中等置信度启发式
    pub strict_mode: bool,
    pub rules: PatternRegistry,
    pub skip_pre_roll: bool,
    pub skip_mid_roll: bool,
    pub skip_post_roll: bool,
    // 单个广告切片的最大时长（秒），超过后时长分析不再判为广告
    pub max_ad_duration: f64,
    // 正片切片的最小时长（秒），达到后时长分析强判为正片
    pub min_content_duration: f64,
}

impl Default for FilterConfiguration {
    fn default() -> Self {
        Self {
            enabled: true,
            strict_mode: false,
            rules: PatternRegistry::with_defaults(),
            skip_pre_roll: true,
            skip_mid_roll: true,
            skip_post_roll: true,
            max_ad_duration: 30.0,
            min_content_duration: 60.0,
        }
    }
}

impl FilterConfiguration {
    /// 从JSON文本解析配置，缺省字段使用默认值
    pub fn from_json(json: &str) -> AdResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> AdResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 配置指纹：任一开关、阈值或规则变化都会得到不同的值，用作分类缓存的分区键
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        serde_json::to_vec(self).unwrap_or_default().hash(&mut hasher);
        hasher.finish()
    }
}

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> FilterConfiguration {
        FilterConfiguration::default()
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: FilterConfiguration,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: FilterConfiguration::default(),
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    pub fn strict_mode(mut self, strict_mode: bool) -> Self {
        self.config.strict_mode = strict_mode;
        self
    }

    /// 替换全部规则
    pub fn rules(mut self, rules: Vec<Rule>) -> Self {
        self.config.rules = PatternRegistry::from_rules(rules);
        self
    }

    /// 追加一条规则
    pub fn rule(mut self, rule: Rule) -> Self {
        self.config.rules.add(rule);
        self
    }

    pub fn skip_pre_roll(mut self, skip: bool) -> Self {
        self.config.skip_pre_roll = skip;
        self
    }

    pub fn skip_mid_roll(mut self, skip: bool) -> Self {
        self.config.skip_mid_roll = skip;
        self
    }

    pub fn skip_post_roll(mut self, skip: bool) -> Self {
        self.config.skip_post_roll = skip;
        self
    }

    pub fn max_ad_duration(mut self, seconds: f64) -> Self {
        self.config.max_ad_duration = seconds;
        self
    }

    pub fn min_content_duration(mut self, seconds: f64) -> Self {
        self.config.min_content_duration = seconds;
        self
    }

    pub fn build(self) -> FilterConfiguration {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = FilterConfiguration::from_json(r#"{"strictMode": true}"#).unwrap();
        assert!(config.enabled);
        assert!(config.strict_mode);
        assert_eq!(config.rules, PatternRegistry::with_defaults());
        assert_eq!(config.max_ad_duration, 30.0);
    }

    #[test]
    fn test_builder() {
        let config = ConfigManager::custom()
            .strict_mode(true)
            .rules(Vec::new())
            .rule(Rule::new("仅此一条"))
            .max_ad_duration(45.0)
            .build();

        assert!(config.strict_mode);
        assert_eq!(config.rules.len(), 1);
        assert_eq!(config.max_ad_duration, 45.0);
    }

    #[test]
    fn test_json_round_trip_keeps_rule_order() {
        let config = ConfigManager::get_default();
        let back = FilterConfiguration::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_fingerprint_tracks_changes() {
        let base = ConfigManager::get_default();
        assert_eq!(base.fingerprint(), ConfigManager::get_default().fingerprint());

        let strict = ConfigManager::custom().strict_mode(true).build();
        assert_ne!(base.fingerprint(), strict.fingerprint());

        let mut toggled = ConfigManager::get_default();
        toggled.rules.set_enabled("通用广告路径", false);
        assert_ne!(base.fingerprint(), toggled.fingerprint());
    }
}
