//! 规则编译器核心
//! 负责将规则中的字符串模式编译为匹配器，并判断规则是否命中切片
//! 编译结果按模式文本缓存，同一模式只编译一次

use std::collections::HashMap;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

use super::pattern::Matcher;
use crate::error::{AdFilterError, AdResult};
use crate::config::FilterConfiguration;
use crate::rule::{FragmentDescriptor, MatchType, Rule, FALLBACK_RULES};

/// 规则编译器
#[derive(Debug, Default)]
pub struct RuleCompiler {
    cache: HashMap<(MatchType, String), Matcher>,
}

impl RuleCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取（必要时编译）模式对应的匹配器
    pub fn matcher(&mut self, pattern: &str, match_type: MatchType) -> &Matcher {
        self.cache
            .entry((match_type, pattern.to_string()))
            .or_insert_with(|| Self::compile_single_pattern(pattern, match_type))
    }

    /// 已缓存的匹配器数量
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// 判断单条规则是否命中切片
    ///
    /// URL、标题、时长三类条件同时满足才算命中；未配置的条件视为满足。
    /// 没有任何条件的规则永不命中。
    pub fn rule_matches(&mut self, rule: &Rule, fragment: &FragmentDescriptor) -> bool {
        if rule.url_patterns.is_empty() && rule.title_patterns.is_empty() && rule.duration_range.is_none() {
            return false;
        }

        // 1. URL条件
        if !rule.url_patterns.is_empty() {
            let hit = rule.url_patterns.iter()
                .any(|p| self.matcher(p, rule.match_type).is_match(&fragment.url));
            if !hit {
                return false;
            }
        }

        // 2. 标题条件
        if !rule.title_patterns.is_empty() {
            let Some(title) = fragment.title.as_deref() else {
                return false;
            };
            let hit = rule.title_patterns.iter()
                .any(|p| self.matcher(p, rule.match_type).is_match(title));
            if !hit {
                return false;
            }
        }

        // 3. 时长条件
        if let Some(range) = &rule.duration_range {
            match fragment.known_duration() {
                Some(duration) if range.contains(duration) => {}
                _ => return false,
            }
        }

        true
    }

    /// 按列表顺序返回第一条命中的已启用规则
    pub fn first_match<'r, I>(&mut self, rules: I, fragment: &FragmentDescriptor) -> Option<&'r Rule>
    where
        I: IntoIterator<Item = &'r Rule>,
    {
        for rule in rules {
            if rule.enabled && self.rule_matches(rule, fragment) {
                debug!("规则命中：规则={}，URL={}", rule.name, fragment.url);
                return Some(rule);
            }
        }
        None
    }

    /// 按配置匹配规则：先用户规则，非严格模式下再用内置兜底规则
    pub fn match_configured<'c>(
        &mut self,
        fragment: &FragmentDescriptor,
        config: &'c FilterConfiguration,
    ) -> Option<&'c Rule> {
        if let Some(rule) = self.first_match(config.rules.list(), fragment) {
            return Some(rule);
        }
        if config.strict_mode {
            return None;
        }
        self.first_match(FALLBACK_RULES.iter(), fragment)
    }

    /// 校验规则中的全部正则模式，供配置编辑时提示用户
    pub fn validate(rule: &Rule) -> AdResult<()> {
        if rule.name.trim().is_empty() {
            return Err(AdFilterError::RuleInvalid("规则名称不能为空".to_string()));
        }
        if let Some(range) = &rule.duration_range {
            if !(range.min <= range.max) {
                return Err(AdFilterError::RuleInvalid(format!(
                    "规则 {} 时长区间无效：{} > {}",
                    rule.name, range.min, range.max
                )));
            }
        }
        if rule.match_type == MatchType::Regex {
            for pattern in rule.url_patterns.iter().chain(rule.title_patterns.iter()) {
                Self::build_regex(pattern)?;
            }
        }
        Ok(())
    }

    /// 编译单个模式，无效正则降级为永不匹配
    fn compile_single_pattern(raw_pattern: &str, match_type: MatchType) -> Matcher {
        match match_type {
            MatchType::Contains => Matcher::Contains(raw_pattern.to_lowercase()),
            MatchType::Regex => match Self::build_regex(raw_pattern) {
                Ok(regex) => Matcher::Regex(regex),
                Err(e) => {
                    warn!("规则正则编译失败，已忽略：{}，错误：{}", raw_pattern, e);
                    Matcher::Never(raw_pattern.to_string())
                }
            },
        }
    }

    /// 编译正则（兼容带标志位的 /pattern/i 写法，始终忽略大小写）
    fn build_regex(raw_pattern: &str) -> AdResult<Regex> {
        static DELIMITED_REGEX: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"^/(.+)/([gimsuy]+)$").unwrap()
        });

        let cleaned_pattern = match DELIMITED_REGEX.captures(raw_pattern) {
            Some(captures) => captures.get(1).map_or(raw_pattern, |m| m.as_str()),
            None => raw_pattern,
        };

        Ok(RegexBuilder::new(cleaned_pattern).case_insensitive(true).build()?)
    }
}
