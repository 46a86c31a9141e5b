//! 编译后模式模型
//! 规则中的字符串模式编译后的可执行匹配器

use regex::Regex;

use crate::rule::MatchType;

#[derive(Debug, Clone)]
pub enum Matcher {
    Contains(String), // 包含匹配（忽略大小写，已转小写）
    Regex(Regex), // 正则匹配（忽略大小写）
    Never(String), // 无效模式，永不匹配
}

impl Matcher {
    /// 简单匹配判断
    pub fn is_match(&self, input: &str) -> bool {
        match self {
            Matcher::Contains(s) => !s.is_empty() && input.to_lowercase().contains(s.as_str()),
            Matcher::Regex(regex) => regex.is_match(input),
            Matcher::Never(_) => false,
        }
    }

    pub fn match_type(&self) -> Option<MatchType> {
        match self {
            Matcher::Contains(_) => Some(MatchType::Contains),
            Matcher::Regex(_) => Some(MatchType::Regex),
            Matcher::Never(_) => None,
        }
    }

    /// 规则描述
    pub fn describe(&self) -> &str {
        match self {
            Matcher::Contains(s) => s,
            Matcher::Regex(r) => r.as_str(),
            Matcher::Never(raw) => raw,
        }
    }
}
