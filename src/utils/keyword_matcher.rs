//! 关键词匹配工具
//! ASCII关键词按词元（字母数字片段）精确匹配，避免 "ad" 命中 "download"；
//! 非ASCII关键词（中文等）按子串匹配

/// 关键词匹配工具
pub struct KeywordMatcher;

impl KeywordMatcher {
    /// 拆分为小写词元
    pub fn tokens(text_lower: &str) -> Vec<&str> {
        text_lower
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// 单个关键词是否命中（输入需已转小写）
    pub fn hit(text_lower: &str, tokens: &[&str], keyword: &str) -> bool {
        if keyword.is_ascii() && keyword.chars().all(|c| c.is_ascii_alphanumeric()) {
            tokens.contains(&keyword)
        } else {
            text_lower.contains(keyword)
        }
    }

    /// 返回第一个命中的关键词
    pub fn first_hit<'k>(text_lower: &str, keywords: &[&'k str]) -> Option<&'k str> {
        let tokens = Self::tokens(text_lower);
        keywords.iter().copied().find(|k| Self::hit(text_lower, &tokens, k))
    }

    /// 返回全部命中的关键词（去重，按列表顺序）
    pub fn all_hits<'k>(text_lower: &str, keywords: &[&'k str]) -> Vec<&'k str> {
        let tokens = Self::tokens(text_lower);
        let mut hits: Vec<&'k str> = Vec::new();
        for keyword in keywords.iter().copied() {
            if !hits.contains(&keyword) && Self::hit(text_lower, &tokens, keyword) {
                hits.push(keyword);
            }
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_keyword_matches_whole_token_only() {
        let url = "https://cdn.example.com/download/ad_segment_001.ts";
        assert_eq!(KeywordMatcher::all_hits(url, &["ad", "load"]), vec!["ad"]);
        assert_eq!(KeywordMatcher::first_hit("https://x/download/1.ts", &["ad"]), None);
    }

    #[test]
    fn test_non_ascii_keyword_matches_substring() {
        assert_eq!(KeywordMatcher::first_hit("第3集 精彩广告时间", &["广告"]), Some("广告"));
    }

    #[test]
    fn test_keyword_with_punctuation_matches_substring() {
        assert_eq!(KeywordMatcher::first_hit("https://x/vast.xml", &["vast.xml"]), Some("vast.xml"));
    }
}
