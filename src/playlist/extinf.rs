//! `#EXTINF` 时长声明解析
//! 时长缺失或格式异常时视为未知，不报错

/// 时长声明行前缀
pub const EXTINF_PREFIX: &str = "#EXTINF:";

/// 解析后的时长声明
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtInf {
    pub duration: Option<f64>,
    pub title: Option<String>,
}

impl ExtInf {
    /// 解析 `#EXTINF:<时长>[,<标题>]`，非时长声明行返回 None
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.trim().strip_prefix(EXTINF_PREFIX)?;
        let (duration_str, title) = match rest.split_once(',') {
            Some((d, t)) => (d, Some(t.trim())),
            None => (rest, None),
        };

        let duration = duration_str
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite() && *d > 0.0);

        Some(Self {
            duration,
            title: title.filter(|t| !t.is_empty()).map(str::to_string),
        })
    }
}
