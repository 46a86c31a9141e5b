//! 通用工具：关键词命中统计、检测结果合并
pub mod keyword_matcher;
pub mod detection_merger;

pub use self::keyword_matcher::KeywordMatcher;
pub use self::detection_merger::DetectionMerger;
