//! 检测模块：切片分类与综合过滤核心逻辑
pub mod tuning;
pub mod analyzer;
pub mod cache;
pub mod classifier;
pub mod filter;

// 导出核心接口
pub use self::tuning::{ClassifierTuning, DurationBucket, DEFAULT_DURATION_BUCKETS};
pub use self::analyzer::{DurationAnalyzer, SequenceAnalyzer, TitleAnalyzer, UrlAnalyzer};
pub use self::cache::{CacheStats, ClassifierCache};
pub use self::classifier::SegmentClassifier;
pub use self::filter::AdFilter;
