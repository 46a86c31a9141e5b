//! hls-adfilter - 基于启发式规则的 HLS 广告切片识别与 M3U8 播放列表过滤

// 导出全局错误类型
pub use self::error::{AdFilterError, AdResult};

// 导出配置模块
pub use self::config::{FilterConfiguration, ConfigManager, CustomConfigBuilder};

// 导出规则模块核心接口
pub use self::rule::{
    AdType, DetectionResult, DurationRange, FragmentDescriptor, MatchType, Rule,
    PatternRegistry, ConfigStore, StoreFormat, default_rules,
};

// 导出编译模块核心接口
pub use self::compiler::{Matcher, RuleCompiler};

// 导出检测模块核心接口
pub use self::detector::{
    AdFilter, CacheStats, ClassifierCache, ClassifierTuning, SegmentClassifier,
};

// 导出播放列表模块核心接口
pub use self::playlist::{
    AdDurationTable, ManifestFetcher, PlaylistRewriteResult, PlaylistRewriter,
};

// 声明所有子模块
pub mod config;
pub mod error;
pub mod rule;
pub mod compiler;
pub mod detector;
pub mod playlist;
pub mod utils;
