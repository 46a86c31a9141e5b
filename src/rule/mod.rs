//! 规则模块：负责规则数据模型、注册表、内置规则与配置持久化
pub mod model;
pub mod registry;
pub mod defaults;
pub mod store;

// 导出核心接口
pub use self::model::{
    AdType, DetectionResult, DurationRange, FragmentDescriptor, MatchType, Rule,
};
pub use self::registry::PatternRegistry;
pub use self::defaults::{default_rules, FALLBACK_RULES};
pub use self::store::{ConfigStore, StoreFormat};
