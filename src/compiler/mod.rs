//! 编译模块：将规则模式编译为可执行的匹配器
pub mod pattern;
pub mod compiler;

pub use self::pattern::Matcher;
pub use self::compiler::RuleCompiler;
