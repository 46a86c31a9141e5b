//! 播放列表模块：M3U8 文本级广告过滤
pub mod durations;
pub mod extinf;
pub mod rewriter;
pub mod fetcher;

pub use self::durations::{AdDurationTable, DurationMatch};
pub use self::extinf::ExtInf;
pub use self::rewriter::{PlaylistRewriter, PlaylistRewriteResult};
pub use self::fetcher::ManifestFetcher;
