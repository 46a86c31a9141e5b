//! 错误类型
//! 检测、过滤与播放列表重写接口不返回错误；错误只来自规则校验、配置存储与播放列表拉取

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdFilterError {
    /// 规则字段不合法（空名称、时长区间倒置）
    #[error("规则校验失败：{0}")]
    RuleInvalid(String),
    /// 正则规则无法编译
    #[error("规则正则无效：{0}")]
    RegexCompileError(#[from] regex::Error),

    // 播放列表拉取
    #[error("播放列表请求失败：{0}")]
    HttpError(#[from] reqwest::Error),
    #[error("播放列表地址无效：{0}")]
    UrlError(#[from] url::ParseError),
    #[error("播放列表地址协议不受支持：{0}")]
    UnsupportedScheme(String),
    #[error("播放列表 {url} 返回状态码 {status}")]
    HttpStatus { url: String, status: u16 },

    // 配置存储
    #[error("配置JSON无效：{0}")]
    JsonError(#[from] serde_json::Error),
    #[error("配置MessagePack编解码失败：{0}")]
    MsgPackError(String),
    #[error("配置文件读写失败：{0}")]
    IoError(#[from] std::io::Error),
}

pub type AdResult<T> = Result<T, AdFilterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message() {
        let err = AdFilterError::HttpStatus {
            url: "https://x/index.m3u8".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "播放列表 https://x/index.m3u8 返回状态码 404");
    }
}
