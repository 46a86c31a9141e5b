//! 播放列表拉取
//! 只负责把远程 M3U8 文本取回，重写逻辑不依赖网络

use std::time::Duration;

use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::{AdFilterError, AdResult};

/// 播放列表拉取器
#[derive(Debug, Clone)]
pub struct ManifestFetcher {
    client: Client,
}

impl ManifestFetcher {
    /// 创建拉取器（超时单位：秒）
    pub fn new(timeout_secs: u64) -> AdResult<Self> {
        // 响应压缩由 reqwest 的 gzip 特性自动协商与解码
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client })
    }

    /// 拉取播放列表文本
    pub async fn fetch(&self, manifest_url: &str) -> AdResult<String> {
        let url = Url::parse(manifest_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AdFilterError::UnsupportedScheme(url.scheme().to_string()));
        }

        let response = self.client.get(url.as_str())
            .header("User-Agent", concat!("hls-adfilter/", env!("CARGO_PKG_VERSION")))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdFilterError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        debug!("播放列表拉取成功：{}，长度：{} 字节", url, text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_invalid_url() {
        let fetcher = ManifestFetcher::new(5).unwrap();
        assert!(matches!(fetcher.fetch("not a url").await, Err(AdFilterError::UrlError(_))));
        assert!(matches!(
            fetcher.fetch("ftp://example.com/index.m3u8").await,
            Err(AdFilterError::UnsupportedScheme(scheme)) if scheme == "ftp"
        ));
    }

    /// 访问本地服务时忽略环境中的代理设置
    fn local_fetcher() -> ManifestFetcher {
        ManifestFetcher {
            client: Client::builder().no_proxy().build().unwrap(),
        }
    }

    /// 本地起一个单次响应的 HTTP 服务，返回地址与收到的请求头
    async fn serve_once(response: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&buf[..n]).to_lowercase()
        });
        (format!("http://{}/index.m3u8", addr), handle)
    }

    #[tokio::test]
    async fn test_fetch_only_advertises_supported_encodings() {
        let (url, handle) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 8\r\nConnection: close\r\n\r\n#EXTM3U\n",
        )
        .await;

        let fetcher = local_fetcher();
        assert_eq!(fetcher.fetch(&url).await.unwrap(), "#EXTM3U\n");

        let request = handle.await.unwrap();
        assert!(request.contains("user-agent: hls-adfilter/"));
        assert!(!request.contains("deflate"));
    }

    #[tokio::test]
    async fn test_fetch_rejects_error_status() {
        let (url, handle) = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;

        let fetcher = local_fetcher();
        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, AdFilterError::HttpStatus { status: 404, .. }));
        handle.await.unwrap();
    }
}
