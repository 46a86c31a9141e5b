//! 过滤配置持久化
//! 供调用方保存/读取 FilterConfiguration，核心检测逻辑不直接访问存储
//! `.json` 后缀使用 JSON，其余使用 MessagePack

use std::path::{Path, PathBuf};

use rmp_serde::{Serializer, from_slice};
use serde::Serialize;
use tracing::debug;

use crate::config::FilterConfiguration;
use crate::error::{AdFilterError, AdResult};

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFormat {
    Json,
    MsgPack,
}

impl StoreFormat {
    /// 按文件后缀推断格式
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => StoreFormat::Json,
            _ => StoreFormat::MsgPack,
        }
    }
}

/// 配置存储
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    format: StoreFormat,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = StoreFormat::from_path(&path);
        Self { path, format }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> StoreFormat {
        self.format
    }

    /// 读取配置
    pub async fn load(&self) -> AdResult<FilterConfiguration> {
        let data = tokio::fs::read(&self.path).await?;
        let config = Self::decode(self.format, &data)?;

        debug!("配置读取成功：{}，规则数：{}", self.path.display(), config.rules.len());
        Ok(config)
    }

    /// 读取配置，文件不存在或损坏时返回默认配置
    pub async fn load_or_default(&self) -> FilterConfiguration {
        match self.load().await {
            Ok(config) => config,
            Err(e) => {
                debug!("配置读取失败，使用默认配置：{}", e);
                FilterConfiguration::default()
            }
        }
    }

    /// 保存配置
    pub async fn save(&self, config: &FilterConfiguration) -> AdResult<()> {
        let data = Self::encode(self.format, config)?;
        debug!("配置序列化成功，数据大小：{} 字节", data.len());

        tokio::fs::write(&self.path, data).await?;
        Ok(())
    }

    /// 删除已保存的配置
    pub async fn clear(&self) -> AdResult<()> {
        if tokio::fs::try_exists(&self.path).await? {
            tokio::fs::remove_file(&self.path).await?;
        }
        Ok(())
    }

    fn encode(format: StoreFormat, config: &FilterConfiguration) -> AdResult<Vec<u8>> {
        match format {
            StoreFormat::Json => Ok(serde_json::to_vec_pretty(config)?),
            StoreFormat::MsgPack => {
                let mut data = Vec::new();
                config
                    .serialize(&mut Serializer::new(&mut data).with_struct_map())
                    .map_err(|e| AdFilterError::MsgPackError(format!("序列化失败：{}", e)))?;
                Ok(data)
            }
        }
    }

    fn decode(format: StoreFormat, data: &[u8]) -> AdResult<FilterConfiguration> {
        match format {
            StoreFormat::Json => Ok(serde_json::from_slice(data)?),
            StoreFormat::MsgPack => from_slice(data)
                .map_err(|e| AdFilterError::MsgPackError(format!("反序列化失败：{}", e))),
        }
    }
}
