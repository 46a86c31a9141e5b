//! hls-adfilter 命令行工具
//! - classify：判定单个切片
//! - rewrite：过滤本地或远程 M3U8 播放列表
//! - rules：列出当前配置中的规则

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use url::Url;

use hls_adfilter::{
    AdFilter, ConfigStore, FilterConfiguration, FragmentDescriptor, ManifestFetcher,
};

#[derive(Parser)]
#[command(name = "hls-adfilter", version)]
#[command(about = "HLS 广告切片识别与 M3U8 播放列表过滤")]
struct Cli {
    /// 配置文件（.json 为 JSON，其余为 MessagePack）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 严格模式：只使用配置中的规则
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 判定单个切片是否为广告
    Classify {
        /// 切片地址
        url: String,

        /// 切片时长（秒）
        #[arg(short, long)]
        duration: Option<f64>,

        /// 切片标题
        #[arg(short, long)]
        title: Option<String>,

        /// 切片序号（从0开始）
        #[arg(short, long)]
        index: Option<usize>,
    },

    /// 过滤播放列表
    Rewrite {
        /// 本地文件路径或 http(s) 地址
        input: String,

        /// 资源站标识，缺省时按地址主机名推断
        #[arg(short, long)]
        source: Option<String>,

        /// 输出文件，缺省输出到标准输出
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 拉取超时（秒）
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },

    /// 列出规则
    Rules,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref()).await?;
    if cli.strict {
        config.strict_mode = true;
    }

    match cli.command {
        Commands::Classify { url, duration, title, index } => cmd_classify(config, url, duration, title, index),
        Commands::Rewrite { input, source, output, timeout } => {
            cmd_rewrite(config, &input, source, output, timeout).await
        }
        Commands::Rules => cmd_rules(&config),
    }
}

async fn load_config(path: Option<&PathBuf>) -> Result<FilterConfiguration> {
    let Some(path) = path else {
        return Ok(FilterConfiguration::default());
    };
    let store = ConfigStore::new(path);
    store
        .load()
        .await
        .with_context(|| format!("读取配置失败：{}", path.display()))
}

fn cmd_classify(
    config: FilterConfiguration,
    url: String,
    duration: Option<f64>,
    title: Option<String>,
    index: Option<usize>,
) -> Result<()> {
    let fragment = FragmentDescriptor {
        url,
        duration,
        title,
        index,
        total: None,
    };

    let mut filter = AdFilter::new(config);
    let detection = filter.classify(&fragment);
    // 分类结果已进入缓存，清空后再做最终判定
    filter.clear_cache();
    let is_ad = filter.is_ad(&fragment);

    println!("分类器：{}", detection);
    println!("最终判定：{}", if is_ad { "广告" } else { "正片" });
    Ok(())
}

async fn cmd_rewrite(
    config: FilterConfiguration,
    input: &str,
    source: Option<String>,
    output: Option<PathBuf>,
    timeout: u64,
) -> Result<()> {
    let mut filter = AdFilter::new(config);

    let (manifest, source) = match Url::parse(input) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            let fetcher = ManifestFetcher::new(timeout)?;
            let manifest = fetcher.fetch(input).await?;
            let source = source.or_else(|| filter.detect_source(input));
            (manifest, source)
        }
        _ => {
            let manifest = tokio::fs::read_to_string(input)
                .await
                .with_context(|| format!("读取播放列表失败：{}", input))?;
            (manifest, source)
        }
    };
    debug!("资源站标识：{:?}", source);

    let result = filter.rewrite_playlist(&manifest, source.as_deref());
    eprintln!(
        "切片总数：{}，移除：{}，保留：{}",
        result.original_segments,
        result.removed_segments,
        result.retained_segments()
    );

    match output {
        Some(path) => tokio::fs::write(&path, result.content)
            .await
            .with_context(|| format!("写入失败：{}", path.display()))?,
        None => print!("{}", result.content),
    }
    Ok(())
}

fn cmd_rules(config: &FilterConfiguration) -> Result<()> {
    println!(
        "过滤：{}，严格模式：{}，规则数：{}",
        if config.enabled { "开启" } else { "关闭" },
        if config.strict_mode { "开启" } else { "关闭" },
        config.rules.len()
    );
    for rule in config.rules.list() {
        println!("{}", serde_json::to_string(rule)?);
    }
    Ok(())
}
