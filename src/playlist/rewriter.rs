//! 播放列表重写器
//! 单次顺序扫描 M3U8 文本，移除广告切片并保持清单结构有效

use serde::Serialize;
use tracing::debug;

use super::durations::AdDurationTable;
use super::extinf::ExtInf;
use crate::compiler::RuleCompiler;
use crate::config::FilterConfiguration;
use crate::rule::FragmentDescriptor;

const DISCONTINUITY_TAG: &str = "#EXT-X-DISCONTINUITY";
const STREAM_INF_PREFIX: &str = "#EXT-X-STREAM-INF";

/// 重写结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistRewriteResult {
    pub content: String,
    pub removed_segments: usize,
    pub original_segments: usize,
}

impl PlaylistRewriteResult {
    /// 保留的切片数
    pub fn retained_segments(&self) -> usize {
        self.original_segments.saturating_sub(self.removed_segments)
    }
}

/// 切片块：从时长声明到切片地址之间的所有行，整体保留或整体移除
struct SegmentBlock<'a> {
    lines: Vec<&'a str>,
    info: ExtInf,
    /// 时长命中广告时长表
    duration_hit: bool,
}

impl<'a> SegmentBlock<'a> {
    /// 块未遇到切片地址就结束：丢弃时长声明，其余标签原样输出
    fn flush_dangling(self, output: &mut Vec<&'a str>) {
        debug!("时长声明缺少切片地址，已丢弃：{}", self.lines[0].trim());
        output.extend(self.lines.into_iter().skip(1));
    }
}

/// 播放列表重写器
#[derive(Debug, Default)]
pub struct PlaylistRewriter {
    durations: AdDurationTable,
    compiler: RuleCompiler,
}

impl PlaylistRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_durations(durations: AdDurationTable) -> Self {
        Self {
            durations,
            compiler: RuleCompiler::new(),
        }
    }

    pub fn durations(&self) -> &AdDurationTable {
        &self.durations
    }

    pub fn durations_mut(&mut self) -> &mut AdDurationTable {
        &mut self.durations
    }

    /// 重写播放列表文本
    ///
    /// `original_segments` 与 `removed_segments` 都按切片地址行计数；
    /// 过滤关闭时原样返回。
    pub fn rewrite(
        &mut self,
        manifest: &str,
        source_id: Option<&str>,
        config: &FilterConfiguration,
    ) -> PlaylistRewriteResult {
        if !config.enabled {
            return PlaylistRewriteResult {
                content: manifest.to_string(),
                removed_segments: 0,
                original_segments: Self::count_segments(manifest),
            };
        }

        let mut output: Vec<&str> = Vec::new();
        let mut block: Option<SegmentBlock> = None;
        let mut expect_variant = false;
        let mut original_segments = 0;
        let mut removed_segments = 0;

        for line in manifest.split('\n') {
            let trimmed = line.trim();

            // 1. 不连续标记：无条件移除，不计数
            if trimmed == DISCONTINUITY_TAG {
                continue;
            }

            // 2. 时长声明：开启新的切片块
            if let Some(info) = ExtInf::parse(trimmed) {
                if let Some(dangling) = block.take() {
                    dangling.flush_dangling(&mut output);
                }
                let hit = info
                    .duration
                    .and_then(|d| self.durations.matches(d, source_id, config.strict_mode));
                if let Some(hit) = &hit {
                    debug!("时长命中广告时长表：{:?}，声明行：{}", hit, trimmed);
                }
                block = Some(SegmentBlock {
                    lines: vec![line],
                    info,
                    duration_hit: hit.is_some(),
                });
                continue;
            }

            // 3. 其它标签、注释与空行：块内则随块处理，否则原样保留
            if trimmed.is_empty() || trimmed.starts_with('#') {
                if trimmed.starts_with(STREAM_INF_PREFIX) {
                    expect_variant = true;
                }
                match block.as_mut() {
                    Some(current) => current.lines.push(line),
                    None => output.push(line),
                }
                continue;
            }

            // 4. 主播放列表的子流地址不是切片
            if expect_variant && block.is_none() {
                expect_variant = false;
                output.push(line);
                continue;
            }
            expect_variant = false;

            // 5. 切片地址：结束当前块
            original_segments += 1;
            let current = block.take();

            if current.as_ref().is_some_and(|b| b.duration_hit) {
                removed_segments += 1;
                debug!("移除广告时长对应切片：{}", trimmed);
                continue;
            }

            let info = current.as_ref().map(|b| b.info.clone()).unwrap_or_default();
            let fragment = FragmentDescriptor {
                url: trimmed.to_string(),
                duration: info.duration,
                title: info.title,
                index: Some(original_segments - 1),
                total: None,
            };

            if let Some(rule) = self.compiler.match_configured(&fragment, config) {
                debug!("切片命中规则：{}，移除：{}", rule.name, trimmed);
                removed_segments += 1;
                continue;
            }

            if let Some(current) = current {
                output.extend(current.lines);
            }
            output.push(line);
        }

        if let Some(dangling) = block.take() {
            dangling.flush_dangling(&mut output);
        }

        debug!(
            "播放列表重写完成：切片总数={}，移除={}",
            original_segments, removed_segments
        );

        PlaylistRewriteResult {
            content: output.join("\n"),
            removed_segments,
            original_segments,
        }
    }

    /// 统计切片地址行数（不含主播放列表的子流地址）
    fn count_segments(manifest: &str) -> usize {
        let mut count = 0;
        let mut expect_variant = false;
        for line in manifest.lines().map(str::trim) {
            if line.is_empty() {
                continue;
            }
            if line.starts_with('#') {
                if line.starts_with(STREAM_INF_PREFIX) {
                    expect_variant = true;
                }
                continue;
            }
            if expect_variant {
                expect_variant = false;
                continue;
            }
            count += 1;
        }
        count
    }
}
