//! 模式编译器核心
//! 仅负责将用户提供的正则文本编译为可执行模式集合（全部成功或整体失败）

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::pattern::{CombinedPattern, Pattern, PatternSet, COMBINED_SIZE_LIMIT};
use crate::error::{PluginError, PluginResult};
use crate::utils::Excerpt;

/// 模式来源：单条内联正则 + 按行存放的正则文件
/// 两者同时存在时，内联正则追加在文件模式之后
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSource {
    pub inline: Option<String>,
    pub file: Option<PathBuf>,
}

impl PatternSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inline(mut self, pattern: impl Into<String>) -> Self {
        self.inline = Some(pattern.into());
        self
    }

    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// 展开为有序的原始正则列表；空来源不贡献任何模式
    pub fn collect(&self) -> PluginResult<Vec<String>> {
        let mut raws = match &self.file {
            Some(path) => PatternCompiler::read_pattern_file(path)?,
            None => Vec::new(),
        };
        if let Some(inline) = self.inline.as_deref() {
            if !inline.trim().is_empty() {
                raws.push(inline.to_string());
            }
        }
        Ok(raws)
    }
}

/// 模式编译器
pub struct PatternCompiler;

impl PatternCompiler {
    /// 编译模式列表为完整的PatternSet
    /// 任一模式非法即整体失败，不产生部分状态
    pub fn compile<S: AsRef<str>>(raws: &[S]) -> PluginResult<PatternSet> {
        Self::compile_with_limit(raws, COMBINED_SIZE_LIMIT)
    }

    /// 指定合并模式体积上限的编译
    /// 合并模式构建失败不影响配置：降级为逐条扫描
    pub fn compile_with_limit<S: AsRef<str>>(
        raws: &[S],
        combined_size_limit: usize,
    ) -> PluginResult<PatternSet> {
        if raws.is_empty() {
            return Ok(PatternSet::empty());
        }
        let start = Instant::now();

        let mut patterns = Vec::with_capacity(raws.len());
        for (index, raw) in raws.iter().enumerate() {
            let raw = raw.as_ref();
            let pattern = Pattern::compile(index, raw).map_err(|source| {
                log::warn!(
                    "Regex compilation failed | Index: {} | Pattern: {} | Error: {}",
                    index,
                    Excerpt::new(raw, 80),
                    source
                );
                PluginError::InvalidPattern {
                    index,
                    raw: raw.to_string(),
                    source,
                }
            })?;
            patterns.push(pattern);
        }

        // 合并模式在全部成员编译成功后一次性构建
        let combined =
            match CombinedPattern::compile(raws.iter().map(|r| r.as_ref()), combined_size_limit) {
                Ok(combined) => Some(combined),
                Err(e) => {
                    log::warn!(
                        "Combined pattern unavailable, falling back to per-pattern scan | Patterns: {} | Error: {}",
                        raws.len(),
                        e
                    );
                    None
                }
            };

        log::debug!(
            "Pattern set compiled | Patterns: {} | Fast path: {} | Time: {:?}",
            patterns.len(),
            combined.is_some(),
            start.elapsed()
        );

        Ok(PatternSet::new(patterns, combined))
    }

    /// 从来源收集并编译
    pub fn compile_source(source: &PatternSource) -> PluginResult<PatternSet> {
        let raws = source.collect()?;
        Self::compile(&raws)
    }

    /// 读取正则文件：逐行trim，跳过空行
    pub fn read_pattern_file(path: &Path) -> PluginResult<Vec<String>> {
        let file = File::open(path).map_err(|source| PluginError::PatternFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::read_patterns(BufReader::new(file)).map_err(|e| match e {
            PluginError::Io(source) => PluginError::PatternFile {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn read_patterns<R: BufRead>(reader: R) -> PluginResult<Vec<String>> {
        let mut raws = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                raws.push(trimmed.to_string());
            }
        }
        Ok(raws)
    }
}
