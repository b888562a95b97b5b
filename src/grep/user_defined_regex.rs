//! 用户自定义正则 Grep 插件
//! 配置期：内联正则 + 正则文件 → 原子替换模式集合（失败则保留旧集合）
//! 扫描期：合并模式预检 → 逐条重扫 → 聚合器按模式去重记录
//! 结束期：发布去重后的发现到知识库，只发布一次

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::compiler::{PatternCompiler, PatternSource};
use crate::config::{OptionList, OptionType, OptionValue, PluginOption};
use crate::error::PluginResult;
use crate::grep::aggregator::{FindingAggregator, RecordOutcome};
use crate::grep::engine::{EngineState, MatchEngine};
use crate::http::{HttpRequest, HttpResponse};
use crate::kb::{Finding, KnowledgeSink};
use crate::plugin::{GrepPlugin, Plugin};
use crate::utils::Excerpt;

pub const OPT_SINGLE_REGEX: &str = "single_regex";
pub const OPT_REGEX_FILE_PATH: &str = "regex_file_path";

/// 知识库分类
pub const KB_CATEGORY: &str = "user_defined_regex";

pub struct UserDefinedRegex {
    sink: Arc<dyn KnowledgeSink>,
    engine: MatchEngine,
    aggregator: FindingAggregator,
    finalized: AtomicBool,
    single_regex: String,
    regex_file_path: String,
}

impl UserDefinedRegex {
    pub const NAME: &'static str = "user_defined_regex";

    pub fn new(sink: Arc<dyn KnowledgeSink>) -> Self {
        Self {
            sink,
            engine: MatchEngine::idle(),
            aggregator: FindingAggregator::new(Self::NAME),
            finalized: AtomicBool::new(false),
            single_regex: String::new(),
            regex_file_path: String::new(),
        }
    }

    pub fn state(&self) -> EngineState {
        self.engine.state()
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    /// 当前累计的发现（不发布）
    pub fn findings(&self) -> Vec<Finding> {
        self.aggregator.drain()
    }

    fn source_from(options: &OptionList) -> PluginResult<PatternSource> {
        let mut source = PatternSource::new();
        if let Some(path) = options.string_value(OPT_REGEX_FILE_PATH)? {
            source = source.file(PathBuf::from(path.trim()));
        }
        if let Some(regex) = options.string_value(OPT_SINGLE_REGEX)? {
            source = source.inline(regex);
        }
        Ok(source)
    }
}

impl Plugin for UserDefinedRegex {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn configure(&mut self, options: &OptionList) -> PluginResult<()> {
        let source = Self::source_from(options)?;
        // 先完整编译，成功后才替换；任何错误都不触碰现有状态
        let patterns = PatternCompiler::compile_source(&source)?;

        log::debug!(
            "User defined regex configured | Patterns: {} | File: {} | Inline: {}",
            patterns.len(),
            source
                .file
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string()),
            Excerpt::new(source.inline.as_deref().unwrap_or("-"), 80)
        );

        self.engine = MatchEngine::new(patterns);
        self.aggregator.reset();
        self.finalized.store(false, Ordering::Release);
        self.single_regex = source.inline.unwrap_or_default();
        self.regex_file_path = source
            .file
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        Ok(())
    }

    fn describe(&self) -> OptionList {
        let mut options = OptionList::new();
        options.add(
            PluginOption::new(
                OPT_SINGLE_REGEX,
                OptionValue::String(self.single_regex.clone()),
                "Single regular expression to use in the search",
                OptionType::String,
            )
            .with_help("Search for a single regular expression in every response body"),
        );
        options.add(
            PluginOption::new(
                OPT_REGEX_FILE_PATH,
                OptionValue::String(self.regex_file_path.clone()),
                "A file path with regular expressions to use in the search",
                OptionType::String,
            )
            .with_help(
                "Regular expressions are read line by line and precompiled before the scan \
                 starts; blank lines are ignored",
            ),
        );
        options
    }

    fn long_description(&self) -> &'static str {
        "This plugin greps every text or HTML response body for user defined regular \
         expressions.\n\n\
         You can specify a single regular expression or use a file containing one regular \
         expression per line. If a regular expression matches a response, a finding is \
         written to the knowledge base; further matches of the same expression only add the \
         response id to that finding.\n\n\
         Two configurable parameters exist:\n    \
         - single_regex\n    \
         - regex_file_path"
    }
}

impl GrepPlugin for UserDefinedRegex {
    fn on_response(&self, _request: &HttpRequest, response: &HttpResponse) {
        for hit in self.engine.scan_response(response) {
            let outcome =
                self.aggregator
                    .record(hit.pattern, hit.matched, response.url(), response.id());
            if let RecordOutcome::Created { excerpt } = outcome {
                log::info!(
                    "User defined regular expression \"{}\" matched a response! Matched string is: \"{}\".",
                    hit.pattern,
                    excerpt
                );
            }
        }
    }

    fn finalize(&self) {
        if self.finalized.swap(true, Ordering::AcqRel) {
            log::debug!("User defined regex already finalized | Skip publishing");
            return;
        }

        let findings = self.aggregator.drain();
        for finding in &findings {
            self.sink.append(Self::NAME, KB_CATEGORY, finding.clone());
        }

        for finding in self.aggregator.unique_by_url() {
            log::info!(
                "User defined regex summary | URL: {} | Finding: {} | Responses: {}",
                finding.url,
                finding.name,
                finding.ids.len()
            );
        }
        log::debug!(
            "User defined regex finalized | Published findings: {}",
            findings.len()
        );
    }
}
