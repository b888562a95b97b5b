//! 匹配引擎
//! 两个状态：Idle（无模式，扫描为空操作）/ Armed（至少一条模式）
//! 先用合并模式做存在性预检（绝大多数响应在此被快速拒绝），
//! 命中后逐条重扫，找出所有命中的模式及其首次出现位置
//! 合并模式不可用时跳过预检，直接逐条扫描

use crate::compiler::{Pattern, PatternSet};
use crate::http::HttpResponse;

/// 引擎状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Armed,
}

/// 单个模式在响应体中的首次命中
#[derive(Debug, Clone, Copy)]
pub struct PatternMatch<'a> {
    pub pattern: &'a Pattern,
    /// 字节偏移
    pub start: usize,
    pub matched: &'a str,
}

/// 只读匹配引擎，可被多线程无锁共享
#[derive(Debug, Clone, Default)]
pub struct MatchEngine {
    patterns: PatternSet,
}

impl MatchEngine {
    pub fn new(patterns: PatternSet) -> Self {
        Self { patterns }
    }

    pub fn idle() -> Self {
        Self::default()
    }

    pub fn state(&self) -> EngineState {
        if !self.patterns.is_empty() {
            EngineState::Armed
        } else {
            EngineState::Idle
        }
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// 快速路径：合并模式是否命中（无合并模式时退化为任一成员命中）
    #[inline(always)]
    pub fn combined_matches(&self, body: &str) -> bool {
        match self.patterns.combined() {
            Some(combined) => combined.is_match(body),
            None => self.patterns.patterns().iter().any(|p| p.is_match(body)),
        }
    }

    /// 扫描任意文本，返回所有命中模式（按模式顺序）
    pub fn scan<'a>(&'a self, body: &'a str) -> Vec<PatternMatch<'a>> {
        if self.patterns.combined().is_some() && !self.combined_matches(body) {
            return Vec::new();
        }

        // 合并模式无法区分命中的是哪条，逐条重扫
        self.patterns
            .patterns()
            .iter()
            .filter_map(|pattern| {
                pattern.regex().find(body).map(|m| PatternMatch {
                    pattern,
                    start: m.start(),
                    matched: m.as_str(),
                })
            })
            .collect()
    }

    /// 扫描响应：仅处理文本/HTML响应，二进制内容直接跳过
    pub fn scan_response<'a>(&'a self, response: &'a HttpResponse) -> Vec<PatternMatch<'a>> {
        if self.state() == EngineState::Idle || !response.is_text_or_html() {
            return Vec::new();
        }
        self.scan(response.body())
    }
}
