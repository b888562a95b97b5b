//! 编译后模式模型
//! 用户正则编译后的结构：单条模式 + 合并快速路径模式

use std::fmt::{self, Display, Formatter};

use regex::{Error as RegexError, Regex, RegexBuilder, RegexSet, RegexSetBuilder};

/// 统一的正则编译入口：始终忽略大小写 + 点号匹配换行
#[inline]
pub(crate) fn build_regex(raw: &str) -> Result<Regex, RegexError> {
    RegexBuilder::new(raw)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
}

/// 单条编译后的用户正则，编译后不可变
#[derive(Debug, Clone)]
pub struct Pattern {
    /// 在模式集合中的下标，作为模式的身份标识
    index: usize,
    regex: Regex,
}

impl Pattern {
    pub(crate) fn compile(index: usize, raw: &str) -> Result<Self, RegexError> {
        Ok(Self {
            index,
            regex: build_regex(raw)?,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// 原始正则文本
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    #[inline(always)]
    pub fn is_match(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 合并模式的编译体积上限（单条模式仍使用regex默认上限）
pub const COMBINED_SIZE_LIMIT: usize = 64 * (1 << 20);

/// 合并模式：所有成员组成一个RegexSet，语义等价于 (p1)|(p2)|...，仅用于存在性预检
/// 各成员独立解析，(?x) 注释等成员内语法不会影响其他成员
#[derive(Debug, Clone)]
pub struct CombinedPattern {
    set: RegexSet,
}

impl CombinedPattern {
    pub(crate) fn compile<'a>(
        raws: impl IntoIterator<Item = &'a str>,
        size_limit: usize,
    ) -> Result<Self, RegexError> {
        let set = RegexSetBuilder::new(raws)
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .size_limit(size_limit)
            .build()?;
        Ok(Self { set })
    }

    /// 成员原始正则
    pub fn patterns(&self) -> &[String] {
        self.set.patterns()
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    #[inline(always)]
    pub fn is_match(&self, input: &str) -> bool {
        self.set.is_match(input)
    }
}

/// 一次配置产出的完整模式集合，整体替换，不做增量修改
/// combined 为 None 而 patterns 非空时：合并模式无法构建，逐条扫描
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
    combined: Option<CombinedPattern>,
}

impl PatternSet {
    pub(crate) fn new(patterns: Vec<Pattern>, combined: Option<CombinedPattern>) -> Self {
        Self { patterns, combined }
    }

    /// 空集合（引擎处于Idle状态）
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn combined(&self) -> Option<&CombinedPattern> {
        self.combined.as_ref()
    }

    pub fn get(&self, index: usize) -> Option<&Pattern> {
        self.patterns.get(index)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
