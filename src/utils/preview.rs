//! 匹配片段/正则文本截断
//! 按字符计数截断（不会切断多字节字符），超长时追加 "..."

use std::fmt::{self, Display, Formatter};

/// 截断后追加的省略标记
pub const ELLIPSIS: &str = "...";

/// 零分配的截断视图：日志中直接以 `{}` 输出
#[derive(Debug, Clone, Copy)]
pub struct Excerpt<'a> {
    text: &'a str,
    max_chars: usize,
}

impl<'a> Excerpt<'a> {
    pub fn new(text: &'a str, max_chars: usize) -> Self {
        Self { text, max_chars }
    }

    /// 截断位置（字节偏移），无需截断时为 None
    fn cut(&self) -> Option<usize> {
        self.text.char_indices().nth(self.max_chars).map(|(i, _)| i)
    }

    pub fn is_truncated(&self) -> bool {
        self.cut().is_some()
    }
}

impl Display for Excerpt<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.cut() {
            Some(cut) => {
                f.write_str(&self.text[..cut])?;
                f.write_str(ELLIPSIS)
            }
            None => f.write_str(self.text),
        }
    }
}

/// 发现描述用的片段摘录
pub fn excerpt(matched: &str, max_chars: usize) -> String {
    Excerpt::new(matched, max_chars).to_string()
}
