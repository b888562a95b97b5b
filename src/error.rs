//! 全局错误类型定义
//! 配置期错误（正则/选项/规则文件）与外围错误（IO/JSON/URL）统一在PluginError中
use std::io::Error as IoError;
use std::path::PathBuf;

use regex::Error as RegexError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;
use url::ParseError as UrlParseError;

#[derive(Error, Debug)]
pub enum PluginError {
    // 配置相关错误
    /// 单条用户正则编译失败，index为合并后模式列表中的下标（文件模式在前，单条模式在后）
    #[error("正则编译失败：模式 #{index} \"{raw}\"：{source}")]
    InvalidPattern {
        index: usize,
        raw: String,
        #[source]
        source: RegexError,
    },
    #[error("配置错误：{0}")]
    Configuration(String),
    #[error("正则文件读取失败：{path:?}：{source}")]
    PatternFile {
        path: PathBuf,
        #[source]
        source: IoError,
    },
    #[error("未知插件：{0}")]
    UnknownPlugin(String),

    // 基础错误
    #[error("IO操作失败：{0}")]
    Io(#[from] IoError),
    #[error("JSON解析失败：{0}")]
    Json(#[from] SerdeJsonError),
    #[error("URL解析失败：{0}")]
    Url(#[from] UrlParseError),
}

impl PluginError {
    /// 是否属于配置类错误（会阻止插件激活）
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            PluginError::InvalidPattern { .. }
                | PluginError::Configuration(_)
                | PluginError::PatternFile { .. }
                | PluginError::UnknownPlugin(_)
        )
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        PluginError::Configuration(msg.into())
    }
}

// 全局Result类型
pub type PluginResult<T> = Result<T, PluginError>;
