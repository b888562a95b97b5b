//! 插件契约：所有插件共用的配置/描述/依赖接口，以及规避/Grep两类插件的专属能力
//! 编排器通过 PluginKind 的标签变体分发，不依赖运行时反射

use std::fmt::{self, Display, Formatter};

use crate::config::OptionList;
use crate::error::PluginResult;
use crate::http::{HttpRequest, HttpResponse};

/// 规避插件默认优先级（0最先执行，100最后）
pub const DEFAULT_PRIORITY: u8 = 50;
pub const MAX_PRIORITY: u8 = 100;

/// 所有插件的通用特质
pub trait Plugin: Send + Sync {
    /// 插件名称（知识库归档与依赖声明使用）
    fn name(&self) -> &'static str;

    /// 应用配置；失败时保持原有配置不变
    /// `&mut self` 保证配置期不会与扫描并发
    fn configure(&mut self, options: &OptionList) -> PluginResult<()>;

    /// 当前选项（名称/当前值/类型/帮助），按声明顺序
    fn describe(&self) -> OptionList;

    /// 必须先于本插件执行的插件名称
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    /// 详细说明
    fn long_description(&self) -> &'static str;
}

/// 请求规避插件：改写请求语法但不改变其语义
pub trait EvasionPlugin: Plugin {
    /// 返回新请求，输入请求不得被修改
    fn mutate_request(&self, request: &HttpRequest) -> HttpRequest;

    /// 排序优先级，取值 [0, 100]
    fn priority(&self) -> u8 {
        DEFAULT_PRIORITY
    }
}

/// 响应检查插件：可被多个扫描线程并发调用
pub trait GrepPlugin: Plugin {
    /// 扫描入口，仅产生副作用（记录/发布发现）
    fn on_response(&self, request: &HttpRequest, response: &HttpResponse);

    /// 扫描结束时调用一次：汇总并发布发现
    fn finalize(&self);
}

/// 插件分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginCategory {
    Evasion,
    Grep,
}

impl Display for PluginCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PluginCategory::Evasion => write!(f, "evasion"),
            PluginCategory::Grep => write!(f, "grep"),
        }
    }
}

/// 编排器持有的插件实例（标签变体）
pub enum PluginKind {
    Evasion(Box<dyn EvasionPlugin>),
    Grep(Box<dyn GrepPlugin>),
}

impl PluginKind {
    pub fn category(&self) -> PluginCategory {
        match self {
            PluginKind::Evasion(_) => PluginCategory::Evasion,
            PluginKind::Grep(_) => PluginCategory::Grep,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PluginKind::Evasion(p) => p.name(),
            PluginKind::Grep(p) => p.name(),
        }
    }

    pub fn configure(&mut self, options: &OptionList) -> PluginResult<()> {
        match self {
            PluginKind::Evasion(p) => p.configure(options),
            PluginKind::Grep(p) => p.configure(options),
        }
    }

    pub fn describe(&self) -> OptionList {
        match self {
            PluginKind::Evasion(p) => p.describe(),
            PluginKind::Grep(p) => p.describe(),
        }
    }

    pub fn dependencies(&self) -> Vec<String> {
        match self {
            PluginKind::Evasion(p) => p.dependencies(),
            PluginKind::Grep(p) => p.dependencies(),
        }
    }

    pub fn long_description(&self) -> &'static str {
        match self {
            PluginKind::Evasion(p) => p.long_description(),
            PluginKind::Grep(p) => p.long_description(),
        }
    }

    /// 仅规避插件有优先级
    pub fn priority(&self) -> Option<u8> {
        match self {
            PluginKind::Evasion(p) => Some(p.priority().min(MAX_PRIORITY)),
            PluginKind::Grep(_) => None,
        }
    }

    pub fn as_evasion(&self) -> Option<&dyn EvasionPlugin> {
        match self {
            PluginKind::Evasion(p) => Some(p.as_ref()),
            PluginKind::Grep(_) => None,
        }
    }

    pub fn as_grep(&self) -> Option<&dyn GrepPlugin> {
        match self {
            PluginKind::Grep(p) => Some(p.as_ref()),
            PluginKind::Evasion(_) => None,
        }
    }
}

impl fmt::Debug for PluginKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginKind")
            .field("category", &self.category())
            .field("name", &self.name())
            .finish()
    }
}
