//! rsscanplug - Web漏洞扫描器插件：全角编码请求规避 + 用户自定义正则响应检查

// 导出全局错误类型
pub use self::error::{PluginError, PluginResult};

// 导出配置模块
pub use self::config::{
    OptionList, OptionType, OptionValue, PluginOption, ScanProfile, ScanProfileBuilder,
};

// 导出插件契约
pub use self::plugin::{
    EvasionPlugin, GrepPlugin, Plugin, PluginCategory, PluginKind, DEFAULT_PRIORITY, MAX_PRIORITY,
};

// 导出HTTP模型
pub use self::http::{is_url_encoded_form, BodyKind, HttpRequest, HttpResponse, ResponseId};

// 导出编译模块核心接口
pub use self::compiler::{CombinedPattern, Pattern, PatternCompiler, PatternSet, PatternSource};

// 导出编码器
pub use self::encoder::FullWidthEncoder;

// 导出规避插件
pub use self::evasion::{BodyMutation, EvasionChain, FullWidthEncode};

// 导出Grep插件
pub use self::grep::{
    EngineState, FindingAggregator, MatchEngine, PatternMatch, RecordOutcome, UserDefinedRegex,
};

// 导出知识库
pub use self::kb::{Finding, KnowledgeBase, KnowledgeSink};

// 声明所有子模块
pub mod compiler;
pub mod config;
pub mod encoder;
pub mod error;
pub mod evasion;
pub mod grep;
pub mod http;
pub mod kb;
pub mod plugin;
pub mod utils;
