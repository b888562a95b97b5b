//! Grep 插件：响应体匹配引擎、发现聚合与用户自定义正则插件

pub mod aggregator;
pub mod engine;
pub mod user_defined_regex;

pub use self::aggregator::{FindingAggregator, RecordOutcome, EXCERPT_MAX_CHARS};
pub use self::engine::{EngineState, MatchEngine, PatternMatch};
pub use self::user_defined_regex::{UserDefinedRegex, KB_CATEGORY};
