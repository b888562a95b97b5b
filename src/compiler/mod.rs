//! 编译模块：将用户正则编译为可执行的模式集合
pub mod pattern;
pub mod compiler;

pub use self::pattern::{CombinedPattern, Pattern, PatternSet, COMBINED_SIZE_LIMIT};
pub use self::compiler::{PatternCompiler, PatternSource};
