//! 工具模块：提供通用工具函数
pub mod preview;

pub use self::preview::{excerpt, Excerpt, ELLIPSIS};
