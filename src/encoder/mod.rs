//! 编码模块：请求规避编码
pub mod full_width;

pub use self::full_width::{FullWidthEncoder, PROTECTED, SHIFT};
