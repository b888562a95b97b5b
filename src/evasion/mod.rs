//! 规避模块：请求变异插件 + 按优先级排序的插件链
pub mod chain;
pub mod full_width_encode;

pub use self::chain::EvasionChain;
pub use self::full_width_encode::{BodyMutation, FullWidthEncode};
