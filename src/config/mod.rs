//! 配置模块：插件选项模型 + 扫描配置文件
pub mod option;
pub mod profile;

pub use self::option::{OptionList, OptionType, OptionValue, PluginOption};
pub use self::profile::{ScanProfile, ScanProfileBuilder};
