//! 扫描配置档：按插件名存放选项覆盖值
//! JSON格式：{ "plugins": { "<插件名>": { "<选项名>": 值 } } }

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::option::OptionValue;
use crate::error::{PluginError, PluginResult};
use crate::plugin::PluginKind;

type Overrides = BTreeMap<String, OptionValue>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanProfile {
    #[serde(default)]
    pub plugins: BTreeMap<String, Overrides>,
}

impl ScanProfile {
    pub fn builder() -> ScanProfileBuilder {
        ScanProfileBuilder::new()
    }

    pub fn from_json(json: &str) -> PluginResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> PluginResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let profile = Self::from_json(&content)?;
        log::debug!(
            "Scan profile loaded | Path: {} | Plugins: {}",
            path.display(),
            profile.plugins.len()
        );
        Ok(profile)
    }

    pub fn to_json(&self) -> PluginResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn options_for(&self, plugin: &str) -> Option<&BTreeMap<String, OptionValue>> {
        self.plugins.get(plugin)
    }

    /// 合并覆盖值到插件当前选项并重新配置
    /// 未出现在配置档中的插件保持不变，返回是否执行了配置
    pub fn apply(&self, plugin: &mut PluginKind) -> PluginResult<bool> {
        let Some(overrides) = self.options_for(plugin.name()) else {
            return Ok(false);
        };

        let mut options = plugin.describe();
        for (name, value) in overrides {
            if options.get(name).is_none() {
                return Err(PluginError::config(format!(
                    "unknown option \"{}\" for plugin \"{}\"",
                    name,
                    plugin.name()
                )));
            }
            options.set(name, value.clone())?;
        }

        plugin.configure(&options)?;
        log::debug!(
            "Scan profile applied | Plugin: {} | Overrides: {}",
            plugin.name(),
            overrides.len()
        );
        Ok(true)
    }

    /// 应用到全部插件；配置档引用了未注册的插件时报错（在配置任何插件之前）
    pub fn apply_all(&self, plugins: &mut [PluginKind]) -> PluginResult<()> {
        if let Some(unknown) = self
            .plugins
            .keys()
            .find(|name| !plugins.iter().any(|p| p.name() == name.as_str()))
        {
            return Err(PluginError::UnknownPlugin(unknown.clone()));
        }
        for plugin in plugins.iter_mut() {
            self.apply(plugin)?;
        }
        Ok(())
    }
}

/// 配置档构建器
#[derive(Debug, Clone, Default)]
pub struct ScanProfileBuilder {
    profile: ScanProfile,
}

impl ScanProfileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plugin_option(
        mut self,
        plugin: impl Into<String>,
        name: impl Into<String>,
        value: OptionValue,
    ) -> Self {
        self.profile
            .plugins
            .entry(plugin.into())
            .or_default()
            .insert(name.into(), value);
        self
    }

    pub fn build(self) -> ScanProfile {
        self.profile
    }
}
