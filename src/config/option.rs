//! 插件配置选项模型
//! 有序选项容器 + 按名称查找，选项值带类型校验

use std::fmt::{self, Display, Formatter};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{PluginError, PluginResult};

/// 选项值类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    String,
    Boolean,
    Integer,
    List,
}

impl Display for OptionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::String => write!(f, "string"),
            OptionType::Boolean => write!(f, "boolean"),
            OptionType::Integer => write!(f, "integer"),
            OptionType::List => write!(f, "list"),
        }
    }
}

/// 选项值（untagged，JSON中直接写字面量）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Boolean(bool),
    Integer(i64),
    String(String),
    List(Vec<String>),
}

impl OptionValue {
    pub fn option_type(&self) -> OptionType {
        match self {
            OptionValue::String(_) => OptionType::String,
            OptionValue::Boolean(_) => OptionType::Boolean,
            OptionValue::Integer(_) => OptionType::Integer,
            OptionValue::List(_) => OptionType::List,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            OptionValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            OptionValue::List(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// 按目标类型解析文本（命令行/界面输入统一走这里）
    pub fn parse_as(option_type: OptionType, raw: &str) -> PluginResult<Self> {
        match option_type {
            OptionType::String => Ok(OptionValue::String(raw.to_string())),
            OptionType::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(OptionValue::Boolean(true)),
                "false" | "0" | "no" | "off" => Ok(OptionValue::Boolean(false)),
                other => Err(PluginError::config(format!("\"{}\" is not a boolean", other))),
            },
            OptionType::Integer => raw
                .trim()
                .parse::<i64>()
                .map(OptionValue::Integer)
                .map_err(|e| PluginError::config(format!("\"{}\" is not an integer: {}", raw, e))),
            OptionType::List => Ok(OptionValue::List(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
        }
    }
}

impl Display for OptionValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::String(s) => write!(f, "{}", s),
            OptionValue::Boolean(b) => write!(f, "{}", b),
            OptionValue::Integer(i) => write!(f, "{}", i),
            OptionValue::List(v) => write!(f, "{}", v.join(",")),
        }
    }
}

/// 单个选项描述符：名称、当前值、类型、帮助文本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginOption {
    pub name: String,
    pub value: OptionValue,
    pub option_type: OptionType,
    /// 一行描述
    pub description: String,
    /// 详细帮助，缺省与描述相同
    #[serde(default)]
    pub help: String,
}

impl PluginOption {
    pub fn new(
        name: impl Into<String>,
        value: OptionValue,
        description: impl Into<String>,
        option_type: OptionType,
    ) -> Self {
        let description = description.into();
        Self {
            name: name.into(),
            option_type,
            help: description.clone(),
            description,
            value,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// 设置新值，类型不一致时拒绝
    pub fn set_value(&mut self, value: OptionValue) -> PluginResult<()> {
        if value.option_type() != self.option_type {
            return Err(PluginError::config(format!(
                "option \"{}\" expects a {} value, got {}",
                self.name,
                self.option_type,
                value.option_type()
            )));
        }
        self.value = value;
        Ok(())
    }
}

/// 有序选项容器，保持声明顺序，支持按名称查找
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<PluginOption>", into = "Vec<PluginOption>")]
pub struct OptionList {
    options: Vec<PluginOption>,
    index: FxHashMap<String, usize>,
}

impl OptionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加选项，同名选项原位替换
    pub fn add(&mut self, option: PluginOption) {
        match self.index.get(&option.name) {
            Some(&pos) => self.options[pos] = option,
            None => {
                self.index.insert(option.name.clone(), self.options.len());
                self.options.push(option);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&PluginOption> {
        self.index.get(name).map(|&pos| &self.options[pos])
    }

    /// 必选项取值，缺失时返回配置错误
    pub fn value(&self, name: &str) -> PluginResult<&OptionValue> {
        self.get(name)
            .map(|o| &o.value)
            .ok_or_else(|| PluginError::config(format!("missing required option \"{}\"", name)))
    }

    /// 字符串选项取值：空串和字面量"None"都视为未设置
    pub fn string_value(&self, name: &str) -> PluginResult<Option<&str>> {
        let value = self.value(name)?;
        let s = value.as_str().ok_or_else(|| {
            PluginError::config(format!(
                "option \"{}\" expects a string value, got {}",
                name,
                value.option_type()
            ))
        })?;
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == "None" {
            Ok(None)
        } else {
            Ok(Some(s))
        }
    }

    pub fn set(&mut self, name: &str, value: OptionValue) -> PluginResult<()> {
        let pos = *self
            .index
            .get(name)
            .ok_or_else(|| PluginError::config(format!("unknown option \"{}\"", name)))?;
        self.options[pos].set_value(value)
    }

    /// 以文本形式设置，按选项声明类型解析
    pub fn set_raw(&mut self, name: &str, raw: &str) -> PluginResult<()> {
        let option_type = self
            .get(name)
            .map(|o| o.option_type)
            .ok_or_else(|| PluginError::config(format!("unknown option \"{}\"", name)))?;
        self.set(name, OptionValue::parse_as(option_type, raw)?)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PluginOption> {
        self.options.iter()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl From<Vec<PluginOption>> for OptionList {
    fn from(options: Vec<PluginOption>) -> Self {
        let mut list = OptionList::new();
        for option in options {
            list.add(option);
        }
        list
    }
}

impl From<OptionList> for Vec<PluginOption> {
    fn from(list: OptionList) -> Self {
        list.options
    }
}
