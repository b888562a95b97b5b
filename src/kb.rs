//! 知识库：发现记录模型 + 注入式写入接口
//! 知识库生命周期由宿主（编排器）管理，插件只持有KnowledgeSink引用

use std::sync::{PoisonError, RwLock};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::http::ResponseId;

/// 一条发现记录：对应一个触发的模式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// 产出插件名称
    pub plugin_name: String,
    /// 简短名称
    pub name: String,
    /// 触发的原始正则
    pub pattern: String,
    pub description: String,
    /// 首次命中的目标URL
    pub url: Url,
    /// 所有命中的响应ID（首个为创建时的响应）
    pub ids: Vec<ResponseId>,
}

impl Finding {
    /// 追加命中响应ID（聚合器锁内调用，只做追加）
    pub fn add_id(&mut self, id: ResponseId) {
        self.ids.push(id);
    }
}

/// 发现写入接口（宿主注入）
pub trait KnowledgeSink: Send + Sync {
    fn append(&self, producer: &str, category: &str, finding: Finding);
}

type KbKey = (String, String);

/// 内存知识库实现，按 (插件名, 分类) 归档
#[derive(Debug, Default)]
pub struct KnowledgeBase {
    data: RwLock<FxHashMap<KbKey, Vec<Finding>>>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取指定插件/分类下的发现（副本）
    pub fn get_data(&self, producer: &str, category: &str) -> Vec<Finding> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        data.get(&(producer.to_string(), category.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// 所有发现，按插件名、分类排序输出（报告用）
    pub fn all_findings(&self) -> Vec<Finding> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<&KbKey> = data.keys().collect();
        keys.sort();
        keys.into_iter()
            .flat_map(|k| data[k].iter().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        data.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KnowledgeSink for KnowledgeBase {
    fn append(&self, producer: &str, category: &str, finding: Finding) {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        log::debug!(
            "Knowledge base append | Producer: {} | Category: {} | Finding: {}",
            producer,
            category,
            finding.name
        );
        data.entry((producer.to_string(), category.to_string()))
            .or_default()
            .push(finding);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(name: &str) -> Finding {
        Finding {
            plugin_name: "p".into(),
            name: name.into(),
            pattern: "x".into(),
            description: "d".into(),
            url: Url::parse("http://www.example.com/").unwrap(),
            ids: vec![1],
        }
    }

    #[test]
    fn test_append_and_get_data() {
        let kb = KnowledgeBase::new();
        kb.append("grep_a", "cat", finding("one"));
        kb.append("grep_a", "cat", finding("two"));
        kb.append("grep_b", "cat", finding("three"));

        let a = kb.get_data("grep_a", "cat");
        assert_eq!(a.len(), 2);
        assert_eq!(a[0].name, "one");
        assert!(kb.get_data("grep_a", "other").is_empty());
        assert_eq!(kb.len(), 3);
        assert_eq!(kb.all_findings().len(), 3);
    }

    #[test]
    fn test_add_id_appends_in_call_order() {
        let mut f = finding("one");
        f.add_id(3);
        f.add_id(2);
        assert_eq!(f.ids, vec![1, 3, 2]);
    }

    #[test]
    fn test_finding_serializes_to_json() {
        let json = serde_json::to_value(finding("one")).unwrap();
        assert_eq!(json["url"], "http://www.example.com/");
        assert_eq!(json["ids"], serde_json::json!([1]));
    }
}
