//! 发现聚合器
//! 每条模式至多一条发现；同一模式再次命中时只追加响应ID
//! 所有修改在同一把锁内完成（每个插件实例一把，实例间不共享）

use std::sync::{Mutex, PoisonError};

use rustc_hash::FxHashSet;
use url::Url;

use crate::compiler::Pattern;
use crate::http::ResponseId;
use crate::kb::Finding;
use crate::utils::excerpt;

/// 描述中引用的匹配片段最大字符数
pub const EXCERPT_MAX_CHARS: usize = 20;

/// 一次记录的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// 模式首次命中，新建发现；携带截断后的匹配片段
    Created { excerpt: String },
    /// 已有发现，追加了响应ID
    Appended,
}

#[derive(Debug)]
pub struct FindingAggregator {
    plugin_name: &'static str,
    /// 下标即模式下标
    findings: Mutex<Vec<Option<Finding>>>,
}

impl FindingAggregator {
    pub fn new(plugin_name: &'static str) -> Self {
        Self {
            plugin_name,
            findings: Mutex::new(Vec::new()),
        }
    }

    pub fn finding_name(pattern: &str) -> String {
        format!("User defined regex - {}", pattern)
    }

    pub fn finding_description(pattern: &str, excerpt: &str) -> String {
        format!(
            "The response matches the user defined regular expression \"{}\":\n{}\n",
            pattern, excerpt
        )
    }

    /// 记录一次命中
    pub fn record(
        &self,
        pattern: &Pattern,
        matched: &str,
        url: &Url,
        id: ResponseId,
    ) -> RecordOutcome {
        let mut findings = self.findings.lock().unwrap_or_else(PoisonError::into_inner);
        let index = pattern.index();
        if findings.len() <= index {
            findings.resize_with(index + 1, || None);
        }

        match &mut findings[index] {
            Some(existing) => {
                existing.add_id(id);
                RecordOutcome::Appended
            }
            slot @ None => {
                let short = excerpt(matched, EXCERPT_MAX_CHARS);
                *slot = Some(Finding {
                    plugin_name: self.plugin_name.to_string(),
                    name: Self::finding_name(pattern.as_str()),
                    pattern: pattern.as_str().to_string(),
                    description: Self::finding_description(pattern.as_str(), &short),
                    url: url.clone(),
                    ids: vec![id],
                });
                RecordOutcome::Created { excerpt: short }
            }
        }
    }

    /// 当前累计的发现（按模式顺序），以 (URL, 模式) 去重；不清空状态
    pub fn drain(&self) -> Vec<Finding> {
        let findings = self.findings.lock().unwrap_or_else(PoisonError::into_inner);
        let mut seen: FxHashSet<(&str, &str)> = FxHashSet::default();
        findings
            .iter()
            .flatten()
            .filter(|f| seen.insert((f.url.as_str(), f.pattern.as_str())))
            .cloned()
            .collect()
    }

    /// 每个目标URL只保留第一条发现（汇总输出用）
    pub fn unique_by_url(&self) -> Vec<Finding> {
        let findings = self.findings.lock().unwrap_or_else(PoisonError::into_inner);
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        findings
            .iter()
            .flatten()
            .filter(|f| seen.insert(f.url.as_str()))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        let findings = self.findings.lock().unwrap_or_else(PoisonError::into_inner);
        findings.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 模式集合替换后清空旧发现
    pub fn reset(&self) {
        let mut findings = self.findings.lock().unwrap_or_else(PoisonError::into_inner);
        findings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::PatternCompiler;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_same_pattern_twice_yields_one_finding() {
        let set = PatternCompiler::compile(&["foo"]).unwrap();
        let agg = FindingAggregator::new("user_defined_regex");
        let p = set.get(0).unwrap();

        let first = agg.record(p, "foo", &url("http://a.example/1"), 10);
        let second = agg.record(p, "FOO", &url("http://a.example/2"), 11);
        assert_eq!(first, RecordOutcome::Created { excerpt: "foo".into() });
        assert_eq!(second, RecordOutcome::Appended);

        let findings = agg.drain();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].ids, vec![10, 11]);
        assert_eq!(findings[0].url.as_str(), "http://a.example/1");
        assert_eq!(findings[0].name, "User defined regex - foo");
    }

    #[test]
    fn test_description_truncates_long_matches() {
        let set = PatternCompiler::compile(&["x+"]).unwrap();
        let agg = FindingAggregator::new("p");
        let long = "x".repeat(30);
        agg.record(set.get(0).unwrap(), &long, &url("http://a.example/"), 1);

        let findings = agg.drain();
        let f = &findings[0];
        assert_eq!(
            f.description,
            format!(
                "The response matches the user defined regular expression \"x+\":\n{}...\n",
                "x".repeat(20)
            )
        );
    }

    #[test]
    fn test_drain_is_idempotent() {
        let set = PatternCompiler::compile(&["a", "b"]).unwrap();
        let agg = FindingAggregator::new("p");
        agg.record(set.get(1).unwrap(), "b", &url("http://a.example/"), 1);
        agg.record(set.get(0).unwrap(), "a", &url("http://a.example/"), 2);
        let first = agg.drain();
        let second = agg.drain();
        assert_eq!(first, second);
        // 按模式顺序输出
        assert_eq!(first[0].pattern, "a");
        assert_eq!(first[1].pattern, "b");
    }

    #[test]
    fn test_drain_dedups_identical_pattern_and_url() {
        let set = PatternCompiler::compile(&["dup", "dup", "other"]).unwrap();
        let agg = FindingAggregator::new("p");
        for p in set.patterns() {
            agg.record(p, p.as_str(), &url("http://a.example/"), 1);
        }
        assert_eq!(agg.len(), 3);
        assert_eq!(agg.drain().len(), 2);
        assert_eq!(agg.unique_by_url().len(), 1);
    }

    #[test]
    fn test_concurrent_records_are_serialized() {
        let set = PatternCompiler::compile(&["a", "b", "c"]).unwrap();
        let agg = FindingAggregator::new("p");
        let target = url("http://a.example/");

        std::thread::scope(|s| {
            for worker in 0..8u64 {
                let agg = &agg;
                let set = &set;
                let target = &target;
                s.spawn(move || {
                    for i in 0..100u64 {
                        let p = set.get((i % 3) as usize).unwrap();
                        agg.record(p, p.as_str(), target, worker * 1000 + i);
                    }
                });
            }
        });

        let findings = agg.drain();
        assert_eq!(findings.len(), 3);
        let total: usize = findings.iter().map(|f| f.ids.len()).sum();
        assert_eq!(total, 800);
    }

    #[test]
    fn test_repeated_hits_append_every_id_in_order() {
        let set = PatternCompiler::compile(&["hit"]).unwrap();
        let agg = FindingAggregator::new("p");
        let target = url("http://a.example/");
        let p = set.get(0).unwrap();
        for id in 0..50_000u64 {
            agg.record(p, "hit", &target, id);
        }

        let findings = agg.drain();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].ids.len(), 50_000);
        assert!(findings[0].ids.iter().copied().eq(0..50_000u64));
    }

    #[test]
    fn test_reset_clears_findings() {
        let set = PatternCompiler::compile(&["a"]).unwrap();
        let agg = FindingAggregator::new("p");
        agg.record(set.get(0).unwrap(), "a", &url("http://a.example/"), 1);
        agg.reset();
        assert!(agg.is_empty());
    }
}
