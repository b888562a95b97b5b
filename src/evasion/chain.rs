//! 规避插件链：按优先级升序依次改写请求（同优先级保持注册顺序）

use crate::http::HttpRequest;
use crate::plugin::{EvasionPlugin, MAX_PRIORITY};

#[derive(Default)]
pub struct EvasionChain {
    plugins: Vec<Box<dyn EvasionPlugin>>,
}

impl EvasionChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入到所有优先级不高于它的插件之后
    pub fn add(&mut self, plugin: Box<dyn EvasionPlugin>) {
        let priority = plugin.priority().min(MAX_PRIORITY);
        let pos = self
            .plugins
            .iter()
            .position(|p| p.priority().min(MAX_PRIORITY) > priority)
            .unwrap_or(self.plugins.len());
        log::debug!(
            "Evasion plugin registered | Name: {} | Priority: {} | Position: {}",
            plugin.name(),
            priority,
            pos
        );
        self.plugins.insert(pos, plugin);
    }

    pub fn with(mut self, plugin: Box<dyn EvasionPlugin>) -> Self {
        self.add(plugin);
        self
    }

    /// 执行顺序下的插件名称
    pub fn names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// 依次应用所有插件，返回新请求；空链返回副本
    pub fn apply(&self, request: &HttpRequest) -> HttpRequest {
        let mut current = request.copy();
        for plugin in &self.plugins {
            current = plugin.mutate_request(&current);
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OptionList;
    use crate::error::PluginResult;
    use crate::evasion::FullWidthEncode;
    use crate::plugin::Plugin;

    /// 在路径末尾追加固定片段，用于观察执行顺序
    struct AppendSegment {
        name: &'static str,
        segment: &'static str,
        priority: u8,
    }

    impl Plugin for AppendSegment {
        fn name(&self) -> &'static str {
            self.name
        }
        fn configure(&mut self, _options: &OptionList) -> PluginResult<()> {
            Ok(())
        }
        fn describe(&self) -> OptionList {
            OptionList::new()
        }
        fn long_description(&self) -> &'static str {
            "appends a path segment"
        }
    }

    impl EvasionPlugin for AppendSegment {
        fn mutate_request(&self, request: &HttpRequest) -> HttpRequest {
            let mut url = request.url().clone();
            url.set_path(&format!("{}{}", request.path(), self.segment));
            request.with_url(url)
        }
        fn priority(&self) -> u8 {
            self.priority
        }
    }

    fn seg(name: &'static str, segment: &'static str, priority: u8) -> Box<dyn EvasionPlugin> {
        Box::new(AppendSegment {
            name,
            segment,
            priority,
        })
    }

    #[test]
    fn test_plugins_run_in_priority_order() {
        let chain = EvasionChain::new()
            .with(seg("late", "/late", 90))
            .with(seg("early", "/early", 0))
            .with(seg("mid_a", "/a", 50))
            .with(seg("mid_b", "/b", 50));
        assert_eq!(chain.names(), vec!["early", "mid_a", "mid_b", "late"]);

        let req = HttpRequest::parse("http://www.example.com/x").unwrap();
        let out = chain.apply(&req);
        assert_eq!(out.path(), "/x/early/a/b/late");
        assert_eq!(req.path(), "/x");
    }

    #[test]
    fn test_out_of_range_priority_is_clamped() {
        let chain = EvasionChain::new()
            .with(seg("huge", "/h", 200))
            .with(seg("last", "/l", 100));
        assert_eq!(chain.names(), vec!["huge", "last"]);
    }

    #[test]
    fn test_empty_chain_returns_equal_copy() {
        let req = HttpRequest::parse("http://www.example.com/x").unwrap();
        assert_eq!(EvasionChain::new().apply(&req), req);
    }

    #[test]
    fn test_full_width_after_early_plugin() {
        let chain = EvasionChain::new()
            .with(Box::new(FullWidthEncode::new()))
            .with(seg("early", "b", 10));
        let req = HttpRequest::parse("http://www.example.com/a").unwrap();
        assert_eq!(chain.apply(&req).path(), "/%uFF41%uFF42");
    }
}
