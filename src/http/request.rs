//! 不可变HTTP请求
//! 所有"修改"方法都返回新实例，原请求及其内部URL保持不变
//! Header以Arc共享：变异流水线不修改Header，因此无需复制

use std::sync::Arc;

use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;
use url::Url;

use crate::error::{PluginError, PluginResult};

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    method: Method,
    url: Url,
    body: Arc<[u8]>,
    headers: Arc<HeaderMap>,
    /// 发起方主机（origin request host），原样透传给新请求
    origin_req_host: String,
}

impl HttpRequest {
    /// GET请求，origin主机取自URL
    pub fn new(url: Url) -> Self {
        let origin_req_host = url.host_str().unwrap_or_default().to_string();
        Self {
            method: Method::GET,
            url,
            body: Arc::from(Vec::new()),
            headers: Arc::new(HeaderMap::new()),
            origin_req_host,
        }
    }

    pub fn parse(url: &str) -> PluginResult<Self> {
        Ok(Self::new(Url::parse(url)?))
    }

    /// 由各部分直接组装（Header共享所有权）
    pub fn from_parts(
        method: Method,
        url: Url,
        body: Arc<[u8]>,
        headers: Arc<HeaderMap>,
        origin_req_host: impl Into<String>,
    ) -> Self {
        Self {
            method,
            url,
            body,
            headers,
            origin_req_host: origin_req_host.into(),
        }
    }

    // ===================== 构建方法（消耗self） =====================
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Arc::from(body.into());
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> PluginResult<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| PluginError::config(format!("invalid header name \"{}\": {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| PluginError::config(format!("invalid header value \"{}\": {}", value, e)))?;
        Arc::make_mut(&mut self.headers).append(name, value);
        Ok(self)
    }

    pub fn with_origin_req_host(mut self, host: impl Into<String>) -> Self {
        self.origin_req_host = host.into();
        self
    }

    // ===================== 访问方法 =====================
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// URL路径（已序列化形式，可能含百分号转义）
    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn shared_body(&self) -> Arc<[u8]> {
        Arc::clone(&self.body)
    }

    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn shared_headers(&self) -> Arc<HeaderMap> {
        Arc::clone(&self.headers)
    }

    pub fn origin_req_host(&self) -> &str {
        &self.origin_req_host
    }

    // ===================== 派生新实例 =====================
    /// 替换URL，返回新请求
    pub fn with_url(&self, url: Url) -> Self {
        Self {
            url,
            ..self.copy()
        }
    }

    /// 独立副本（Header/Body共享不可变存储）
    pub fn copy(&self) -> Self {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_request_defaults() {
        let req = HttpRequest::parse("http://www.example.com/a/b?x=1").unwrap();
        assert_eq!(*req.method(), Method::GET);
        assert_eq!(req.path(), "/a/b");
        assert_eq!(req.origin_req_host(), "www.example.com");
        assert!(!req.has_body());
    }

    #[test]
    fn test_with_url_leaves_original_untouched() {
        let req = HttpRequest::parse("http://www.example.com/a").unwrap();
        let before = req.clone();
        let other = req.with_url(Url::parse("http://www.example.com/b").unwrap());
        assert_eq!(req, before);
        assert_eq!(other.path(), "/b");
        assert!(Arc::ptr_eq(&req.shared_headers(), &other.shared_headers()));
    }

    #[test]
    fn test_with_header_rejects_invalid_names() {
        let req = HttpRequest::parse("http://www.example.com/").unwrap();
        assert!(req.clone().with_header("bad header", "x").is_err());
        let req = req.with_header("X-Test", "1").unwrap();
        assert_eq!(req.headers().get("x-test").unwrap(), "1");
    }
}
