//! HTTP响应抽象：内容类型判定 + 响应体 + 唯一ID

use std::borrow::Cow;

use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use url::Url;

/// 响应唯一标识（由传输层分配）
pub type ResponseId = u64;

#[derive(Debug, Clone)]
pub struct HttpResponse {
    id: ResponseId,
    url: Url,
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl HttpResponse {
    pub fn new(
        id: ResponseId,
        url: Url,
        status: StatusCode,
        headers: HeaderMap,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id,
            url,
            status,
            headers,
            body: body.into(),
        }
    }

    /// 从原始字节构建，非UTF-8内容按lossy方式解码
    pub fn from_bytes(
        id: ResponseId,
        url: Url,
        status: StatusCode,
        headers: HeaderMap,
        body: &[u8],
    ) -> Self {
        let body = match String::from_utf8_lossy(body) {
            Cow::Borrowed(s) => s.to_string(),
            Cow::Owned(s) => s,
        };
        Self::new(id, url, status, headers, body)
    }

    /// 200 + text/html 的便捷构造
    pub fn html(id: ResponseId, url: Url, body: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
        Self::new(id, url, StatusCode::OK, headers, body)
    }

    pub fn id(&self) -> ResponseId {
        self.id
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Content-Type 含 text 或 html 即视为文本响应；无Content-Type不扫描
    pub fn is_text_or_html(&self) -> bool {
        self.content_type()
            .map(|ct| {
                let ct = ct.to_ascii_lowercase();
                ct.contains("text") || ct.contains("html")
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_content_type(ct: &str) -> HttpResponse {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(ct).unwrap());
        HttpResponse::new(
            7,
            Url::parse("http://www.example.com/").unwrap(),
            StatusCode::OK,
            headers,
            "body",
        )
    }

    #[test]
    fn test_text_or_html_classification() {
        assert!(with_content_type("text/html").is_text_or_html());
        assert!(with_content_type("TEXT/plain; charset=utf-8").is_text_or_html());
        assert!(with_content_type("application/xhtml+xml").is_text_or_html());
        assert!(!with_content_type("image/png").is_text_or_html());
        assert!(!with_content_type("application/octet-stream").is_text_or_html());
    }

    #[test]
    fn test_missing_content_type_is_not_text() {
        let resp = HttpResponse::new(
            1,
            Url::parse("http://www.example.com/").unwrap(),
            StatusCode::OK,
            HeaderMap::new(),
            "<html></html>",
        );
        assert!(!resp.is_text_or_html());
    }

    #[test]
    fn test_from_bytes_is_lossy() {
        let resp = HttpResponse::from_bytes(
            2,
            Url::parse("http://www.example.com/").unwrap(),
            StatusCode::OK,
            HeaderMap::new(),
            b"ok\xffok",
        );
        assert_eq!(resp.body(), "ok\u{fffd}ok");
        assert_eq!(resp.id(), 2);
    }
}
