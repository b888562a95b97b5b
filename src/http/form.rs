//! URL编码表单识别（application/x-www-form-urlencoded）
//! 仅用于决定请求体是否参与变异；识别失败属于正常降级，不是错误

use once_cell::sync::Lazy;
use regex::bytes::Regex;
use url::form_urlencoded;

/// 表单字符集 + 合法的 %XX 转义
static FORM_BODY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9\-._~!$'()*,;:@/?=&+\[\]]|%[0-9A-Fa-f]{2})+$")
        .expect("form body regex must compile")
});

/// 请求体形态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Empty,
    /// 可解析为URL编码表单
    UrlEncodedForm,
    /// JSON/XML/二进制等其他内容，变异时原样保留
    Opaque,
}

impl BodyKind {
    pub fn classify(body: &[u8]) -> Self {
        if body.is_empty() {
            BodyKind::Empty
        } else if is_url_encoded_form(body) {
            BodyKind::UrlEncodedForm
        } else {
            BodyKind::Opaque
        }
    }
}

/// 字符集合法，且至少有一个键名非空的键值对
pub fn is_url_encoded_form(body: &[u8]) -> bool {
    FORM_BODY_REGEX.is_match(body)
        && form_urlencoded::parse(body).any(|(name, _)| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_forms() {
        assert_eq!(BodyKind::classify(b""), BodyKind::Empty);
        assert_eq!(BodyKind::classify(b"a=1&b=2"), BodyKind::UrlEncodedForm);
        assert_eq!(BodyKind::classify(b"q=hello+world%21"), BodyKind::UrlEncodedForm);
        assert_eq!(BodyKind::classify(b"flag"), BodyKind::UrlEncodedForm);
    }

    #[test]
    fn test_classify_opaque_bodies() {
        assert_eq!(BodyKind::classify(br#"{"a": 1}"#), BodyKind::Opaque);
        assert_eq!(BodyKind::classify(b"<xml/>"), BodyKind::Opaque);
        assert_eq!(BodyKind::classify(b"a=%zz"), BodyKind::Opaque);
        assert_eq!(BodyKind::classify(b"\x00\x01\xff"), BodyKind::Opaque);
        assert_eq!(BodyKind::classify(b"=value&=x"), BodyKind::Opaque);
    }
}
