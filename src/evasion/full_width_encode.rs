//! 全角编码规避插件
//! 变异流水线：路径总是编码；请求体仅当是URL编码表单时编码，否则原样保留
//! 始终构造新请求，原请求（含其URL）不被修改

use std::sync::Arc;

use url::Url;

use crate::config::OptionList;
use crate::encoder::FullWidthEncoder;
use crate::error::PluginResult;
use crate::http::{BodyKind, HttpRequest};
use crate::plugin::{EvasionPlugin, Plugin, DEFAULT_PRIORITY};

/// 请求体变异结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyMutation {
    /// 表单体已编码
    Mutated(String),
    /// 空体或非表单体：尽力而为的降级路径，保留原始字节
    Unchanged,
}

#[derive(Debug, Clone, Default)]
pub struct FullWidthEncode;

impl FullWidthEncode {
    pub const NAME: &'static str = "full_width_encode";

    pub fn new() -> Self {
        Self
    }

    /// 仅替换路径，scheme/host/query/fragment 保持不变
    /// 保护字符写入路径时：`\` 输出为 `%5C`（否则URL层会把它规范为 `/`，改变路径分段），
    /// `?` 由URL层转义为 `%3F`
    pub fn mutate_url(url: &Url) -> Url {
        let encoded = FullWidthEncoder::mutate(url.path()).replace('\\', "%5C");
        let mut new_url = url.clone();
        new_url.set_path(&encoded);
        new_url
    }

    pub fn mutate_body(body: &[u8]) -> BodyMutation {
        match BodyKind::classify(body) {
            BodyKind::UrlEncodedForm => BodyMutation::Mutated(FullWidthEncoder::mutate_bytes(body)),
            BodyKind::Empty => BodyMutation::Unchanged,
            BodyKind::Opaque => {
                log::debug!(
                    "Body is not a url-encoded form, keeping it unchanged | Length: {}",
                    body.len()
                );
                BodyMutation::Unchanged
            }
        }
    }
}

impl Plugin for FullWidthEncode {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn configure(&mut self, _options: &OptionList) -> PluginResult<()> {
        Ok(())
    }

    fn describe(&self) -> OptionList {
        OptionList::new()
    }

    fn long_description(&self) -> &'static str {
        "This evasion plugin does full width encoding as described here:\n    \
         - http://www.kb.cert.org/vuls/id/739224\n\n\
         Example:\n    \
         Input:      '/bar/foo.asp'\n    \
         Output :    '/%uFF42%uFF41%uFF52/%uFF46%uFF4f%uFF4f%uFF0e%uFF41%uFF53%uFF50'"
    }
}

impl EvasionPlugin for FullWidthEncode {
    fn mutate_request(&self, request: &HttpRequest) -> HttpRequest {
        let new_url = Self::mutate_url(request.url());

        let body: Arc<[u8]> = match Self::mutate_body(request.body()) {
            BodyMutation::Mutated(encoded) => Arc::from(encoded.into_bytes()),
            BodyMutation::Unchanged => request.shared_body(),
        };

        HttpRequest::from_parts(
            request.method().clone(),
            new_url,
            body,
            request.shared_headers(),
            request.origin_req_host(),
        )
    }

    fn priority(&self) -> u8 {
        DEFAULT_PRIORITY
    }
}
