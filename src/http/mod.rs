//! HTTP模型：不可变请求、响应与表单识别
pub mod form;
pub mod request;
pub mod response;

pub use self::form::{is_url_encoded_form, BodyKind};
pub use self::request::HttpRequest;
pub use self::response::{HttpResponse, ResponseId};
