mod adapter;
mod json_path;
mod request;
mod response;

pub use adapter::{Incoming, SentValue, TestAdapter};
pub use json_path::{resolve_path, tokenize_path, PathToken};
pub use request::TestRequest;
pub use response::{ResponseHandle, TestResponse};
