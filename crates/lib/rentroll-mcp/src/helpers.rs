use std::borrow::Cow;

use rentroll_core::control::{DispatchError, ErrorKind};
use rmcp::ErrorData;
use rmcp::model::ErrorCode;
use serde_json::{Value, json};

pub(crate) fn mcp_err(
    code: ErrorCode,
    message: impl Into<Cow<'static, str>>,
    data: Option<Value>,
) -> ErrorData {
    ErrorData {
        code,
        message: message.into(),
        data,
    }
}

/// `{kind, detail}` object attached to every error surfaced to callers.
pub(crate) fn error_body(kind: ErrorKind, detail: &str) -> Value {
    json!({
        "kind": kind.as_str(),
        "detail": detail,
    })
}

pub(crate) fn map_dispatch_err(err: &DispatchError) -> ErrorData {
    let code = match err.kind() {
        ErrorKind::UnknownOperation => ErrorCode::METHOD_NOT_FOUND,
        ErrorKind::InvalidArgument => ErrorCode::INVALID_PARAMS,
        ErrorKind::QueryError | ErrorKind::IntegrityError | ErrorKind::IoError => {
            ErrorCode::INTERNAL_ERROR
        }
    };
    let detail = err.detail();
    mcp_err(code, detail.clone(), Some(error_body(err.kind(), &detail)))
}
