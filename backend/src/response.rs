use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 统一错误响应体
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// 错误描述
    pub error: String,
}

/// 带状态码的错误响应
#[derive(Debug)]
pub struct ErrorResponse {
    pub code: i32,
    pub body: ErrorBody,
}

impl ErrorResponse {
    pub fn new(code: i32, error: String) -> Self {
        Self {
            code,
            body: ErrorBody { error },
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (ResponseCode::status(self.code), Json(self.body)).into_response()
    }
}

/// 业务响应码常量
pub struct ResponseCode;

impl ResponseCode {
    /// 成功响应码
    pub const SUCCESS: i32 = 200;
    pub const CREATED: i32 = 201;
    pub const ACCEPTED: i32 = 202;

    /// 客户端错误 4xx
    pub const BAD_REQUEST: i32 = 400;
    pub const NOT_FOUND: i32 = 404;
    pub const FILE_TOO_LARGE: i32 = 413;
    pub const UNSUPPORTED_FILE_TYPE: i32 = 415;

    /// 服务器错误 5xx
    pub const INTERNAL_ERROR: i32 = 500;
}

impl ResponseCode {
    /// 业务响应码对应的HTTP状态码
    pub fn status(code: i32) -> StatusCode {
        match code {
            Self::SUCCESS => StatusCode::OK,
            Self::CREATED => StatusCode::CREATED,
            Self::ACCEPTED => StatusCode::ACCEPTED,
            Self::BAD_REQUEST => StatusCode::BAD_REQUEST,
            Self::NOT_FOUND => StatusCode::NOT_FOUND,
            Self::FILE_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UNSUPPORTED_FILE_TYPE => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 响应码对应的默认消息
    pub fn get_message(code: i32) -> &'static str {
        match code {
            Self::SUCCESS => "OK",
            Self::CREATED => "Created",
            Self::ACCEPTED => "Accepted",
            Self::BAD_REQUEST => "Bad request",
            Self::NOT_FOUND => "Not found",
            Self::FILE_TOO_LARGE => "File too large",
            Self::UNSUPPORTED_FILE_TYPE => "Unsupported file type",
            Self::INTERNAL_ERROR => "Internal server error",
            _ => "Unknown error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_shape() {
        let response = ErrorResponse::new(400, "Missing audio file".to_string());
        let json = serde_json::to_value(&response.body).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Missing audio file" }));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ResponseCode::status(413), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(ResponseCode::status(415), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(ResponseCode::status(999), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_response_code_message() {
        assert_eq!(ResponseCode::get_message(404), "Not found");
        assert_eq!(ResponseCode::get_message(999), "Unknown error");
    }
}
