use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::response::{ErrorResponse, ResponseCode};

/// 应用程序错误类型
#[derive(Error, Debug)]
pub enum AppError {
    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("验证错误: {0}")]
    Validation(String),

    #[error("文件过大: 最大允许大小 {max_size} 字节")]
    FileTooLarge { max_size: u64 },

    #[error("不支持的文件类型: {file_type}")]
    UnsupportedFileType { file_type: String },

    #[error("外部服务错误 ({service}): {message}")]
    Upstream { service: String, message: String },

    #[error("内部错误: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("请求参数错误: {0}")]
    BadRequest(String),

    #[error("资源不存在: {resource}")]
    NotFound { resource: String },
}

impl AppError {
    /// 对外暴露的状态码与错误信息，内部原因不回显给客户端
    fn code_and_message(&self) -> (i32, String) {
        match self {
            AppError::Validation(msg) | AppError::BadRequest(msg) => {
                (ResponseCode::BAD_REQUEST, msg.clone())
            }
            AppError::NotFound { resource } => {
                (ResponseCode::NOT_FOUND, format!("{} not found", resource))
            }
            AppError::FileTooLarge { max_size } => (
                ResponseCode::FILE_TOO_LARGE,
                format!(
                    "File too large, maximum allowed size is {} MB",
                    max_size / 1024 / 1024
                ),
            ),
            AppError::UnsupportedFileType { file_type } => (
                ResponseCode::UNSUPPORTED_FILE_TYPE,
                format!("Unsupported file type: {}", file_type),
            ),
            AppError::Upstream { .. } => (
                ResponseCode::INTERNAL_ERROR,
                "External service request failed".to_string(),
            ),
            AppError::Serialization(_)
            | AppError::Io(_)
            | AppError::Config(_)
            | AppError::Internal(_) => (
                ResponseCode::INTERNAL_ERROR,
                ResponseCode::get_message(ResponseCode::INTERNAL_ERROR).to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = self.code_and_message();

        // 记录错误日志，客户端错误降级为 warn
        if code >= ResponseCode::INTERNAL_ERROR {
            tracing::error!("应用错误: {}", self);
        } else {
            tracing::warn!("请求被拒绝: {}", self);
        }

        ErrorResponse::new(code, message).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::BadRequest(format!("Invalid multipart body: {}", rejection.body_text()))
    }
}

/// 应用程序Result类型别名
pub type AppResult<T> = Result<T, AppError>;

/// 错误构造辅助函数
impl AppError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        Self::Validation(msg.into())
    }

    pub fn bad_request<T: Into<String>>(msg: T) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found<T: Into<String>>(resource: T) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn service_unavailable<T: Into<String>>(msg: T) -> Self {
        Self::Internal(anyhow::anyhow!(msg.into()))
    }

    pub fn upstream<S: Into<String>, T: Into<String>>(service: S, msg: T) -> Self {
        Self::Upstream {
            service: service.into(),
            message: msg.into(),
        }
    }

    pub fn file_too_large(max_size: u64) -> Self {
        Self::FileTooLarge { max_size }
    }

    pub fn unsupported_file_type<T: Into<String>>(file_type: T) -> Self {
        Self::UnsupportedFileType {
            file_type: file_type.into(),
        }
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }
}
