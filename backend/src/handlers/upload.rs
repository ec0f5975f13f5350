use crate::error::{AppError, AppResult};
use axum::{
    extract::{Multipart, multipart::MultipartError},
    http::StatusCode,
};
use bytes::{Bytes, BytesMut};
use std::collections::HashMap;

/// multipart 中的文件字段
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// 解析后的 multipart 表单
#[derive(Debug, Default)]
pub struct UploadForm {
    files: HashMap<String, UploadedFile>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    /// 读取全部字段，单个文件超过 max_file_size 时立即中止
    pub async fn read(multipart: &mut Multipart, max_file_size: u64) -> AppResult<Self> {
        let mut form = UploadForm::default();

        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(e, max_file_size))?
        {
            let Some(name) = field.name().map(|s| s.to_string()) else {
                continue;
            };

            match field.file_name().map(|s| s.to_string()) {
                Some(file_name) => {
                    let content_type = field.content_type().map(|s| s.to_string());
                    let mut buffer = BytesMut::new();
                    while let Some(chunk) = field
                        .chunk()
                        .await
                        .map_err(|e| multipart_error(e, max_file_size))?
                    {
                        if (buffer.len() + chunk.len()) as u64 > max_file_size {
                            return Err(AppError::file_too_large(max_file_size));
                        }
                        buffer.extend_from_slice(&chunk);
                    }

                    // 缺失文件名时使用字段名，类型识别会回退到文件头
                    let file_name = if file_name.trim().is_empty() {
                        name.clone()
                    } else {
                        file_name
                    };

                    tracing::debug!(
                        field = %name,
                        file_name = %file_name,
                        size = buffer.len(),
                        "接收上传文件"
                    );
                    form.files.insert(
                        name,
                        UploadedFile {
                            file_name,
                            content_type,
                            data: buffer.freeze(),
                        },
                    );
                }
                None => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| multipart_error(e, max_file_size))?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// 按别名顺序取出第一个存在的文件字段
    pub fn take_file(&mut self, names: &[&str]) -> Option<UploadedFile> {
        names.iter().find_map(|name| self.files.remove(*name))
    }

    /// 取出必填文件字段，缺失时返回400
    pub fn require_file(&mut self, names: &[&str]) -> AppResult<UploadedFile> {
        self.take_file(names).ok_or_else(|| {
            AppError::bad_request(format!(
                "Missing required file field '{}'",
                names.first().copied().unwrap_or("file")
            ))
        })
    }

    /// 非空文本字段（已去除首尾空白）
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// 必填文本字段
    pub fn require_text(&self, name: &str) -> AppResult<String> {
        self.text(name)
            .map(|v| v.to_string())
            .ok_or_else(|| AppError::bad_request(format!("Missing required field '{}'", name)))
    }
}

/// 请求体超过上限时返回413，其余解析错误返回400
fn multipart_error(error: MultipartError, max_file_size: u64) -> AppError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::file_too_large(max_file_size)
    } else {
        AppError::bad_request(format!("Invalid multipart body: {}", error.body_text()))
    }
}
