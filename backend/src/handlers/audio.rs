use super::{AppState, analysis::store_audio, upload::UploadForm};
use crate::{
    error::{AppError, AppResult},
    models::{AudioUploadResponse, audio_url},
};
use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

/// 上传音频
///
/// 可选的 analysisId 指向已有分析时，会更新该分析的 audioUrl。
#[utoipa::path(
    post,
    path = "/api/audio",
    tag = "audio",
    request_body(
        content = String,
        content_type = "multipart/form-data",
        description = "音频文件字段 audio（或 file），可选文本字段 analysisId"
    ),
    responses(
        (status = 201, description = "上传成功", body = AudioUploadResponse),
        (status = 400, description = "缺少音频文件", body = ErrorBody),
        (status = 413, description = "文件过大", body = ErrorBody),
        (status = 415, description = "不是音频文件", body = ErrorBody)
    )
)]
pub async fn upload_audio(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<(StatusCode, Json<AudioUploadResponse>)> {
    let mut multipart = multipart?;
    let mut form = UploadForm::read(&mut multipart, state.max_file_size()).await?;
    let upload = form.require_file(&["audio", "file"])?;

    let audio = state
        .audio_processor
        .process(
            upload.data,
            &upload.file_name,
            upload.content_type.as_deref(),
        )
        .await?;

    let audio_id = Uuid::new_v4().to_string();
    store_audio(&state, &audio_id, &audio).await?;
    let url = audio_url(&audio_id);

    if let Some(analysis_id) = form.text("analysisId") {
        match state.analyses.get(analysis_id).await? {
            Some(mut entry) => {
                entry.audio_url = Some(url.clone());
                state.analyses.put(analysis_id, entry).await?;
                tracing::debug!(analysis_id, audio_id = %audio_id, "音频已关联到分析");
            }
            None => {
                tracing::warn!(analysis_id, "关联的分析不存在，仅保存音频");
            }
        }
    }

    tracing::info!(
        audio_id = %audio_id,
        mime_type = %audio.mime_type,
        size = audio.size,
        "音频上传完成"
    );

    Ok((
        StatusCode::CREATED,
        Json(AudioUploadResponse {
            audio_id,
            mime_type: audio.mime_type,
            size: audio.data.len(),
            sha256: audio.sha256,
            url,
        }),
    ))
}

/// 获取原始音频，Content-Type 为上传时保存的类型
#[utoipa::path(
    get,
    path = "/api/audio/{id}",
    tag = "audio",
    params(
        ("id" = String, Path, description = "音频ID")
    ),
    responses(
        (status = 200, description = "音频数据", content_type = "audio/*", body = Vec<u8>),
        (status = 404, description = "音频不存在", body = ErrorBody)
    )
)]
pub async fn get_audio(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let blob = state
        .audio
        .get(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Audio"))?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&blob.mime_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("private, max-age=3600"),
    );
    if let Ok(etag) = HeaderValue::from_str(&format!("\"{}\"", blob.sha256)) {
        headers.insert(header::ETAG, etag);
    }
    let last_modified = blob
        .uploaded_at
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string();
    if let Ok(value) = HeaderValue::from_str(&last_modified) {
        headers.insert(header::LAST_MODIFIED, value);
    }
    // 非ASCII文件名不写入头部
    if blob.file_name.is_ascii() {
        let disposition = format!("inline; filename=\"{}\"", blob.file_name.replace('"', ""));
        if let Ok(value) = HeaderValue::from_str(&disposition) {
            headers.insert(header::CONTENT_DISPOSITION, value);
        }
    }

    Ok((headers, blob.data).into_response())
}
