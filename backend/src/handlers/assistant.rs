use super::AppState;
use crate::{
    error::{AppError, AppResult},
    models::{
        BrainstormRequest, ChatRequest, EnhancePromptRequest, EnhancePromptResponse,
        FeedbackRequest, FeedbackResponse, ReportRequest, ReportResponse,
    },
    services::chat_stream,
};
use axum::{
    Json,
    body::Body,
    extract::{State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

/// 反馈内容最大长度（字符）
const MAX_FEEDBACK_LEN: usize = 5000;

/// 由已有分析结果生成报告
#[utoipa::path(
    post,
    path = "/api/report",
    tag = "assistant",
    request_body = ReportRequest,
    responses(
        (status = 200, description = "生成成功", body = ReportResponse),
        (status = 400, description = "请求体无效", body = ErrorBody),
        (status = 500, description = "生成失败或未配置", body = ErrorBody)
    )
)]
pub async fn generate_report(
    State(state): State<AppState>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> AppResult<Json<ReportResponse>> {
    let Json(request) = payload?;

    let report_text = state
        .report_generator
        .generate(
            &request.analysis_data,
            request.analysis_type,
            &request.file_names,
        )
        .await?;

    Ok(Json(ReportResponse { report_text }))
}

/// 流式对话，响应为 text/plain 分块输出
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "assistant",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "流式文本", content_type = "text/plain", body = String),
        (status = 400, description = "请求体无效", body = ErrorBody),
        (status = 500, description = "生成失败或未配置", body = ErrorBody)
    )
)]
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(request) = payload?;

    let upstream = state.assistant.chat(request).await?;
    let body = Body::from_stream(chat_stream::relay(
        upstream,
        chat_stream::DEFAULT_CHANNEL_CAPACITY,
    ));

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            ),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
        ],
        body,
    )
        .into_response())
}

/// 创意头脑风暴
#[utoipa::path(
    post,
    path = "/api/brainstorm",
    tag = "assistant",
    request_body = BrainstormRequest,
    responses(
        (status = 200, description = "创意列表", body = Vec<String>),
        (status = 400, description = "请求体无效", body = ErrorBody),
        (status = 500, description = "生成失败或未配置", body = ErrorBody)
    )
)]
pub async fn brainstorm(
    State(state): State<AppState>,
    payload: Result<Json<BrainstormRequest>, JsonRejection>,
) -> AppResult<Json<Vec<String>>> {
    let Json(request) = payload?;
    let ideas = state.assistant.brainstorm(request).await?;
    Ok(Json(ideas))
}

/// 优化音乐生成提示词
#[utoipa::path(
    post,
    path = "/api/enhance-prompt",
    tag = "assistant",
    request_body = EnhancePromptRequest,
    responses(
        (status = 200, description = "优化结果", body = EnhancePromptResponse),
        (status = 400, description = "请求体无效", body = ErrorBody),
        (status = 500, description = "生成失败或未配置", body = ErrorBody)
    )
)]
pub async fn enhance_prompt(
    State(state): State<AppState>,
    payload: Result<Json<EnhancePromptRequest>, JsonRejection>,
) -> AppResult<Json<EnhancePromptResponse>> {
    let Json(request) = payload?;
    let enhanced_prompt = state.assistant.enhance_prompt(request).await?;
    Ok(Json(EnhancePromptResponse { enhanced_prompt }))
}

/// 提交反馈，只记录日志
#[utoipa::path(
    post,
    path = "/api/feedback",
    tag = "assistant",
    request_body = FeedbackRequest,
    responses(
        (status = 202, description = "已接收", body = FeedbackResponse),
        (status = 400, description = "请求体无效", body = ErrorBody)
    )
)]
pub async fn submit_feedback(
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<FeedbackResponse>)> {
    let Json(feedback) = payload?;

    let message = feedback.message.trim();
    if message.is_empty() {
        return Err(AppError::validation("message is required"));
    }
    if message.chars().count() > MAX_FEEDBACK_LEN {
        return Err(AppError::validation(format!(
            "message must be at most {} characters",
            MAX_FEEDBACK_LEN
        )));
    }
    if let Some(rating) = feedback.rating {
        if !(1..=5).contains(&rating) {
            return Err(AppError::validation("rating must be between 1 and 5"));
        }
    }

    tracing::info!(
        category = feedback.category.as_deref().unwrap_or("general"),
        page = feedback.page.as_deref().unwrap_or("-"),
        rating = feedback.rating,
        has_email = feedback.email.is_some(),
        feedback = message,
        "收到用户反馈"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(FeedbackResponse { received: true }),
    ))
}
