use crate::{
    config::CorsConfig,
    docs::ApiDoc,
    handlers::{
        AppState, analyze, brainstorm, chat, compare, create_share, enhance_prompt,
        generate_report, get_analysis, get_audio, health_check, list_catalog, submit_feedback,
        submit_to_catalog, upload_audio,
    },
};
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

/// 创建API路由
pub fn create_api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health_check))
        // 分析
        .route("/api/analyze", post(analyze))
        .route("/api/compare", post(compare))
        // 分享与结果查询
        .route("/api/share", post(create_share))
        .route("/api/analysis/{id}", get(get_analysis))
        // 原始音频
        .route("/api/audio", post(upload_audio))
        .route("/api/audio/{id}", get(get_audio))
        // 助手
        .route("/api/report", post(generate_report))
        .route("/api/chat", post(chat))
        .route("/api/brainstorm", post(brainstorm))
        .route("/api/enhance-prompt", post(enhance_prompt))
        .route("/api/feedback", post(submit_feedback))
        // 曲库
        .route("/api/catalog", post(submit_to_catalog).get(list_catalog))
}

/// 组装完整应用：业务路由、OpenAPI文档、请求体限制、CORS与请求日志
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.body_limit();
    let cors = cors_layer(&state.config.cors);

    Router::new()
        // OpenAPI JSON 路由
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .merge(create_api_routes())
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// 仅允许配置中的来源
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("忽略无效的CORS来源: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}
