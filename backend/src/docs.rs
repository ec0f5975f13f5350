use crate::{
    handlers::health::{HealthDetails, HealthResponse},
    models::{
        AiDetection, AiLikelihood, AnalysisRecord, AnalysisResponse, AnalysisType,
        AssistantContext, AudioUploadResponse, BrainstormRequest, CatalogEntry, ChatMessage,
        ChatRequest, ChatRole, CreateShareRequest, CreateShareResponse, EnhancePromptRequest,
        EnhancePromptResponse, FeedbackRequest, FeedbackResponse, FingerprintMatch,
        Fingerprinting, Overview, ReportRequest, ReportResponse, RiskLevel, SharedAnalysis,
        StemBreakdown, TimelinePoint,
    },
    response::ErrorBody,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        // 分析API
        crate::handlers::analysis::analyze,
        crate::handlers::analysis::compare,
        // 分享API
        crate::handlers::share::create_share,
        crate::handlers::share::get_analysis,
        // 音频API
        crate::handlers::audio::upload_audio,
        crate::handlers::audio::get_audio,
        // 助手API
        crate::handlers::assistant::generate_report,
        crate::handlers::assistant::chat,
        crate::handlers::assistant::brainstorm,
        crate::handlers::assistant::enhance_prompt,
        crate::handlers::assistant::submit_feedback,
        // 曲库API
        crate::handlers::catalog::submit_to_catalog,
        crate::handlers::catalog::list_catalog,
    ),
    components(
        schemas(
            AnalysisRecord,
            Overview,
            AiDetection,
            AiLikelihood,
            FingerprintMatch,
            Fingerprinting,
            StemBreakdown,
            TimelinePoint,
            RiskLevel,
            AnalysisType,
            AnalysisResponse,
            SharedAnalysis,
            CreateShareRequest,
            CreateShareResponse,
            AudioUploadResponse,
            CatalogEntry,
            ChatRole,
            ChatMessage,
            AssistantContext,
            ChatRequest,
            ReportRequest,
            ReportResponse,
            BrainstormRequest,
            EnhancePromptRequest,
            EnhancePromptResponse,
            FeedbackRequest,
            FeedbackResponse,
            HealthResponse,
            HealthDetails,
            ErrorBody,
        )
    ),
    tags(
        (name = "analysis", description = "音频版权风险扫描与直接对比"),
        (name = "share", description = "分析结果的保存与分享链接"),
        (name = "audio", description = "原始音频的上传与获取"),
        (name = "assistant", description = "报告生成、创作助手与用户反馈"),
        (name = "catalog", description = "已清权曲库的提交与浏览"),
        (name = "system", description = "系统健康状态")
    ),
    info(
        title = "TuneShield API",
        version = "1.0.0",
        description = "TuneShield 音乐版权风险分析服务 REST API 文档"
    ),
    servers(
        (url = "http://localhost:8080", description = "开发环境")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_all_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/api/health",
            "/api/analyze",
            "/api/compare",
            "/api/share",
            "/api/analysis/{id}",
            "/api/audio",
            "/api/audio/{id}",
            "/api/report",
            "/api/chat",
            "/api/brainstorm",
            "/api/enhance-prompt",
            "/api/feedback",
            "/api/catalog",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing path {}",
                expected
            );
        }
    }
}
