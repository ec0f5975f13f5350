use crate::{
    error::{AppError, AppResult},
    models::{AnalysisRecord, AnalysisType},
    services::{
        llm::{GenerationRequest, TextGenerator},
        prompts,
    },
};
use std::sync::Arc;
use tracing::{debug, warn};

/// 分析报告生成器
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl ReportGenerator {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    /// 是否已配置生成式文本服务
    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    /// 生成报告，失败时返回错误
    pub async fn generate(
        &self,
        record: &AnalysisRecord,
        analysis_type: AnalysisType,
        file_names: &[String],
    ) -> AppResult<String> {
        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| AppError::service_unavailable("生成式文本服务未配置"))?;

        let request = GenerationRequest::prompt(prompts::report_prompt(
            record,
            analysis_type,
            file_names,
        ))
        .with_system(prompts::REPORT_SYSTEM_PROMPT);

        debug!(
            provider = generator.name(),
            model = generator.model(),
            analysis_type = analysis_type.as_str(),
            "生成分析报告"
        );

        generator
            .generate(&request)
            .await
            .map_err(|e| AppError::upstream(generator.name(), e.to_string()))
    }

    /// 生成报告，失败时使用模板摘要
    pub async fn generate_or_fallback(
        &self,
        record: &AnalysisRecord,
        analysis_type: AnalysisType,
        file_names: &[String],
    ) -> String {
        if !self.is_configured() {
            return fallback_report(record, analysis_type, file_names);
        }

        match self.generate(record, analysis_type, file_names).await {
            Ok(text) => text,
            Err(e) => {
                warn!("生成分析报告失败，使用模板摘要: {}", e);
                fallback_report(record, analysis_type, file_names)
            }
        }
    }
}

/// 模板摘要
pub fn fallback_report(
    record: &AnalysisRecord,
    analysis_type: AnalysisType,
    file_names: &[String],
) -> String {
    let overview = &record.overview;
    let mut report = String::new();

    let subject = if file_names.is_empty() {
        "the uploaded track".to_string()
    } else {
        file_names.join(" vs ")
    };
    let kind = match analysis_type {
        AnalysisType::DatabaseScan => "Database scan",
        AnalysisType::DirectComparison => "Direct comparison",
    };

    report.push_str(&format!("{} of {}.\n", kind, subject));
    report.push_str(&format!(
        "Overall copyright risk is {} ({}/100) with {}% similarity to known material.\n",
        overview.risk_level, overview.risk_score, overview.similarity
    ));
    report.push_str(&format!(
        "AI detection: {} ({}% confidence).\n",
        record.ai_detection.likelihood.as_str(),
        record.ai_detection.confidence
    ));

    match record.top_match() {
        Some(m) => {
            report.push_str(&format!(
                "Closest match: \"{}\" by {} at {}% similarity.",
                m.title, m.artist, m.similarity
            ));
        }
        None => {
            report.push_str("No matching reference tracks were found.");
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::analysis::scoring::zero_match_record;
    use crate::services::analysis::synthetic::synthesize_scan;
    use crate::services::llm::{LlmError, TextStream};
    use async_trait::async_trait;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[derive(Debug)]
    struct FixedGenerator(Result<&'static str, u16>);

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        fn name(&self) -> &str {
            "fixed"
        }

        fn model(&self) -> &str {
            "fixed-1"
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<String, LlmError> {
            match self.0 {
                Ok(text) => Ok(text.to_string()),
                Err(status) => Err(LlmError::Api {
                    status,
                    message: "boom".to_string(),
                }),
            }
        }

        async fn stream(&self, _request: &GenerationRequest) -> Result<TextStream, LlmError> {
            Err(LlmError::EmptyResponse)
        }
    }

    fn record() -> AnalysisRecord {
        synthesize_scan(&mut StdRng::seed_from_u64(3))
    }

    #[tokio::test]
    async fn test_generate_returns_model_text() {
        let generator = ReportGenerator::new(Some(Arc::new(FixedGenerator(Ok("Report body")))));
        let text = generator
            .generate(&record(), AnalysisType::DatabaseScan, &[])
            .await
            .unwrap();
        assert_eq!(text, "Report body");
    }

    #[tokio::test]
    async fn test_generate_surfaces_errors() {
        let generator = ReportGenerator::new(Some(Arc::new(FixedGenerator(Err(503)))));
        let err = generator
            .generate(&record(), AnalysisType::DatabaseScan, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Upstream { .. }));

        let unconfigured = ReportGenerator::new(None);
        assert!(
            unconfigured
                .generate(&record(), AnalysisType::DatabaseScan, &[])
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_fallback_on_failure() {
        let generator = ReportGenerator::new(Some(Arc::new(FixedGenerator(Err(500)))));
        let record = record();
        let text = generator
            .generate_or_fallback(&record, AnalysisType::DatabaseScan, &["a.wav".to_string()])
            .await;

        assert!(text.starts_with("Database scan of a.wav."));
        assert!(text.contains(record.overview.risk_level.as_str()));
    }

    #[test]
    fn test_fallback_without_matches() {
        let record = zero_match_record(&mut StdRng::seed_from_u64(8));
        let text = fallback_report(
            &record,
            AnalysisType::DirectComparison,
            &["a.wav".to_string(), "b.wav".to_string()],
        );
        assert!(text.starts_with("Direct comparison of a.wav vs b.wav."));
        assert!(text.contains("No matching reference tracks"));
    }
}
