//! 生成式文本服务。

pub mod gemini;
pub mod provider;

pub use gemini::GeminiClient;
pub use provider::{GenerationRequest, LlmError, TextGenerator, TextStream};

use crate::config::Config;
use std::sync::Arc;

/// 按配置构建文本生成器，未启用时返回 None
pub fn build_generator(config: &Config) -> Result<Option<Arc<dyn TextGenerator>>, LlmError> {
    match config.enabled_llm() {
        Some(llm) => {
            let client = GeminiClient::new(llm)?;
            tracing::info!(model = %llm.model, "已启用生成式文本服务");
            Ok(Some(Arc::new(client)))
        }
        None => {
            tracing::info!("未配置生成式文本服务，报告将使用模板摘要");
            Ok(None)
        }
    }
}
