//! 版权风险分析策略。
//!
//! 所有策略产出同样结构的 [`AnalysisRecord`]，处理器不关心结果来源。

pub mod fingerprint;
pub mod scoring;
pub mod synthetic;

pub use fingerprint::FingerprintStrategy;
pub use synthetic::SyntheticStrategy;

use crate::{
    config::{AnalysisStrategyKind, Config},
    error::{AppError, AppResult},
    file_processing::ProcessedAudio,
    models::AnalysisRecord,
    services::fingerprint_client::FingerprintClient,
};
use async_trait::async_trait;
use std::sync::Arc;

/// 分析策略
#[async_trait]
pub trait AnalysisStrategy: std::fmt::Debug + Send + Sync {
    /// 策略名称（用于日志与健康检查）
    fn name(&self) -> &'static str;

    /// 将单个文件与参考库比对
    async fn scan(&self, sample: &ProcessedAudio) -> AppResult<AnalysisRecord>;

    /// 两个文件直接对比，唯一匹配指向对比文件
    async fn compare(
        &self,
        original: &ProcessedAudio,
        comparison: &ProcessedAudio,
        comparison_url: &str,
    ) -> AppResult<AnalysisRecord>;
}

/// 按配置构建分析策略
pub fn build_strategy(config: &Config) -> AppResult<Arc<dyn AnalysisStrategy>> {
    match config.analysis.strategy {
        AnalysisStrategyKind::Synthetic => Ok(Arc::new(SyntheticStrategy::new())),
        AnalysisStrategyKind::Fingerprint => {
            let fp_config = config.fingerprint.as_ref().ok_or_else(|| {
                AppError::config("analysis.strategy = \"fingerprint\" 需要配置 [fingerprint]")
            })?;
            let client = FingerprintClient::new(fp_config.clone())?;
            Ok(Arc::new(FingerprintStrategy::new(Arc::new(client))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FingerprintConfig;

    #[test]
    fn test_build_default_strategy() {
        let strategy = build_strategy(&Config::default()).unwrap();
        assert_eq!(strategy.name(), "synthetic");
    }

    #[test]
    fn test_build_fingerprint_strategy() {
        let mut config = Config::default();
        config.analysis.strategy = AnalysisStrategyKind::Fingerprint;
        assert!(build_strategy(&config).is_err());

        config.fingerprint = Some(FingerprintConfig {
            access_key: "key".to_string(),
            access_secret: "secret".to_string(),
            ..Default::default()
        });
        let strategy = build_strategy(&config).unwrap();
        assert_eq!(strategy.name(), "fingerprint");
    }
}
