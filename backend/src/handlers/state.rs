use crate::{
    config::Config,
    error::{AppError, AppResult},
    file_processing::{AudioProcessor, FileProcessingConfig},
    models::{AudioBlob, CatalogEntry, SharedAnalysis},
    services::{
        AnalysisStrategy, Assistant, ReportGenerator, TextGenerator, build_generator,
        build_strategy,
    },
    storage::{KeyValueStore, MemoryStore},
};
use std::sync::Arc;

/// 应用状态
#[derive(Debug, Clone)]
pub struct AppState {
    /// 分析结果与分享链接
    pub analyses: Arc<dyn KeyValueStore<SharedAnalysis>>,
    pub catalog: Arc<dyn KeyValueStore<CatalogEntry>>,
    pub audio: Arc<dyn KeyValueStore<AudioBlob>>,
    pub strategy: Arc<dyn AnalysisStrategy>,
    pub report_generator: ReportGenerator,
    pub assistant: Assistant,
    pub audio_processor: AudioProcessor,
    pub config: Arc<Config>,
}

impl AppState {
    /// 使用内存存储和给定的策略、文本生成器创建状态
    pub fn new(
        config: Config,
        strategy: Arc<dyn AnalysisStrategy>,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        let audio_processor =
            AudioProcessor::new(FileProcessingConfig::with_max_size(config.file.max_size));

        Self {
            analyses: Arc::new(MemoryStore::new("analyses")),
            catalog: Arc::new(MemoryStore::new("catalog")),
            audio: Arc::new(MemoryStore::new("audio")),
            strategy,
            report_generator: ReportGenerator::new(generator.clone()),
            assistant: Assistant::new(generator),
            audio_processor,
            config: Arc::new(config),
        }
    }

    /// 按配置构建全部依赖
    pub fn from_config(config: Config) -> AppResult<Self> {
        let strategy = build_strategy(&config)?;
        let generator = build_generator(&config)
            .map_err(|e| AppError::config(format!("初始化生成式文本服务失败: {}", e)))?;

        tracing::info!(strategy = strategy.name(), "分析策略已就绪");
        Ok(Self::new(config, strategy, generator))
    }

    /// 单个上传文件的大小上限
    pub fn max_file_size(&self) -> u64 {
        self.config.file.max_size
    }
}
