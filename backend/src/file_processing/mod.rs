pub mod analyzer;
pub mod hasher;
pub mod validator;

pub use analyzer::AudioAnalyzer;
pub use hasher::FileHasher;
pub use validator::FileValidator;

use crate::error::AppResult;
use bytes::Bytes;

/// 处理后的音频文件
#[derive(Debug, Clone)]
pub struct ProcessedAudio {
    /// 文件名
    pub file_name: String,
    /// 文件大小（字节）
    pub size: u64,
    /// 识别出的音频MIME类型
    pub mime_type: String,
    /// SHA256哈希值
    pub sha256: String,
    /// 原始数据
    pub data: Bytes,
}

/// 文件处理配置
#[derive(Debug, Clone)]
pub struct FileProcessingConfig {
    /// 最大文件大小（字节）
    pub max_file_size: u64,
    /// 最大文件名长度
    pub max_filename_len: usize,
}

impl Default for FileProcessingConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024, // 50MB
            max_filename_len: 255,
        }
    }
}

impl FileProcessingConfig {
    pub fn with_max_size(max_file_size: u64) -> Self {
        Self {
            max_file_size,
            ..Default::default()
        }
    }
}

/// 音频处理器主接口：验证 -> 类型识别 -> 哈希
#[derive(Debug, Clone)]
pub struct AudioProcessor {
    analyzer: AudioAnalyzer,
    hasher: FileHasher,
    validator: FileValidator,
}

impl AudioProcessor {
    /// 创建新的音频处理器
    pub fn new(config: FileProcessingConfig) -> Self {
        Self {
            analyzer: AudioAnalyzer::new(),
            hasher: FileHasher::new(),
            validator: FileValidator::new(&config),
        }
    }

    /// 处理单个上传的音频文件
    pub async fn process(
        &self,
        data: Bytes,
        file_name: &str,
        declared_type: Option<&str>,
    ) -> AppResult<ProcessedAudio> {
        // 1. 验证文件
        self.validator.validate_file(&data, file_name)?;

        // 2. 识别音频类型，非音频直接拒绝
        let mime_type = self
            .analyzer
            .detect_audio_mime(&data, file_name, declared_type)?;

        // 3. 计算哈希
        let sha256 = self.hasher.calculate_sha256_async(data.clone()).await?;

        tracing::debug!(
            file_name,
            size = data.len(),
            mime_type = %mime_type,
            "音频文件处理完成"
        );

        Ok(ProcessedAudio {
            file_name: file_name.to_string(),
            size: data.len() as u64,
            mime_type,
            sha256,
            data,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_process_wav() {
        let processor = AudioProcessor::new(FileProcessingConfig::default());
        let data = Bytes::from(test_support::wav_bytes(4096));

        let audio = processor.process(data, "demo.wav", None).await.unwrap();
        assert_eq!(audio.mime_type, "audio/x-wav");
        assert_eq!(audio.size, 4096);
        assert_eq!(audio.sha256.len(), 64);
    }

    #[tokio::test]
    async fn test_process_rejects_oversized() {
        let processor = AudioProcessor::new(FileProcessingConfig::with_max_size(1024));
        let data = Bytes::from(test_support::wav_bytes(2048));

        let err = processor.process(data, "big.wav", None).await.unwrap_err();
        assert!(matches!(err, AppError::FileTooLarge { max_size: 1024 }));
    }

    #[tokio::test]
    async fn test_process_rejects_non_audio() {
        let processor = AudioProcessor::new(FileProcessingConfig::default());
        let data = Bytes::from_static(b"just some plain text, definitely not audio");

        let err = processor
            .process(data, "notes.txt", Some("text/plain"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFileType { .. }));
    }
}
