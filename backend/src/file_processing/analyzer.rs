use crate::error::{AppError, AppResult};
use std::path::Path;

/// 扩展名到音频MIME类型的兜底映射
const AUDIO_EXTENSIONS: &[(&str, &str)] = &[
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("flac", "audio/flac"),
    ("ogg", "audio/ogg"),
    ("oga", "audio/ogg"),
    ("opus", "audio/opus"),
    ("m4a", "audio/mp4"),
    ("aac", "audio/aac"),
    ("aiff", "audio/aiff"),
    ("aif", "audio/aiff"),
    ("webm", "audio/webm"),
];

/// 音频类型分析器
#[derive(Debug, Clone, Default)]
pub struct AudioAnalyzer;

impl AudioAnalyzer {
    /// 创建新的音频分析器
    pub fn new() -> Self {
        Self
    }

    /// 识别音频MIME类型
    ///
    /// 文件头判定为音频即通过校验；客户端声明了 audio/* 时保存声明的类型，
    /// 否则使用文件头类型。文件头无法判定时依次回退到声明类型、扩展名，全部失败则拒绝。
    pub fn detect_audio_mime(
        &self,
        data: &[u8],
        file_name: &str,
        declared_type: Option<&str>,
    ) -> AppResult<String> {
        let declared_audio = declared_type
            .map(str::trim)
            .filter(|declared| declared.starts_with("audio/"));

        // 使用infer库检测文件头
        let sniffed = infer::get(data);
        if let Some(kind) = sniffed {
            if kind.matcher_type() == infer::MatcherType::Audio {
                return Ok(declared_audio.unwrap_or(kind.mime_type()).to_string());
            }
        }

        if let Some(declared) = declared_audio {
            return Ok(declared.to_string());
        }

        if let Some(mime) =
            Self::extract_extension(file_name).and_then(|ext| Self::mime_for_extension(&ext))
        {
            // 浏览器录音常见 video/webm 容器，只要扩展名是音频就接受
            return Ok(mime.to_string());
        }

        let detected = sniffed
            .map(|kind| kind.mime_type().to_string())
            .or_else(|| declared_type.map(|s| s.to_string()))
            .unwrap_or_else(|| "application/octet-stream".to_string());
        Err(AppError::unsupported_file_type(detected))
    }

    /// 扩展名对应的音频MIME类型
    pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
        AUDIO_EXTENSIONS
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, mime)| *mime)
    }

    /// 提取文件扩展名（小写）
    pub fn extract_extension(file_name: &str) -> Option<String> {
        Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }
}
