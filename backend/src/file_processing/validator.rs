use super::FileProcessingConfig;
use crate::error::{AppError, AppResult};

/// 文件验证器
#[derive(Debug, Clone)]
pub struct FileValidator {
    config: FileProcessingConfig,
}

impl FileValidator {
    /// 创建新的文件验证器
    pub fn new(config: &FileProcessingConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// 验证文件是否符合要求
    pub fn validate_file(&self, file_data: &[u8], filename: &str) -> AppResult<()> {
        // 1. 检查文件大小
        self.validate_file_size(file_data)?;

        // 2. 检查文件名
        self.validate_filename(filename)?;

        Ok(())
    }

    /// 验证文件大小
    fn validate_file_size(&self, file_data: &[u8]) -> AppResult<()> {
        let file_size = file_data.len() as u64;

        if file_size == 0 {
            return Err(AppError::validation("Uploaded file is empty"));
        }

        if file_size > self.config.max_file_size {
            return Err(AppError::file_too_large(self.config.max_file_size));
        }

        Ok(())
    }

    /// 验证文件名
    fn validate_filename(&self, filename: &str) -> AppResult<()> {
        if filename.trim().is_empty() {
            return Err(AppError::validation("File name must not be empty"));
        }

        // 检查文件名长度
        if filename.len() > self.config.max_filename_len {
            return Err(AppError::validation(format!(
                "File name too long, at most {} characters",
                self.config.max_filename_len
            )));
        }

        // 路径分隔符与控制字符
        if filename
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_control())
        {
            return Err(AppError::validation("File name contains illegal characters"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> FileProcessingConfig {
        FileProcessingConfig {
            max_file_size: 1024,
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_file_size() {
        let config = create_test_config();
        let validator = FileValidator::new(&config);

        // 测试空文件
        assert!(validator.validate_file_size(&[]).is_err());

        // 测试正常大小
        assert!(validator.validate_file_size(&vec![0; 512]).is_ok());

        // 测试过大文件
        assert!(matches!(
            validator.validate_file_size(&vec![0; 2048]),
            Err(AppError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_filename() {
        let config = create_test_config();
        let validator = FileValidator::new(&config);

        // 测试正常文件名
        assert!(validator.validate_filename("My Song (demo).mp3").is_ok());

        // 测试空文件名
        assert!(validator.validate_filename("  ").is_err());

        // 测试包含非法字符的文件名
        assert!(validator.validate_filename("../etc/passwd").is_err());
        assert!(validator.validate_filename("a\\b.wav").is_err());
        assert!(validator.validate_filename("tab\there.wav").is_err());

        // 测试过长文件名
        assert!(validator.validate_filename(&"a".repeat(300)).is_err());
    }
}
