use crate::error::{AppError, AppResult};
use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod fingerprint;
pub mod llm;

pub use fingerprint::FingerprintConfig;
pub use llm::LlmConfig;

/// 环境变量覆盖：密钥不建议写入配置文件
const ENV_LLM_API_KEY: &str = "TUNESHIELD_LLM_API_KEY";
const ENV_FINGERPRINT_ACCESS_KEY: &str = "TUNESHIELD_FINGERPRINT_ACCESS_KEY";
const ENV_FINGERPRINT_ACCESS_SECRET: &str = "TUNESHIELD_FINGERPRINT_ACCESS_SECRET";

/// 分享链接最长有效期（365天）
pub const MAX_SHARE_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// 应用程序配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub file: FileConfig,
    pub cors: CorsConfig,
    pub analysis: AnalysisConfig,
    pub share: ShareConfig,
    pub fingerprint: Option<FingerprintConfig>,
    pub llm: Option<LlmConfig>,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 上传文件配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    /// 单个音频文件最大大小（字节）
    pub max_size: u64,
}

/// 跨域配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// 分析策略类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStrategyKind {
    /// 伪随机合成结果
    Synthetic,
    /// 调用外部指纹识别服务，失败时回退到合成结果
    Fingerprint,
}

impl AnalysisStrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStrategyKind::Synthetic => "synthetic",
            AnalysisStrategyKind::Fingerprint => "fingerprint",
        }
    }
}

/// 分析配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub strategy: AnalysisStrategyKind,
}

/// 分享链接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// 分享链接有效期（秒）
    pub ttl_secs: u64,
    /// 前端分享页面的基础URL
    pub public_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            file: FileConfig {
                max_size: 50 * 1024 * 1024, // 50MB
            },
            cors: CorsConfig {
                allowed_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
            analysis: AnalysisConfig {
                strategy: AnalysisStrategyKind::Synthetic,
            },
            share: ShareConfig {
                ttl_secs: 24 * 60 * 60,
                public_base_url: "http://localhost:5173".to_string(),
            },
            fingerprint: None,
            llm: Some(LlmConfig::default()),
        }
    }
}

impl Config {
    /// 从配置文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config: Config = toml::from_str(&content)
            .map_err(|e| AppError::config(format!("解析配置文件失败: {}", e)))?;

        config.apply_env_overrides();

        // 验证配置
        config.validate()?;

        Ok(config)
    }

    /// 使用环境变量覆盖密钥
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(ENV_LLM_API_KEY) {
            let llm = self.llm.get_or_insert_with(LlmConfig::default);
            llm.api_key = key;
            llm.enabled = true;
        }

        let access_key = non_empty(ENV_FINGERPRINT_ACCESS_KEY);
        let access_secret = non_empty(ENV_FINGERPRINT_ACCESS_SECRET);
        if access_key.is_some() || access_secret.is_some() {
            let fp = self
                .fingerprint
                .get_or_insert_with(FingerprintConfig::default);
            if let Some(key) = access_key {
                fp.access_key = key;
            }
            if let Some(secret) = access_secret {
                fp.access_secret = secret;
            }
        }
    }

    /// 验证配置有效性
    pub fn validate(&self) -> AppResult<()> {
        if self.server.port == 0 {
            return Err(AppError::config("服务器端口不能为0"));
        }

        if self.file.max_size == 0 {
            return Err(AppError::config("文件最大大小不能为0"));
        }

        if self.share.ttl_secs == 0 {
            return Err(AppError::config("分享链接有效期不能为0"));
        }

        if self.share.ttl_secs > MAX_SHARE_TTL_SECS {
            return Err(AppError::config(format!(
                "分享链接有效期不能超过 {} 秒",
                MAX_SHARE_TTL_SECS
            )));
        }

        for origin in &self.cors.allowed_origins {
            if origin.parse::<HeaderValue>().is_err() {
                return Err(AppError::config(format!("无效的CORS来源: {}", origin)));
            }
        }

        if let Some(fp) = &self.fingerprint {
            if let Err(e) = fp.validate() {
                return Err(AppError::config(format!("指纹识别配置无效: {}", e)));
            }
        }

        // 策略由配置显式选择，不根据凭证是否存在隐式切换
        if self.analysis.strategy == AnalysisStrategyKind::Fingerprint
            && self.fingerprint.is_none()
        {
            return Err(AppError::config(
                "analysis.strategy = \"fingerprint\" 需要配置 [fingerprint]",
            ));
        }

        if let Some(llm) = &self.llm {
            if let Err(e) = llm.validate() {
                return Err(AppError::config(format!("LLM配置无效: {}", e)));
            }
        }

        Ok(())
    }

    /// 获取服务器监听地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 请求体上限：对比接口需要容纳两个文件
    pub fn body_limit(&self) -> usize {
        (self.file.max_size as usize) * 2 + 64 * 1024
    }

    /// 已启用的LLM配置
    pub fn enabled_llm(&self) -> Option<&LlmConfig> {
        self.llm.as_ref().filter(|llm| llm.is_enabled())
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> AppResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::config(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.file.max_size, 50 * 1024 * 1024);
        assert_eq!(config.analysis.strategy, AnalysisStrategyKind::Synthetic);
        assert_eq!(config.share.ttl_secs, 86400);
        assert!(config.enabled_llm().is_none());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fingerprint_strategy_requires_section() {
        let mut config = Config::default();
        config.analysis.strategy = AnalysisStrategyKind::Fingerprint;
        assert!(config.validate().is_err());

        config.fingerprint = Some(FingerprintConfig {
            access_key: "key".to_string(),
            access_secret: "secret".to_string(),
            ..Default::default()
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_share_ttl_bounds() {
        let mut config = Config::default();
        config.share.ttl_secs = MAX_SHARE_TTL_SECS;
        assert!(config.validate().is_ok());

        config.share.ttl_secs = MAX_SHARE_TTL_SECS + 1;
        assert!(config.validate().is_err());

        config.share.ttl_secs = u64::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_cors_origin() {
        let mut config = Config::default();
        config.cors.allowed_origins.push("http://bad\norigin".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(|name| match name {
            ENV_LLM_API_KEY => Some("llm-key".to_string()),
            ENV_FINGERPRINT_ACCESS_KEY => Some("fp-key".to_string()),
            ENV_FINGERPRINT_ACCESS_SECRET => Some("   ".to_string()),
            _ => None,
        });

        let llm = config.enabled_llm().expect("llm should be enabled");
        assert_eq!(llm.api_key, "llm-key");

        let fp = config.fingerprint.as_ref().unwrap();
        assert_eq!(fp.access_key, "fp-key");
        assert!(fp.access_secret.is_empty());
    }

    #[test]
    fn test_body_limit_fits_two_files() {
        let config = Config::default();
        assert!(config.body_limit() > 2 * config.file.max_size as usize);
    }

    #[test]
    fn test_server_addr() {
        let config = Config::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_save_and_load_config() {
        let original_config = Config::default();
        let temp_file = NamedTempFile::new().unwrap();

        // 保存配置
        original_config.save_to_file(temp_file.path()).unwrap();

        // 加载配置
        let loaded_config = Config::from_file(temp_file.path()).unwrap();

        assert_eq!(original_config.server.port, loaded_config.server.port);
        assert_eq!(
            original_config.cors.allowed_origins,
            loaded_config.cors.allowed_origins
        );
        assert_eq!(
            original_config.analysis.strategy,
            loaded_config.analysis.strategy
        );
    }
}
