use serde::{Deserialize, Serialize};

/// 音频指纹识别服务配置（ACRCloud 兼容的 identify 协议）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerprintConfig {
    /// 识别服务主机，例如 identify-eu-west-1.acrcloud.com
    pub host: String,
    pub access_key: String,
    pub access_secret: String,
    /// 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 上传给识别服务的最大采样字节数
    pub max_sample_bytes: usize,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            host: "identify-eu-west-1.acrcloud.com".to_string(),
            access_key: String::new(),
            access_secret: String::new(),
            request_timeout_secs: 30,
            max_sample_bytes: 5 * 1024 * 1024,
        }
    }
}

impl FingerprintConfig {
    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("host 不能为空".to_string());
        }

        if self.host.contains("://") {
            return Err("host 不应包含协议前缀".to_string());
        }

        if self.access_key.is_empty() || self.access_secret.is_empty() {
            return Err("access_key 与 access_secret 均不能为空".to_string());
        }

        if self.max_sample_bytes == 0 {
            return Err("max_sample_bytes 必须大于0".to_string());
        }

        Ok(())
    }

    /// 获取 identify 接口完整URL
    pub fn identify_url(&self) -> String {
        format!("https://{}/v1/identify", self.host.trim_end_matches('/'))
    }
}
