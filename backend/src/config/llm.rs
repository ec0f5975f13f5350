use serde::{Deserialize, Serialize};

/// 生成式文本服务配置（Gemini 兼容接口）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// 是否启用
    pub enabled: bool,
    /// API 基础URL
    pub base_url: String,
    pub api_key: String,
    /// 模型名称
    pub model: String,
    /// 采样温度
    pub temperature: f32,
    /// 请求超时（秒），流式接口不受此限制
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key: String::new(),
            model: "gemini-2.0-flash".to_string(),
            temperature: 0.7,
            request_timeout_secs: 60,
        }
    }
}

impl LlmConfig {
    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), String> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("base_url 必须以 http:// 或 https:// 开头".to_string());
        }

        if self.model.trim().is_empty() {
            return Err("model 不能为空".to_string());
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("temperature 应在 0.0-2.0 之间".to_string());
        }

        if self.enabled && self.api_key.trim().is_empty() {
            return Err("启用时 api_key 不能为空".to_string());
        }

        Ok(())
    }

    /// 检查是否启用
    pub fn is_enabled(&self) -> bool {
        self.enabled && !self.api_key.trim().is_empty()
    }
}
