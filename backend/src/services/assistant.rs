use crate::{
    error::{AppError, AppResult},
    models::{BrainstormRequest, ChatRequest, ChatRole, EnhancePromptRequest},
    services::{
        llm::{GenerationRequest, TextGenerator, TextStream},
        prompts,
    },
};
use std::sync::Arc;
use tracing::debug;

/// 头脑风暴默认条数与上限
pub const DEFAULT_IDEA_COUNT: usize = 5;
pub const MAX_IDEA_COUNT: usize = 10;

/// 对话历史最多保留的消息数
const MAX_HISTORY: usize = 40;

/// 创作助手：对话、头脑风暴、提示词优化
#[derive(Debug, Clone)]
pub struct Assistant {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl Assistant {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    fn generator(&self) -> AppResult<&Arc<dyn TextGenerator>> {
        self.generator
            .as_ref()
            .ok_or_else(|| AppError::service_unavailable("生成式文本服务未配置"))
    }

    /// 流式对话
    pub async fn chat(&self, request: ChatRequest) -> AppResult<TextStream> {
        let mut messages: Vec<_> = request
            .messages
            .into_iter()
            .filter(|m| !m.content.trim().is_empty())
            .collect();

        match messages.last() {
            None => return Err(AppError::bad_request("messages must not be empty")),
            Some(last) if last.role != ChatRole::User => {
                return Err(AppError::bad_request(
                    "the last message must come from the user",
                ));
            }
            _ => {}
        }

        if messages.len() > MAX_HISTORY {
            messages.drain(..messages.len() - MAX_HISTORY);
        }

        let generator = self.generator()?;
        debug!(
            context = ?request.context,
            message_count = messages.len(),
            "开始流式对话"
        );

        let generation = GenerationRequest {
            system: Some(prompts::chat_system_prompt(request.context).to_string()),
            messages,
            temperature: None,
        };

        generator
            .stream(&generation)
            .await
            .map_err(|e| AppError::upstream(generator.name(), e.to_string()))
    }

    /// 生成创意列表
    pub async fn brainstorm(&self, request: BrainstormRequest) -> AppResult<Vec<String>> {
        if request.prompt.trim().is_empty() {
            return Err(AppError::bad_request("prompt is required"));
        }
        let count = request
            .count
            .unwrap_or(DEFAULT_IDEA_COUNT)
            .clamp(1, MAX_IDEA_COUNT);

        let generator = self.generator()?;
        let generation =
            GenerationRequest::prompt(prompts::brainstorm_prompt(&request, count))
                .with_temperature(0.9);
        let text = generator
            .generate(&generation)
            .await
            .map_err(|e| AppError::upstream(generator.name(), e.to_string()))?;

        let mut ideas = parse_ideas(&text);
        if ideas.is_empty() {
            return Err(AppError::upstream(generator.name(), "no ideas in response"));
        }
        ideas.truncate(count);
        Ok(ideas)
    }

    /// 优化音乐生成提示词
    pub async fn enhance_prompt(&self, request: EnhancePromptRequest) -> AppResult<String> {
        if request.prompt.trim().is_empty() {
            return Err(AppError::bad_request("prompt is required"));
        }

        let generator = self.generator()?;
        let generation = GenerationRequest::prompt(prompts::enhance_prompt(&request));
        let text = generator
            .generate(&generation)
            .await
            .map_err(|e| AppError::upstream(generator.name(), e.to_string()))?;

        let enhanced = strip_code_fence(&text).trim().trim_matches('"').trim();
        if enhanced.is_empty() {
            return Err(AppError::upstream(generator.name(), "empty enhanced prompt"));
        }
        Ok(enhanced.to_string())
    }
}

/// 解析模型输出的创意列表：优先JSON数组，否则按行解析列表
pub fn parse_ideas(text: &str) -> Vec<String> {
    let body = strip_code_fence(text).trim();

    if let (Some(start), Some(end)) = (body.find('['), body.rfind(']')) {
        if start < end {
            if let Ok(items) = serde_json::from_str::<Vec<String>>(&body[start..=end]) {
                return items
                    .into_iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
            }
        }
    }

    let lines: Vec<&str> = body
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    // 出现列表项时忽略开场白、结束语等未编号的行
    let items: Vec<&str> = lines.iter().copied().filter_map(list_item).collect();
    let items = if items.is_empty() { lines } else { items };

    items
        .into_iter()
        .map(|line| line.trim().trim_matches('"').trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // 跳过语言标记行
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.strip_suffix("```").unwrap_or(rest)
}

/// 带列表标记（- * • 或 1. 1)）的行，返回去掉标记后的内容
fn list_item(line: &str) -> Option<&str> {
    let line = line.trim();
    if let Some(rest) = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("• "))
    {
        return Some(rest);
    }

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    rest.strip_prefix('.').or_else(|| rest.strip_prefix(')'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssistantContext, ChatMessage};
    use crate::services::llm::LlmError;
    use async_trait::async_trait;
    use futures::{StreamExt, stream};
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct Recording {
        reply: String,
        last_request: Mutex<Option<GenerationRequest>>,
    }

    impl Recording {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                ..Default::default()
            })
        }
    }

    #[async_trait]
    impl TextGenerator for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        fn model(&self) -> &str {
            "rec-1"
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            Ok(self.reply.clone())
        }

        async fn stream(&self, request: &GenerationRequest) -> Result<TextStream, LlmError> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            let words: Vec<Result<String, LlmError>> = self
                .reply
                .split_inclusive(' ')
                .map(|w| Ok(w.to_string()))
                .collect();
            Ok(stream::iter(words).boxed())
        }
    }

    #[test]
    fn test_parse_ideas_json() {
        let ideas = parse_ideas("```json\n[\"One\", \" Two \", \"\"]\n```");
        assert_eq!(ideas, vec!["One", "Two"]);
    }

    #[test]
    fn test_parse_ideas_list() {
        let ideas = parse_ideas("Here you go:\n1. First idea\n2) Second idea\n- \"Third\"\n\nEnjoy!");
        assert_eq!(ideas, vec!["First idea", "Second idea", "Third"]);
    }

    #[test]
    fn test_parse_ideas_plain_lines() {
        let ideas = parse_ideas("Neon rain\n\n\"Desert echo\"");
        assert_eq!(ideas, vec!["Neon rain", "Desert echo"]);
    }

    #[tokio::test]
    async fn test_brainstorm_skips_intro_line() {
        let generator = Recording::replying("Here are 2 ideas:\n1. Neon rain\n2. Desert echo");
        let assistant = Assistant::new(Some(generator.clone()));

        let ideas = assistant
            .brainstorm(BrainstormRequest {
                prompt: "city at night".to_string(),
                genre: None,
                mood: None,
                count: Some(2),
            })
            .await
            .unwrap();
        assert_eq!(ideas, vec!["Neon rain", "Desert echo"]);
    }

    #[tokio::test]
    async fn test_brainstorm_caps_count() {
        let generator = Recording::replying(r#"["a","b","c","d"]"#);
        let assistant = Assistant::new(Some(generator.clone()));

        let ideas = assistant
            .brainstorm(BrainstormRequest {
                prompt: "rain".to_string(),
                genre: None,
                mood: None,
                count: Some(2),
            })
            .await
            .unwrap();
        assert_eq!(ideas, vec!["a", "b"]);

        let request = generator.last_request.lock().unwrap().clone().unwrap();
        assert!(request.messages[0].content.contains("Generate 2"));
    }

    #[tokio::test]
    async fn test_brainstorm_requires_prompt() {
        let assistant = Assistant::new(Some(Recording::replying("[]")));
        let err = assistant
            .brainstorm(BrainstormRequest {
                prompt: "  ".to_string(),
                genre: None,
                mood: None,
                count: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_enhance_prompt_strips_quotes() {
        let generator = Recording::replying("\"Warm analog synths at 90 BPM\"\n");
        let assistant = Assistant::new(Some(generator));
        let enhanced = assistant
            .enhance_prompt(EnhancePromptRequest {
                prompt: "chill synth".to_string(),
                style: None,
            })
            .await
            .unwrap();
        assert_eq!(enhanced, "Warm analog synths at 90 BPM");
    }

    #[tokio::test]
    async fn test_chat_uses_context_prompt() {
        let generator = Recording::replying("Risk is low overall");
        let assistant = Assistant::new(Some(generator.clone()));

        let stream = assistant
            .chat(ChatRequest {
                messages: vec![ChatMessage::user("What does my score mean?")],
                context: AssistantContext::Analysis,
            })
            .await
            .unwrap();
        let text: String = stream.map(|c| c.unwrap()).collect::<Vec<_>>().await.concat();
        assert_eq!(text, "Risk is low overall");

        let request = generator.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(
            request.system.as_deref(),
            Some(prompts::chat_system_prompt(AssistantContext::Analysis))
        );
    }

    #[tokio::test]
    async fn test_chat_rejects_empty_history() {
        let assistant = Assistant::new(Some(Recording::replying("x")));
        let result = assistant
            .chat(ChatRequest {
                messages: vec![],
                context: AssistantContext::General,
            })
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_unconfigured_is_internal_error() {
        let assistant = Assistant::new(None);
        let result = assistant
            .enhance_prompt(EnhancePromptRequest {
                prompt: "x".to_string(),
                style: None,
            })
            .await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
