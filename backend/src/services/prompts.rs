//! 提示词模板。

use crate::models::{
    AnalysisRecord, AnalysisType, AssistantContext, BrainstormRequest, EnhancePromptRequest,
};

pub const REPORT_SYSTEM_PROMPT: &str = "You are a music copyright analyst. \
Write clear, professional assessments for musicians and labels. \
Be specific about the numbers you are given and never invent additional data.";

const ANALYSIS_CONTEXT_PROMPT: &str = "You are TuneShield's assistant on the analysis results page. \
Help the user understand similarity scores, AI-detection results, stem breakdowns and \
what the copyright risk level means for releasing their track. Keep answers concise and \
remind the user that results are indicative, not legal advice.";

const CATALOG_CONTEXT_PROMPT: &str = "You are TuneShield's assistant on the cleared catalog page. \
Help the user browse, describe and compare tracks that have been submitted to the catalog, \
and explain how risk scores were assigned. Keep answers concise.";

const CREATE_CONTEXT_PROMPT: &str = "You are TuneShield's creative assistant. \
Help the user develop original song ideas, lyrics, arrangements and prompts for music \
generation tools, while steering them away from imitating specific copyrighted works.";

const GENERAL_CONTEXT_PROMPT: &str = "You are TuneShield's assistant. TuneShield helps musicians \
check their tracks for copyright similarity and AI-generation signals before release. \
Answer questions about the product and music copyright in general. Keep answers concise.";

/// 按页面选择助手系统提示词
pub fn chat_system_prompt(context: AssistantContext) -> &'static str {
    match context {
        AssistantContext::Analysis => ANALYSIS_CONTEXT_PROMPT,
        AssistantContext::Catalog => CATALOG_CONTEXT_PROMPT,
        AssistantContext::Create => CREATE_CONTEXT_PROMPT,
        AssistantContext::General => GENERAL_CONTEXT_PROMPT,
    }
}

/// 分析报告提示词
pub fn report_prompt(
    record: &AnalysisRecord,
    analysis_type: AnalysisType,
    file_names: &[String],
) -> String {
    let overview = &record.overview;
    let mut prompt = String::new();

    let kind = match analysis_type {
        AnalysisType::DatabaseScan => "a scan of one track against a reference database",
        AnalysisType::DirectComparison => "a direct comparison between two uploaded tracks",
    };
    prompt.push_str(&format!("Write a copyright risk report for {}.\n", kind));
    if !file_names.is_empty() {
        prompt.push_str(&format!("Files: {}\n", file_names.join(", ")));
    }

    prompt.push_str("\nOverview:\n");
    prompt.push_str(&format!("- Similarity: {}%\n", overview.similarity));
    prompt.push_str(&format!("- AI probability: {}%\n", overview.ai_probability));
    prompt.push_str(&format!(
        "- Risk: {} ({}/100)\n",
        overview.risk_level, overview.risk_score
    ));
    prompt.push_str(&format!("- Overall score: {}/100\n", overview.overall_score));

    let ai = &record.ai_detection;
    prompt.push_str(&format!(
        "\nAI detection: {} (confidence {}%, platform: {})\n",
        ai.likelihood.as_str(),
        ai.confidence,
        ai.platform
    ));

    if record.fingerprinting.matches.is_empty() {
        prompt.push_str("\nFingerprint matches: none\n");
    } else {
        prompt.push_str("\nFingerprint matches:\n");
        for m in &record.fingerprinting.matches {
            prompt.push_str(&format!(
                "- \"{}\" by {}: {}% similar\n",
                m.title, m.artist, m.similarity
            ));
        }
    }

    if !record.stems.is_empty() {
        prompt.push_str("\nStem breakdown:\n");
        for stem in &record.stems {
            prompt.push_str(&format!(
                "- {}: {}% similar, {}% AI probability\n",
                stem.instrument, stem.similarity, stem.ai_probability
            ));
        }
    }

    prompt.push_str(
        "\nStructure the report as: Summary, Key Findings, Risk Assessment, Recommendations. \
Use plain language and keep it under 400 words."
    );
    prompt
}

/// 创意头脑风暴提示词
pub fn brainstorm_prompt(request: &BrainstormRequest, count: usize) -> String {
    let mut prompt = format!(
        "Generate {} original song ideas based on this theme: \"{}\".",
        count,
        request.prompt.trim()
    );
    if let Some(genre) = request.genre.as_deref().filter(|g| !g.trim().is_empty()) {
        prompt.push_str(&format!(" Genre: {}.", genre.trim()));
    }
    if let Some(mood) = request.mood.as_deref().filter(|m| !m.trim().is_empty()) {
        prompt.push_str(&format!(" Mood: {}.", mood.trim()));
    }
    prompt.push_str(
        " Each idea should be one or two sentences. \
Respond with a JSON array of strings only, no markdown.",
    );
    prompt
}

/// 音乐生成提示词优化
pub fn enhance_prompt(request: &EnhancePromptRequest) -> String {
    let mut prompt = format!(
        "Rewrite the following prompt for an AI music generation tool so it is vivid and specific \
about instrumentation, tempo, mood and structure, while avoiding references to existing artists \
or songs:\n\n\"{}\"",
        request.prompt.trim()
    );
    if let Some(style) = request.style.as_deref().filter(|s| !s.trim().is_empty()) {
        prompt.push_str(&format!("\n\nTarget style: {}.", style.trim()));
    }
    prompt.push_str("\n\nRespond with the rewritten prompt only.");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::analysis::synthetic::synthesize_scan;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_report_prompt_includes_numbers() {
        let record = synthesize_scan(&mut StdRng::seed_from_u64(1));
        let prompt = report_prompt(
            &record,
            AnalysisType::DatabaseScan,
            &["demo.wav".to_string()],
        );

        assert!(prompt.contains("demo.wav"));
        assert!(prompt.contains(&format!("Similarity: {}%", record.overview.similarity)));
        assert!(prompt.contains(&record.fingerprinting.matches[0].title));
        assert!(prompt.contains("vocals"));
    }

    #[test]
    fn test_chat_prompt_per_context() {
        assert_ne!(
            chat_system_prompt(AssistantContext::Analysis),
            chat_system_prompt(AssistantContext::General)
        );
        assert!(chat_system_prompt(AssistantContext::Create).contains("creative"));
    }

    #[test]
    fn test_brainstorm_prompt_optional_fields() {
        let request = BrainstormRequest {
            prompt: " summer rain ".to_string(),
            genre: Some("lo-fi".to_string()),
            mood: Some("  ".to_string()),
            count: None,
        };
        let prompt = brainstorm_prompt(&request, 3);
        assert!(prompt.contains("Generate 3"));
        assert!(prompt.contains("\"summer rain\""));
        assert!(prompt.contains("Genre: lo-fi."));
        assert!(!prompt.contains("Mood"));
    }
}
