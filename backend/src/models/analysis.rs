use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 高风险阈值（严格大于）
pub const HIGH_RISK_THRESHOLD: u32 = 75;
/// 中风险阈值（严格大于）
pub const MEDIUM_RISK_THRESHOLD: u32 = 40;

/// 风险等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// 由风险分数推导风险等级
    pub fn from_score(score: u32) -> Self {
        if score > HIGH_RISK_THRESHOLD {
            RiskLevel::High
        } else if score > MEDIUM_RISK_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// AI生成可能性标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AiLikelihood {
    #[serde(rename = "Likely AI-Generated")]
    LikelyAi,
    #[serde(rename = "Possibly AI-Assisted")]
    PossiblyAi,
    #[serde(rename = "Likely Human-Created")]
    LikelyHuman,
}

impl AiLikelihood {
    /// 由AI概率推导标签
    pub fn from_probability(probability: u32) -> Self {
        if probability > 70 {
            AiLikelihood::LikelyAi
        } else if probability > 40 {
            AiLikelihood::PossiblyAi
        } else {
            AiLikelihood::LikelyHuman
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AiLikelihood::LikelyAi => "Likely AI-Generated",
            AiLikelihood::PossiblyAi => "Possibly AI-Assisted",
            AiLikelihood::LikelyHuman => "Likely Human-Created",
        }
    }
}

/// 分析结果概览
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    /// 与已知作品的相似度（0-100）
    pub similarity: u32,
    /// AI生成概率（0-100）
    pub ai_probability: u32,
    pub risk_level: RiskLevel,
    /// 风险分数（0-100）
    pub risk_score: u32,
    /// 综合评分，风险越低越高
    pub overall_score: u32,
}

/// AI生成检测结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AiDetection {
    pub confidence: u32,
    /// 疑似生成平台
    pub platform: String,
    pub likelihood: AiLikelihood,
}

/// 指纹匹配项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FingerprintMatch {
    pub title: String,
    pub artist: String,
    pub url: String,
    pub similarity: u32,
}

/// 指纹匹配列表
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Fingerprinting {
    pub matches: Vec<FingerprintMatch>,
}

/// 分轨（乐器）相似度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StemBreakdown {
    pub instrument: String,
    pub similarity: u32,
    pub ai_probability: u32,
}

/// 相似度时间序列点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    /// 时间偏移（秒）
    pub timestamp: u32,
    pub similarity: u32,
}

/// 固定结构的分析结果，生成后不可变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub overview: Overview,
    pub ai_detection: AiDetection,
    pub fingerprinting: Fingerprinting,
    pub stems: Vec<StemBreakdown>,
    pub similarity_timeline: Vec<TimelinePoint>,
}

impl AnalysisRecord {
    /// 相似度最高的匹配
    pub fn top_match(&self) -> Option<&FingerprintMatch> {
        self.fingerprinting
            .matches
            .iter()
            .max_by_key(|m| m.similarity)
    }
}

/// 分析类型标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisType {
    /// 与数据库比对
    #[default]
    DatabaseScan,
    /// 两个文件直接对比
    DirectComparison,
}

impl AnalysisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::DatabaseScan => "database-scan",
            AnalysisType::DirectComparison => "direct-comparison",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_thresholds() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(40), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(41), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(75), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(76), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(100), RiskLevel::High);
    }

    #[test]
    fn test_likelihood_labels_serialize() {
        let json = serde_json::to_string(&AiLikelihood::from_probability(80)).unwrap();
        assert_eq!(json, "\"Likely AI-Generated\"");
        assert_eq!(
            AiLikelihood::from_probability(41),
            AiLikelihood::PossiblyAi
        );
        assert_eq!(
            AiLikelihood::from_probability(40),
            AiLikelihood::LikelyHuman
        );
    }

    #[test]
    fn test_analysis_type_wire_format() {
        let parsed: AnalysisType = serde_json::from_str("\"direct-comparison\"").unwrap();
        assert_eq!(parsed, AnalysisType::DirectComparison);
        assert_eq!(
            serde_json::to_string(&AnalysisType::DatabaseScan).unwrap(),
            "\"database-scan\""
        );
    }

    #[test]
    fn test_record_uses_camel_case() {
        let record = AnalysisRecord {
            overview: Overview {
                similarity: 50,
                ai_probability: 20,
                risk_level: RiskLevel::Medium,
                risk_score: 55,
                overall_score: 45,
            },
            ai_detection: AiDetection {
                confidence: 20,
                platform: "None detected".to_string(),
                likelihood: AiLikelihood::LikelyHuman,
            },
            fingerprinting: Fingerprinting::default(),
            stems: vec![],
            similarity_timeline: vec![TimelinePoint {
                timestamp: 15,
                similarity: 48,
            }],
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["overview"]["aiProbability"], 20);
        assert_eq!(json["overview"]["riskLevel"], "Medium");
        assert_eq!(json["similarityTimeline"][0]["timestamp"], 15);
        assert!(json["aiDetection"].is_object());
    }
}
