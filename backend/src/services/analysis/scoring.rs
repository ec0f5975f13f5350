//! 风险分数等派生值的固定公式。
//!
//! 这些公式只用于展示，不代表任何统计意义。

use crate::models::{
    AiDetection, AiLikelihood, AnalysisRecord, Fingerprinting, Overview, RiskLevel, StemBreakdown,
    TimelinePoint,
};
use rand::Rng;
use rand::seq::IndexedRandom;

/// 风险分数随机抖动范围（±）
pub const RISK_JITTER: i32 = 10;
/// 分轨波动范围（±）
pub const STEM_SPREAD: u32 = 15;
/// 时间序列波动范围（±）
pub const TIMELINE_SPREAD: u32 = 20;
/// 时间序列点数与间隔
pub const TIMELINE_POINTS: u32 = 12;
pub const TIMELINE_INTERVAL_SECS: u32 = 15;
/// AI平台猜测的触发阈值（严格大于）
pub const PLATFORM_GUESS_THRESHOLD: u32 = 40;

pub const STEM_INSTRUMENTS: [&str; 4] = ["vocals", "drums", "bass", "melody"];

const AI_PLATFORMS: [&str; 4] = ["Suno", "Udio", "Stable Audio", "MusicGen"];
pub const NO_PLATFORM: &str = "None detected";

/// 限制到 0-100
pub fn clamp_percent(value: i64) -> u32 {
    value.clamp(0, 100) as u32
}

/// riskScore = clamp(similarity + jitter, 0, 100)
pub fn risk_score(similarity: u32, jitter: i32) -> u32 {
    clamp_percent(similarity as i64 + jitter as i64)
}

/// overallScore = 100 - riskScore
pub fn overall_score(risk_score: u32) -> u32 {
    100u32.saturating_sub(risk_score.min(100))
}

/// 在 center ± spread 范围内取值
pub fn vary<R: Rng + ?Sized>(rng: &mut R, center: u32, spread: u32) -> u32 {
    let spread = spread as i64;
    let delta = rng.random_range(-spread..=spread);
    clamp_percent(center as i64 + delta)
}

pub fn build_overview<R: Rng + ?Sized>(
    rng: &mut R,
    similarity: u32,
    ai_probability: u32,
) -> Overview {
    let similarity = similarity.min(100);
    let risk_score = risk_score(similarity, rng.random_range(-RISK_JITTER..=RISK_JITTER));
    Overview {
        similarity,
        ai_probability: ai_probability.min(100),
        risk_level: RiskLevel::from_score(risk_score),
        risk_score,
        overall_score: overall_score(risk_score),
    }
}

pub fn build_ai_detection<R: Rng + ?Sized>(rng: &mut R, ai_probability: u32) -> AiDetection {
    let platform = if ai_probability > PLATFORM_GUESS_THRESHOLD {
        AI_PLATFORMS.choose(rng).copied().unwrap_or(NO_PLATFORM)
    } else {
        NO_PLATFORM
    };

    AiDetection {
        confidence: ai_probability.min(100),
        platform: platform.to_string(),
        likelihood: AiLikelihood::from_probability(ai_probability),
    }
}

pub fn build_stems<R: Rng + ?Sized>(
    rng: &mut R,
    similarity: u32,
    ai_probability: u32,
) -> Vec<StemBreakdown> {
    STEM_INSTRUMENTS
        .iter()
        .map(|instrument| StemBreakdown {
            instrument: instrument.to_string(),
            similarity: vary(rng, similarity, STEM_SPREAD),
            ai_probability: vary(rng, ai_probability, STEM_SPREAD),
        })
        .collect()
}

pub fn build_timeline<R: Rng + ?Sized>(rng: &mut R, similarity: u32) -> Vec<TimelinePoint> {
    (0..TIMELINE_POINTS)
        .map(|i| TimelinePoint {
            timestamp: i * TIMELINE_INTERVAL_SECS,
            similarity: vary(rng, similarity, TIMELINE_SPREAD),
        })
        .collect()
}

/// 指纹服务返回“无匹配”时的结果：相似度与风险均为0
pub fn zero_match_record<R: Rng + ?Sized>(rng: &mut R) -> AnalysisRecord {
    let ai_probability = rng.random_range(5..=95);
    AnalysisRecord {
        overview: Overview {
            similarity: 0,
            ai_probability,
            risk_level: RiskLevel::Low,
            risk_score: 0,
            overall_score: 100,
        },
        ai_detection: build_ai_detection(rng, ai_probability),
        fingerprinting: Fingerprinting::default(),
        stems: STEM_INSTRUMENTS
            .iter()
            .map(|instrument| StemBreakdown {
                instrument: instrument.to_string(),
                similarity: 0,
                ai_probability: vary(rng, ai_probability, STEM_SPREAD),
            })
            .collect(),
        similarity_timeline: (0..TIMELINE_POINTS)
            .map(|i| TimelinePoint {
                timestamp: i * TIMELINE_INTERVAL_SECS,
                similarity: 0,
            })
            .collect(),
    }
}
