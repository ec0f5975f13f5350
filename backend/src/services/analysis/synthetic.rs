use super::{AnalysisStrategy, scoring};
use crate::{
    error::AppResult,
    file_processing::ProcessedAudio,
    models::{AnalysisRecord, FingerprintMatch, Fingerprinting},
};
use rand::Rng;
use rand::seq::IndexedRandom;
use std::path::Path;

/// 数据库扫描的相似度范围
pub const SCAN_SIMILARITY_RANGE: std::ops::RangeInclusive<u32> = 10..=90;
/// 直接对比的相似度范围
pub const COMPARISON_SIMILARITY_RANGE: std::ops::RangeInclusive<u32> = 50..=100;
/// AI生成概率范围
pub const AI_PROBABILITY_RANGE: std::ops::RangeInclusive<u32> = 5..=95;

/// 合成结果使用的参考曲目
const REFERENCE_TRACKS: [(&str, &str, &str); 6] = [
    (
        "Blinding Lights",
        "The Weeknd",
        "https://open.spotify.com/track/0VjIjW4GlUZAMYd2vXMi3b",
    ),
    (
        "Levitating",
        "Dua Lipa",
        "https://open.spotify.com/track/463CkQjx2Zk1yXoBuierM9",
    ),
    (
        "Shape of You",
        "Ed Sheeran",
        "https://open.spotify.com/track/7qiZfU4dY1lWllzX7mPBI3",
    ),
    (
        "Uptown Funk",
        "Mark Ronson ft. Bruno Mars",
        "https://open.spotify.com/track/32OlwWuMpZ6b0aN2RZOeMS",
    ),
    (
        "Bad Guy",
        "Billie Eilish",
        "https://open.spotify.com/track/2Fxmhks0bxGSBdJ92vM42m",
    ),
    (
        "Get Lucky",
        "Daft Punk ft. Pharrell Williams",
        "https://open.spotify.com/track/69kOkLUCkxIZYexIgSG8rq",
    ),
];

/// 伪随机合成策略：在固定范围内生成满足结构约束的结果
#[derive(Debug, Clone, Default)]
pub struct SyntheticStrategy;

impl SyntheticStrategy {
    pub fn new() -> Self {
        Self
    }

    /// 使用线程本地随机数生成扫描结果
    pub fn scan_now(&self) -> AnalysisRecord {
        synthesize_scan(&mut rand::rng())
    }

    /// 使用线程本地随机数生成对比结果
    pub fn compare_now(&self, comparison: &ProcessedAudio, comparison_url: &str) -> AnalysisRecord {
        synthesize_comparison(&mut rand::rng(), &comparison.file_name, comparison_url)
    }
}

#[async_trait::async_trait]
impl AnalysisStrategy for SyntheticStrategy {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    async fn scan(&self, sample: &ProcessedAudio) -> AppResult<AnalysisRecord> {
        tracing::debug!(file_name = %sample.file_name, "生成合成扫描结果");
        Ok(self.scan_now())
    }

    async fn compare(
        &self,
        original: &ProcessedAudio,
        comparison: &ProcessedAudio,
        comparison_url: &str,
    ) -> AppResult<AnalysisRecord> {
        tracing::debug!(
            original = %original.file_name,
            comparison = %comparison.file_name,
            "生成合成对比结果"
        );
        Ok(self.compare_now(comparison, comparison_url))
    }
}

/// 合成数据库扫描结果：恰好一个匹配，相似度与概览一致
pub fn synthesize_scan<R: Rng + ?Sized>(rng: &mut R) -> AnalysisRecord {
    let similarity = rng.random_range(SCAN_SIMILARITY_RANGE);
    let ai_probability = rng.random_range(AI_PROBABILITY_RANGE);
    let (title, artist, url) = *REFERENCE_TRACKS
        .choose(rng)
        .unwrap_or(&REFERENCE_TRACKS[0]);

    let matches = vec![FingerprintMatch {
        title: title.to_string(),
        artist: artist.to_string(),
        url: url.to_string(),
        similarity,
    }];

    assemble(rng, similarity, ai_probability, matches)
}

/// 合成直接对比结果：唯一匹配即对比文件本身
pub fn synthesize_comparison<R: Rng + ?Sized>(
    rng: &mut R,
    comparison_file_name: &str,
    comparison_url: &str,
) -> AnalysisRecord {
    let similarity = rng.random_range(COMPARISON_SIMILARITY_RANGE);
    let ai_probability = rng.random_range(AI_PROBABILITY_RANGE);

    let title = Path::new(comparison_file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(comparison_file_name);

    let matches = vec![FingerprintMatch {
        title: title.to_string(),
        artist: "Comparison upload".to_string(),
        url: comparison_url.to_string(),
        similarity,
    }];

    assemble(rng, similarity, ai_probability, matches)
}

/// 由相似度与AI概率组装完整结果
pub(super) fn assemble<R: Rng + ?Sized>(
    rng: &mut R,
    similarity: u32,
    ai_probability: u32,
    matches: Vec<FingerprintMatch>,
) -> AnalysisRecord {
    AnalysisRecord {
        overview: scoring::build_overview(rng, similarity, ai_probability),
        ai_detection: scoring::build_ai_detection(rng, ai_probability),
        fingerprinting: Fingerprinting { matches },
        stems: scoring::build_stems(rng, similarity, ai_probability),
        similarity_timeline: scoring::build_timeline(rng, similarity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskLevel;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_scan_ranges_and_invariants() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let record = synthesize_scan(&mut rng);
            let overview = &record.overview;

            assert!(SCAN_SIMILARITY_RANGE.contains(&overview.similarity));
            assert!(AI_PROBABILITY_RANGE.contains(&overview.ai_probability));
            assert_eq!(overview.risk_level, RiskLevel::from_score(overview.risk_score));
            assert_eq!(record.fingerprinting.matches.len(), 1);
            assert_eq!(record.fingerprinting.matches[0].similarity, overview.similarity);
            assert_eq!(record.stems.len(), scoring::STEM_INSTRUMENTS.len());
        }
    }

    #[test]
    fn test_comparison_ranges() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..500 {
            let record = synthesize_comparison(&mut rng, "my-demo.mp3", "/api/audio/abc");
            assert!(COMPARISON_SIMILARITY_RANGE.contains(&record.overview.similarity));
            assert_eq!(
                record.overview.risk_level,
                RiskLevel::from_score(record.overview.risk_score)
            );

            let matched = &record.fingerprinting.matches[0];
            assert_eq!(matched.title, "my-demo");
            assert_eq!(matched.url, "/api/audio/abc");
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = synthesize_scan(&mut StdRng::seed_from_u64(5));
        let b = synthesize_scan(&mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }
}
