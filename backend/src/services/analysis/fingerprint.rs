use super::{AnalysisStrategy, SyntheticStrategy, scoring, synthetic};
use crate::{
    error::AppResult,
    file_processing::ProcessedAudio,
    models::{AnalysisRecord, FingerprintMatch},
    services::fingerprint_client::{AudioIdentifier, IdentifiedTrack, IdentifyOutcome},
};
use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 最多保留的匹配数
pub const MAX_MATCHES: usize = 5;

/// 基于外部指纹识别服务的分析策略
///
/// 识别服务不可用时降级为合成结果，请求本身不会因此失败。
#[derive(Debug, Clone)]
pub struct FingerprintStrategy {
    identifier: Arc<dyn AudioIdentifier>,
    fallback: SyntheticStrategy,
}

impl FingerprintStrategy {
    pub fn new(identifier: Arc<dyn AudioIdentifier>) -> Self {
        Self {
            identifier,
            fallback: SyntheticStrategy::new(),
        }
    }
}

#[async_trait]
impl AnalysisStrategy for FingerprintStrategy {
    fn name(&self) -> &'static str {
        "fingerprint"
    }

    async fn scan(&self, sample: &ProcessedAudio) -> AppResult<AnalysisRecord> {
        debug!(file_name = %sample.file_name, "提交指纹识别");

        match self.identifier.identify(sample).await {
            Ok(IdentifyOutcome::Matched(tracks)) => {
                info!(
                    file_name = %sample.file_name,
                    matches = tracks.len(),
                    "指纹识别命中"
                );
                Ok(record_from_tracks(tracks))
            }
            Ok(IdentifyOutcome::NoMatch) => {
                info!(file_name = %sample.file_name, "指纹识别无匹配");
                Ok(scoring::zero_match_record(&mut rand::rng()))
            }
            Err(e) => {
                warn!(
                    file_name = %sample.file_name,
                    "指纹识别失败，降级为合成结果: {}", e
                );
                Ok(self.fallback.scan_now())
            }
        }
    }

    async fn compare(
        &self,
        _original: &ProcessedAudio,
        comparison: &ProcessedAudio,
        comparison_url: &str,
    ) -> AppResult<AnalysisRecord> {
        // 识别服务只支持与曲库比对
        Ok(self.fallback.compare_now(comparison, comparison_url))
    }
}

/// 按分数降序取前 MAX_MATCHES 个，概览相似度取最高分
fn record_from_tracks(mut tracks: Vec<IdentifiedTrack>) -> AnalysisRecord {
    tracks.sort_by(|a, b| b.score.cmp(&a.score));
    tracks.truncate(MAX_MATCHES);

    let matches: Vec<FingerprintMatch> = tracks
        .into_iter()
        .map(|track| FingerprintMatch {
            similarity: track.score.min(100),
            title: track.title,
            artist: track.artist,
            url: track.url,
        })
        .collect();

    let similarity = matches.first().map(|m| m.similarity).unwrap_or(0);

    let mut rng = rand::rng();
    let ai_probability = rng.random_range(synthetic::AI_PROBABILITY_RANGE);
    synthetic::assemble(&mut rng, similarity, ai_probability, matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::file_processing::test_support::wav_bytes;
    use bytes::Bytes;

    #[derive(Debug)]
    enum Stub {
        Matched(Vec<IdentifiedTrack>),
        NoMatch,
        Failing,
    }

    #[async_trait]
    impl AudioIdentifier for Stub {
        async fn identify(&self, _sample: &ProcessedAudio) -> AppResult<IdentifyOutcome> {
            match self {
                Stub::Matched(tracks) => Ok(IdentifyOutcome::Matched(tracks.clone())),
                Stub::NoMatch => Ok(IdentifyOutcome::NoMatch),
                Stub::Failing => Err(AppError::upstream("acrcloud", "connection refused")),
            }
        }
    }

    fn sample() -> ProcessedAudio {
        let data = Bytes::from(wav_bytes(256));
        ProcessedAudio {
            file_name: "demo.wav".to_string(),
            size: data.len() as u64,
            mime_type: "audio/x-wav".to_string(),
            sha256: String::new(),
            data,
        }
    }

    fn track(title: &str, score: u32) -> IdentifiedTrack {
        IdentifiedTrack {
            title: title.to_string(),
            artist: "Artist".to_string(),
            url: format!("https://example.com/{}", title),
            score,
        }
    }

    #[tokio::test]
    async fn test_matches_sorted_and_capped() {
        let tracks = (0..8).map(|i| track(&format!("t{}", i), 40 + i * 5)).collect();
        let strategy = FingerprintStrategy::new(Arc::new(Stub::Matched(tracks)));

        let record = strategy.scan(&sample()).await.unwrap();
        let matches = &record.fingerprinting.matches;
        assert_eq!(matches.len(), MAX_MATCHES);
        assert_eq!(matches[0].title, "t7");
        assert!(matches.windows(2).all(|w| w[0].similarity >= w[1].similarity));
        assert_eq!(record.overview.similarity, 75);
    }

    #[tokio::test]
    async fn test_no_match_yields_zero_record() {
        let strategy = FingerprintStrategy::new(Arc::new(Stub::NoMatch));
        let record = strategy.scan(&sample()).await.unwrap();

        assert!(record.fingerprinting.matches.is_empty());
        assert_eq!(record.overview.similarity, 0);
        assert_eq!(record.overview.risk_score, 0);
        assert_eq!(record.overview.overall_score, 100);
    }

    #[tokio::test]
    async fn test_upstream_failure_falls_back() {
        let strategy = FingerprintStrategy::new(Arc::new(Stub::Failing));
        let record = strategy.scan(&sample()).await.unwrap();

        assert_eq!(record.fingerprinting.matches.len(), 1);
        assert!(synthetic::SCAN_SIMILARITY_RANGE.contains(&record.overview.similarity));
    }

    #[tokio::test]
    async fn test_compare_is_synthetic() {
        let strategy = FingerprintStrategy::new(Arc::new(Stub::Failing));
        let record = strategy
            .compare(&sample(), &sample(), "/api/audio/xyz")
            .await
            .unwrap();
        assert_eq!(record.fingerprinting.matches[0].url, "/api/audio/xyz");
        assert_eq!(record.fingerprinting.matches[0].title, "demo");
    }
}
