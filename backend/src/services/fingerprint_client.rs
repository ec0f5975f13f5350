//! 音频指纹识别客户端（ACRCloud identify 协议）。

use crate::{
    config::FingerprintConfig,
    error::{AppError, AppResult},
    file_processing::ProcessedAudio,
};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use reqwest::{
    Client, Url,
    multipart::{Form, Part},
};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use sha1::Sha1;
use std::time::Duration;
use tracing::{debug, warn};

type HmacSha1 = Hmac<Sha1>;

const SERVICE_NAME: &str = "acrcloud";
const IDENTIFY_PATH: &str = "/v1/identify";
const DATA_TYPE: &str = "audio";
const SIGNATURE_VERSION: &str = "1";

/// 识别成功
const STATUS_SUCCESS: i64 = 0;
/// 无识别结果
const STATUS_NO_RESULT: i64 = 1001;

/// 识别出的曲目
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifiedTrack {
    pub title: String,
    pub artist: String,
    pub url: String,
    /// 匹配分数（0-100）
    pub score: u32,
}

/// 识别结果
#[derive(Debug, Clone, PartialEq)]
pub enum IdentifyOutcome {
    Matched(Vec<IdentifiedTrack>),
    NoMatch,
}

/// 音频识别接口
#[async_trait]
pub trait AudioIdentifier: std::fmt::Debug + Send + Sync {
    async fn identify(&self, sample: &ProcessedAudio) -> AppResult<IdentifyOutcome>;
}

/// ACRCloud 识别客户端
#[derive(Debug, Clone)]
pub struct FingerprintClient {
    client: Client,
    config: FingerprintConfig,
}

#[derive(Debug, Deserialize)]
struct AcrResponse {
    status: AcrStatus,
    #[serde(default)]
    metadata: Option<AcrMetadata>,
}

#[derive(Debug, Deserialize)]
struct AcrStatus {
    code: i64,
    #[serde(default)]
    msg: String,
}

#[derive(Debug, Deserialize)]
struct AcrMetadata {
    #[serde(default)]
    music: Vec<AcrMusic>,
}

#[derive(Debug, Deserialize)]
struct AcrMusic {
    #[serde(default)]
    title: String,
    #[serde(default)]
    artists: Vec<AcrArtist>,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    external_metadata: Option<JsonValue>,
}

#[derive(Debug, Deserialize)]
struct AcrArtist {
    name: String,
}

impl FingerprintClient {
    /// 创建识别客户端
    pub fn new(config: FingerprintConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::config(format!("创建HTTP客户端失败: {}", e)))?;

        Ok(Self { client, config })
    }

    fn sample_slice<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[..data.len().min(self.config.max_sample_bytes)]
    }
}

#[async_trait]
impl AudioIdentifier for FingerprintClient {
    async fn identify(&self, sample: &ProcessedAudio) -> AppResult<IdentifyOutcome> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_request(
            &self.config.access_key,
            &self.config.access_secret,
            &timestamp,
        )?;

        let body = self.sample_slice(&sample.data).to_vec();
        let sample_bytes = body.len();
        let part = Part::bytes(body)
            .file_name(sample.file_name.clone())
            .mime_str(&sample.mime_type)
            .map_err(|e| AppError::upstream(SERVICE_NAME, format!("构造采样失败: {}", e)))?;

        let form = Form::new()
            .part("sample", part)
            .text("sample_bytes", sample_bytes.to_string())
            .text("access_key", self.config.access_key.clone())
            .text("data_type", DATA_TYPE)
            .text("signature_version", SIGNATURE_VERSION)
            .text("signature", signature)
            .text("timestamp", timestamp);

        debug!(
            file_name = %sample.file_name,
            sample_bytes,
            "发送指纹识别请求"
        );

        let response = self
            .client
            .post(self.config.identify_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::upstream(SERVICE_NAME, format!("请求失败: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::upstream(SERVICE_NAME, format!("读取响应失败: {}", e)))?;

        if !status.is_success() {
            warn!(status = %status, "指纹识别服务返回错误状态");
            return Err(AppError::upstream(
                SERVICE_NAME,
                format!("HTTP {}: {}", status, text),
            ));
        }

        parse_identify_response(&text)
    }
}

/// 计算请求签名：base64(HMAC-SHA1(secret, string_to_sign))
pub fn sign_request(access_key: &str, access_secret: &str, timestamp: &str) -> AppResult<String> {
    let string_to_sign = format!(
        "POST\n{}\n{}\n{}\n{}\n{}",
        IDENTIFY_PATH, access_key, DATA_TYPE, SIGNATURE_VERSION, timestamp
    );
    hmac_sha1_base64(access_secret.as_bytes(), string_to_sign.as_bytes())
}

fn hmac_sha1_base64(key: &[u8], data: &[u8]) -> AppResult<String> {
    let mut mac = HmacSha1::new_from_slice(key)
        .map_err(|e| AppError::config(format!("无效的签名密钥: {}", e)))?;
    mac.update(data);
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// 解析识别响应
pub fn parse_identify_response(body: &str) -> AppResult<IdentifyOutcome> {
    let response: AcrResponse = serde_json::from_str(body)
        .map_err(|e| AppError::upstream(SERVICE_NAME, format!("解析响应失败: {}", e)))?;

    match response.status.code {
        STATUS_SUCCESS => {}
        STATUS_NO_RESULT => return Ok(IdentifyOutcome::NoMatch),
        code => {
            return Err(AppError::upstream(
                SERVICE_NAME,
                format!("status {}: {}", code, response.status.msg),
            ));
        }
    }

    let tracks: Vec<IdentifiedTrack> = response
        .metadata
        .map(|m| m.music)
        .unwrap_or_default()
        .into_iter()
        .map(|music| {
            let artist = music
                .artists
                .first()
                .map(|a| a.name.clone())
                .unwrap_or_else(|| "Unknown Artist".to_string());
            let url = track_url(&music, &artist);
            IdentifiedTrack {
                score: music.score.unwrap_or(0.0).round().clamp(0.0, 100.0) as u32,
                title: music.title,
                artist,
                url,
            }
        })
        .collect();

    if tracks.is_empty() {
        Ok(IdentifyOutcome::NoMatch)
    } else {
        Ok(IdentifyOutcome::Matched(tracks))
    }
}

/// 曲目链接：Spotify 优先，其次 YouTube，最后退化为 YouTube 搜索
fn track_url(music: &AcrMusic, artist: &str) -> String {
    let external = music.external_metadata.as_ref();

    if let Some(id) = external
        .and_then(|m| m.pointer("/spotify/track/id"))
        .and_then(JsonValue::as_str)
    {
        return format!("https://open.spotify.com/track/{}", id);
    }

    if let Some(vid) = external
        .and_then(|m| m.pointer("/youtube/vid"))
        .and_then(JsonValue::as_str)
    {
        return format!("https://www.youtube.com/watch?v={}", vid);
    }

    let query = format!("{} {}", music.title, artist);
    Url::parse_with_params(
        "https://www.youtube.com/results",
        &[("search_query", query.as_str())],
    )
    .map(|url| url.to_string())
    .unwrap_or_else(|_| "https://www.youtube.com/results".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_sha1_known_vector() {
        // RFC 2202 测试向量 2
        let digest = hmac_sha1_base64(b"Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(digest, "7/zfauXrL6LSdBbV8YTfnCWafHk=");
    }

    #[test]
    fn test_sign_request() {
        let signature = sign_request("my-key", "my-secret", "1700000000").unwrap();
        assert_eq!(signature, "HpoCh8RUJdZvGnfeUOtc1CnqT9E=");
    }

    #[test]
    fn test_parse_matches() {
        let body = r#"{
            "status": {"msg": "Success", "code": 0, "version": "1.0"},
            "metadata": {"music": [
                {
                    "title": "Song A",
                    "artists": [{"name": "Artist A"}, {"name": "Feat"}],
                    "score": 92,
                    "external_metadata": {"spotify": {"track": {"id": "abc123"}}}
                },
                {
                    "title": "Song B",
                    "artists": [{"name": "Artist B"}],
                    "score": 71.6,
                    "external_metadata": {"youtube": {"vid": "xyz"}}
                },
                {
                    "title": "Song C",
                    "artists": []
                }
            ]}
        }"#;

        let IdentifyOutcome::Matched(tracks) = parse_identify_response(body).unwrap() else {
            panic!("expected matches");
        };
        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks[0].artist, "Artist A");
        assert_eq!(tracks[0].url, "https://open.spotify.com/track/abc123");
        assert_eq!(tracks[1].score, 72);
        assert_eq!(tracks[1].url, "https://www.youtube.com/watch?v=xyz");
        assert_eq!(tracks[2].artist, "Unknown Artist");
        assert_eq!(tracks[2].score, 0);
        assert!(
            tracks[2]
                .url
                .starts_with("https://www.youtube.com/results?search_query=Song+C")
        );
    }

    #[test]
    fn test_parse_no_result() {
        let body = r#"{"status": {"msg": "No result", "code": 1001, "version": "1.0"}}"#;
        assert_eq!(
            parse_identify_response(body).unwrap(),
            IdentifyOutcome::NoMatch
        );
    }

    #[test]
    fn test_parse_error_status() {
        let body = r#"{"status": {"msg": "Invalid signature", "code": 3014}}"#;
        let err = parse_identify_response(body).unwrap_err();
        assert!(matches!(err, AppError::Upstream { .. }));

        assert!(parse_identify_response("<html>").is_err());
    }

    #[test]
    fn test_sample_is_truncated() {
        let client = FingerprintClient::new(FingerprintConfig {
            access_key: "k".to_string(),
            access_secret: "s".to_string(),
            max_sample_bytes: 10,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.sample_slice(&[0u8; 64]).len(), 10);
        assert_eq!(client.sample_slice(&[0u8; 4]).len(), 4);
    }
}
