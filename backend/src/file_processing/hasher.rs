use crate::error::{AppError, AppResult};
use bytes::Bytes;
use sha2::{Digest, Sha256};
use tokio::task;

/// 文件哈希计算器
#[derive(Debug, Clone, Default)]
pub struct FileHasher;

impl FileHasher {
    /// 创建新的文件哈希计算器
    pub fn new() -> Self {
        Self
    }

    /// 在后台任务中计算SHA256，避免阻塞异步运行时
    pub async fn calculate_sha256_async(&self, data: Bytes) -> AppResult<String> {
        task::spawn_blocking(move || Self::calculate_sha256(&data))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))
    }

    /// 计算SHA256哈希值
    pub fn calculate_sha256(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_value() {
        assert_eq!(
            FileHasher::calculate_sha256(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn test_async_matches_sync() {
        let hasher = FileHasher::new();
        let data = Bytes::from_static(b"hello audio");
        let hash = hasher.calculate_sha256_async(data.clone()).await.unwrap();
        assert_eq!(hash, FileHasher::calculate_sha256(&data));
    }
}
