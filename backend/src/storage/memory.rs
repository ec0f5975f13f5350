use super::KeyValueStore;
use crate::error::AppResult;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// 进程内存储实现，无淘汰、无持久化，重启即丢失
#[derive(Debug)]
pub struct MemoryStore<V> {
    name: &'static str,
    entries: RwLock<HashMap<String, V>>,
}

impl<V> MemoryStore<V> {
    /// 创建新的内存存储
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait::async_trait]
impl<V> KeyValueStore<V> for MemoryStore<V>
where
    V: Clone + std::fmt::Debug + Send + Sync + 'static,
{
    async fn put(&self, key: &str, value: V) -> AppResult<()> {
        let replaced = self
            .entries
            .write()
            .await
            .insert(key.to_string(), value)
            .is_some();
        tracing::debug!(store = self.name, key, replaced, "写入内存存储");
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<Option<V>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn list(&self) -> AppResult<Vec<V>> {
        Ok(self.entries.read().await.values().cloned().collect())
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.entries.read().await.len())
    }

    async fn delete(&self, key: &str) -> AppResult<bool> {
        let removed = self.entries.write().await.remove(key).is_some();
        if removed {
            tracing::debug!(store = self.name, key, "删除内存存储条目");
        }
        Ok(removed)
    }
}
