pub mod memory;

pub use memory::MemoryStore;

use crate::error::AppResult;

/// 键值存储接口
#[async_trait::async_trait]
pub trait KeyValueStore<V>: std::fmt::Debug + Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    /// 写入（同键覆盖）
    async fn put(&self, key: &str, value: V) -> AppResult<()>;

    /// 读取
    async fn get(&self, key: &str) -> AppResult<Option<V>>;

    /// 列出全部值
    async fn list(&self) -> AppResult<Vec<V>>;

    /// 条目数
    async fn count(&self) -> AppResult<usize> {
        Ok(self.list().await?.len())
    }

    /// 删除，返回键是否存在
    async fn delete(&self, key: &str) -> AppResult<bool>;

    /// 检查键是否存在
    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
