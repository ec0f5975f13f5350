//! 流式对话中继：生产者任务读取上游片段，经有界通道转发给响应体。
//!
//! 响应体被丢弃（客户端断开）时取消令牌，生产者随即停止并释放上游请求。

use crate::services::llm::TextStream;
use bytes::Bytes;
use futures::{Stream, StreamExt, stream};
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// 上游中途出错时追加给客户端的提示
pub const INTERRUPTED_NOTICE: &str = "\n[Assistant response interrupted. Please try again.]";

/// 默认通道容量
pub const DEFAULT_CHANNEL_CAPACITY: usize = 32;

/// 启动中继，返回可直接作为响应体的字节流
pub fn relay(
    upstream: TextStream,
    capacity: usize,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
    let (tx, rx) = mpsc::channel::<String>(capacity.max(1));
    let token = CancellationToken::new();

    tokio::spawn(produce(upstream, tx, token.clone()));

    // 响应体持有 DropGuard，被丢弃时取消生产者
    stream::unfold((rx, token.drop_guard()), |(mut rx, guard)| async move {
        rx.recv()
            .await
            .map(|chunk| (Ok(Bytes::from(chunk)), (rx, guard)))
    })
}

async fn produce(mut upstream: TextStream, tx: mpsc::Sender<String>, token: CancellationToken) {
    let mut forwarded = 0usize;

    loop {
        let next = tokio::select! {
            _ = token.cancelled() => {
                debug!(forwarded, "客户端已断开，停止转发");
                return;
            }
            next = upstream.next() => next,
        };

        match next {
            Some(Ok(chunk)) => {
                if chunk.is_empty() {
                    continue;
                }
                if tx.send(chunk).await.is_err() {
                    debug!(forwarded, "响应体已关闭，停止转发");
                    return;
                }
                forwarded += 1;
            }
            Some(Err(e)) => {
                warn!(forwarded, "上游流式响应中断: {}", e);
                let _ = tx.send(INTERRUPTED_NOTICE.to_string()).await;
                return;
            }
            None => {
                debug!(forwarded, "流式响应完成");
                return;
            }
        }
    }
}
