//! 共享剪贴板
//!
//! 内容是一个整体替换的 `Bytes`, 后写入者覆盖先写入者.

use bytes::Bytes;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct Clipboard {
    content: RwLock<Bytes>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn read(&self) -> Bytes {
        self.content.read().await.clone()
    }

    pub async fn replace(&self, content: Bytes) {
        *self.content.write().await = content;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_starts_empty() {
        assert!(Clipboard::new().read().await.is_empty());
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let clipboard = Clipboard::new();
        clipboard.replace(Bytes::from_static(b"first")).await;
        clipboard.replace(Bytes::from_static(b"second")).await;
        assert_eq!(clipboard.read().await, Bytes::from_static(b"second"));
    }

    #[tokio::test]
    async fn test_readers_see_whole_values() {
        let clipboard = Arc::new(Clipboard::new());
        let a = Bytes::from(vec![b'a'; 4096]);
        let b = Bytes::from(vec![b'b'; 4096]);

        let writer = {
            let clipboard = clipboard.clone();
            let (a, b) = (a.clone(), b.clone());
            tokio::spawn(async move {
                for i in 0..200 {
                    let next = if i % 2 == 0 { a.clone() } else { b.clone() };
                    clipboard.replace(next).await;
                }
            })
        };

        for _ in 0..200 {
            let seen = clipboard.read().await;
            assert!(seen.is_empty() || seen == a || seen == b);
        }
        writer.await.unwrap();
    }
}
