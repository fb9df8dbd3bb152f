//! 上游订阅客户端
//! 单次请求, 固定超时, 不重试

use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;
use url::Url;

use super::error_classifier::classify_fetch_error;
use crate::core::models::SubscriptionConfig;

#[derive(Debug, Error)]
pub enum UpstreamError {
    // 订阅地址本身带着机场 token, 不进入错误消息
    #[error("订阅地址无效: {reason}")]
    InvalidUrl { reason: String },

    #[error("前置代理无效 {url:?}: {source}")]
    InvalidProxy {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("创建 HTTP 客户端失败: {0}")]
    Client(#[source] reqwest::Error),

    #[error("上游不可达: {source}")]
    Unreachable {
        #[source]
        source: reqwest::Error,
    },
}

/// 上游 HTTP 客户端
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    via_proxy: bool,
}

impl UpstreamError {
    /// 错误类型与说明, 仅对网络类错误有意义
    pub fn classify(&self) -> Option<(&'static str, &'static str)> {
        match self {
            UpstreamError::Unreachable { source } => Some(classify_fetch_error(source)),
            _ => None,
        }
    }

    /// 去掉请求地址后的错误, 可以写日志
    pub fn without_url(self) -> Self {
        match self {
            UpstreamError::Unreachable { source } => UpstreamError::Unreachable {
                source: source.without_url(),
            },
            other => other,
        }
    }
}

impl UpstreamClient {
    /// 直连客户端
    pub fn direct(config: &SubscriptionConfig) -> Result<Self, UpstreamError> {
        Self::build(config, None)
    }

    /// 经前置代理的客户端; 未配置前置代理时退化为直连
    pub fn forwarded(config: &SubscriptionConfig) -> Result<Self, UpstreamError> {
        Self::build(config, config.forward_proxy.as_deref())
    }

    fn build(config: &SubscriptionConfig, proxy_url: Option<&str>) -> Result<Self, UpstreamError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.fetch_timeout_secs));

        match proxy_url {
            Some(url) => {
                let proxy = reqwest::Proxy::all(url).map_err(|source| UpstreamError::InvalidProxy {
                    url: url.to_string(),
                    source,
                })?;
                builder = builder.proxy(proxy);
            }
            // 不读取 HTTP(S)_PROXY 环境变量, 直连就是直连
            None => builder = builder.no_proxy(),
        }

        let client = builder.build().map_err(UpstreamError::Client)?;
        Ok(Self {
            client,
            via_proxy: proxy_url.is_some(),
        })
    }

    pub fn via_proxy(&self) -> bool {
        self.via_proxy
    }

    /// 抓取订阅原文
    pub async fn fetch(&self, raw_url: &str) -> Result<Bytes, UpstreamError> {
        let url = Url::parse(raw_url).map_err(|e| UpstreamError::InvalidUrl {
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(UpstreamError::InvalidUrl {
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }

        let started = std::time::Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|source| UpstreamError::Unreachable { source })?;
        let body = response
            .bytes()
            .await
            .map_err(|source| UpstreamError::Unreachable { source })?;

        tracing::debug!(
            "Fetched {} bytes from upstream in {}ms (proxy: {})",
            body.len(),
            started.elapsed().as_millis(),
            self.via_proxy
        );
        Ok(body)
    }
}
