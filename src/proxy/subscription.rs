//! 订阅服务
//! 读取订阅地址, 抓取上游, 合并自定义节点, 输出 YAML

use bytes::Bytes;
use serde::Deserialize;
use serde_yaml::Value;

use super::transformer::{transform, TransformOptions};
use super::upstream::{UpstreamClient, UpstreamError};
use crate::core::models::SubscriptionConfig;
use crate::core::storage::is_valid_identifier;
use crate::core::traits::StorageConfig;
use crate::error::GatewayError;

/// 自定义节点文件结构
#[derive(Debug, Default, Deserialize)]
struct CustomNodes {
    #[serde(default)]
    proxies: Vec<Value>,
}

/// 订阅服务
pub struct SubscriptionService {
    direct: UpstreamClient,
    forwarded: UpstreamClient,
    options: TransformOptions,
}

impl SubscriptionService {
    pub fn new(config: &SubscriptionConfig) -> Result<Self, UpstreamError> {
        let forwarded = UpstreamClient::forwarded(config)?;
        if !forwarded.via_proxy() {
            tracing::warn!("No forward proxy configured, named subscriptions will be fetched directly");
        }

        Ok(Self {
            direct: UpstreamClient::direct(config)?,
            forwarded,
            options: TransformOptions::from(config),
        })
    }

    /// 读取订阅地址文件
    pub async fn subscription_url<S: StorageConfig>(
        storage: &S,
        sub_name: Option<&str>,
    ) -> Result<String, GatewayError> {
        if let Some(name) = sub_name {
            if !is_valid_identifier(name) {
                return Err(GatewayError::InvalidIdentifier(name.to_string()));
            }
        }

        let path = storage.subscription_url_path(sub_name);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Proxy configuration error: {:?} not found.", path);
                return Err(GatewayError::SubscriptionNotConfigured(format!(
                    "{:?} not found",
                    path
                )));
            }
            Err(e) => return Err(GatewayError::Storage(format!("读取订阅地址失败: {}", e))),
        };

        let url = content.trim();
        if url.is_empty() {
            tracing::warn!("Proxy configuration error: {:?} is empty.", path);
            return Err(GatewayError::SubscriptionNotConfigured(format!(
                "{:?} is empty",
                path
            )));
        }
        Ok(url.to_string())
    }

    /// 读取自定义节点, 文件不存在时返回 None
    pub async fn custom_nodes<S: StorageConfig>(
        storage: &S,
    ) -> Result<Option<Vec<Value>>, GatewayError> {
        let path = storage.custom_nodes_path();
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(GatewayError::Storage(format!("读取自定义节点失败: {}", e))),
        };

        let nodes: CustomNodes = serde_yaml::from_str(&content)
            .map_err(|e| GatewayError::InvalidCustomNodes(e.to_string()))?;
        Ok(Some(nodes.proxies))
    }

    /// 生成订阅内容
    ///
    /// `sub_name` 为 Some 时使用命名订阅文件并经前置代理抓取;
    /// `raw` 为 true 时原样返回上游内容.
    pub async fn render<S: StorageConfig>(
        &self,
        storage: &S,
        sub_name: Option<&str>,
        raw: bool,
    ) -> Result<Bytes, GatewayError> {
        let url = Self::subscription_url(storage, sub_name).await?;
        let client = if sub_name.is_some() {
            &self.forwarded
        } else {
            &self.direct
        };

        let body = client.fetch(&url).await?;
        if raw {
            return Ok(body);
        }

        let document: Value = serde_yaml::from_slice(&body).map_err(|e| {
            tracing::warn!("Failed to parse upstream proxy config: {}", e);
            GatewayError::MalformedUpstream(format!("上游配置不是合法的 YAML: {}", e))
        })?;
        let custom_nodes = Self::custom_nodes(storage).await?;

        let document = transform(document, custom_nodes.as_deref(), &self.options)?;
        let yaml = serde_yaml::to_string(&document)
            .map_err(|e| GatewayError::Storage(format!("序列化配置失败: {}", e)))?;
        Ok(Bytes::from(yaml))
    }
}
