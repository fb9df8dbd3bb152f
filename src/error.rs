//! 网关错误类型与 HTTP 状态码映射

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::core::auth::AuthError;
use crate::core::models::Capability;
use crate::core::storage::VaultError;
use crate::proxy::transformer::TransformError;
use crate::proxy::upstream::UpstreamError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("需要登录, 或用户不存在")]
    Unauthenticated,

    #[error("当前操作需要权限: {capability}, 用户 {username} 无该权限")]
    Forbidden {
        capability: Capability,
        username: String,
    },

    #[error("{0}")]
    UpstreamUnreachable(String),

    #[error("{0}")]
    MalformedUpstream(String),

    #[error("订阅未配置: {0}")]
    SubscriptionNotConfigured(String),

    #[error("自定义节点无效: {0}")]
    InvalidCustomNodes(String),

    #[error("非法的配置名: {0:?}")]
    InvalidIdentifier(String),

    #[error("配置已存在: {0}")]
    AlreadyExists(String),

    #[error("请求参数错误: {0}")]
    BadRequest(String),

    #[error("资源不存在: {0}")]
    NotFound(String),

    #[error("存储错误: {0}")]
    Storage(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Unauthenticated => StatusCode::UNAUTHORIZED,
            GatewayError::Forbidden { .. } => StatusCode::FORBIDDEN,
            GatewayError::UpstreamUnreachable(_) | GatewayError::MalformedUpstream(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            GatewayError::InvalidIdentifier(_)
            | GatewayError::AlreadyExists(_)
            | GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::SubscriptionNotConfigured(_)
            | GatewayError::InvalidCustomNodes(_)
            | GatewayError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed with {}", status);
        } else {
            tracing::debug!(error = %self, "Request rejected with {}", status);
        }

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<AuthError> for GatewayError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Unauthenticated => GatewayError::Unauthenticated,
            AuthError::Forbidden {
                capability,
                username,
            } => GatewayError::Forbidden {
                capability,
                username,
            },
        }
    }
}

impl From<VaultError> for GatewayError {
    fn from(e: VaultError) -> Self {
        match e {
            VaultError::InvalidIdentifier(id) => GatewayError::InvalidIdentifier(id),
            VaultError::AlreadyExists(id) => GatewayError::AlreadyExists(id),
            other => GatewayError::Storage(other.to_string()),
        }
    }
}

impl From<TransformError> for GatewayError {
    fn from(e: TransformError) -> Self {
        match e {
            TransformError::MalformedUpstream(_) => GatewayError::MalformedUpstream(e.to_string()),
            TransformError::InvalidCustomNode(_) => GatewayError::InvalidCustomNodes(e.to_string()),
        }
    }
}

impl From<UpstreamError> for GatewayError {
    fn from(e: UpstreamError) -> Self {
        // 返回给调用方的消息不带订阅地址, 细节只进日志
        let (kind, hint) = e.classify().unwrap_or(("config_error", "subscription is misconfigured"));
        let e = e.without_url();
        match e {
            UpstreamError::InvalidUrl { .. } => GatewayError::SubscriptionNotConfigured(e.to_string()),
            UpstreamError::Unreachable { .. } => {
                tracing::warn!("Upstream fetch failed [{}]: {}", kind, e);
                GatewayError::UpstreamUnreachable(format!("上游不可达: {}", hint))
            }
            UpstreamError::InvalidProxy { .. } | UpstreamError::Client(_) => {
                tracing::error!("HTTP client setup failed: {}", e);
                GatewayError::Storage("HTTP 客户端配置错误".to_string())
            }
        }
    }
}
