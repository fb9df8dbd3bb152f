//! 权限网关中间件
//!
//! token 依次从 cookie, query 参数, header 中读取, 名字都是 `auth_token`,
//! 先找到的生效. 通过校验后把 [`UserRecord`] 放进请求扩展.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};

use crate::core::auth::AuthMode;
use crate::core::models::{Capability, UserRecord};
use crate::error::GatewayError;
use crate::state::AppState;

pub const TOKEN_NAME: &str = "auth_token";

/// 提取请求中的 token: cookie > query > header
pub fn extract_token(headers: &HeaderMap, query: Option<&str>) -> Option<String> {
    cookie_token(headers)
        .or_else(|| query_token(query))
        .or_else(|| header_token(headers))
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == TOKEN_NAME && !value.is_empty())
        .map(|(_, value)| value.trim_matches('"').to_string())
}

fn query_token(query: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(name, value)| name == TOKEN_NAME && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

fn header_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(TOKEN_NAME)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// 网关中间件状态: 认证模式 + 路由所需权限
#[derive(Clone)]
pub struct Gate {
    auth: Arc<AuthMode>,
    required: &'static [Capability],
}

impl Gate {
    pub fn new(state: &Arc<AppState>, required: &'static [Capability]) -> Self {
        Self {
            auth: state.auth.clone(),
            required,
        }
    }
}

pub async fn authorize(
    State(gate): State<Gate>,
    mut req: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let token = extract_token(req.headers(), req.uri().query());
    let user: UserRecord = gate.auth.authorize(token.as_deref(), gate.required)?;

    tracing::debug!(
        "Authorized {} for {} {}",
        user.username,
        req.method(),
        req.uri().path()
    );
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// 给路由挂上权限检查
pub fn guarded(
    state: &Arc<AppState>,
    required: &'static [Capability],
    route: MethodRouter<Arc<AppState>>,
) -> MethodRouter<Arc<AppState>> {
    route.route_layer(middleware::from_fn_with_state(
        Gate::new(state, required),
        authorize,
    ))
}
