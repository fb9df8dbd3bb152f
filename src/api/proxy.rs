use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;

use super::common::{bytes_response, TEXT_CONTENT_TYPE, YAML_CONTENT_TYPE};
use crate::error::GatewayError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ProxyQuery {
    /// 原样返回上游内容
    #[serde(default)]
    pub raw: bool,
}

#[derive(Debug, Deserialize)]
pub struct SubQuery {
    pub sub_name: String,
    #[serde(default)]
    pub raw: bool,
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, GatewayError> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| GatewayError::BadRequest(rejection.body_text()))
}

fn render_response(body: bytes::Bytes, raw: bool) -> Response {
    let content_type = if raw {
        TEXT_CONTENT_TYPE
    } else {
        YAML_CONTENT_TYPE
    };
    bytes_response(content_type, body)
}

pub async fn get_proxy(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ProxyQuery>, QueryRejection>,
) -> Result<Response, GatewayError> {
    let query = query_params(query)?;
    let body = state
        .subscriptions
        .render(&state.storage, None, query.raw)
        .await?;
    Ok(render_response(body, query.raw))
}

pub async fn get_named_proxy(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SubQuery>, QueryRejection>,
) -> Result<Response, GatewayError> {
    let query = query_params(query)?;
    let body = state
        .subscriptions
        .render(&state.storage, Some(&query.sub_name), query.raw)
        .await?;
    Ok(render_response(body, query.raw))
}
