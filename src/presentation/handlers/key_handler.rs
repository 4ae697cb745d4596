// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::models::api_key::{ApiKey, KeyEnvironment};
use crate::domain::services::key_service::{KeyService, KeyServiceError};
use crate::presentation::errors::AppError;

/// 创建密钥的请求DTO
#[derive(Debug, Clone, Deserialize)]
pub struct CreateKeyRequest {
    /// 密钥显示名称
    pub name: String,
    /// 密钥环境（development 或 production）
    pub environment: String,
}

/// 创建密钥的响应DTO
///
/// 铸造是唯一默认返回明文密钥的操作
#[derive(Debug, Clone, Serialize)]
pub struct CreatedKeyResponse {
    pub id: Uuid,
    pub name: String,
    pub environment: KeyEnvironment,
    pub secret: String,
    pub usage_count: i64,
    pub rate_limit_rpm: u32,
    pub created_at: DateTime<Utc>,
}

impl From<ApiKey> for CreatedKeyResponse {
    fn from(key: ApiKey) -> Self {
        CreatedKeyResponse {
            id: key.id,
            name: key.name,
            environment: key.environment,
            rate_limit_rpm: key.environment.rate_limit_rpm(),
            secret: key.secret,
            usage_count: key.usage_count,
            created_at: key.created_at,
        }
    }
}

/// 列表查询参数
#[derive(Debug, Default, Deserialize)]
pub struct ListKeysQuery {
    /// 名称过滤串（大小写不敏感的子串匹配）
    pub search: Option<String>,
}

/// 创建新密钥
pub async fn create_key(
    Extension(service): Extension<Arc<KeyService>>,
    Json(request): Json<CreateKeyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let environment: KeyEnvironment = request
        .environment
        .parse()
        .map_err(|_| KeyServiceError::InvalidArgument(format!(
            "Environment must be development or production, got {:?}",
            request.environment
        )))?;

    let key = service.mint(&request.name, environment).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": CreatedKeyResponse::from(key)
        })),
    ))
}

/// 列出密钥（掩码视图）
pub async fn list_keys(
    Extension(service): Extension<Arc<KeyService>>,
    Query(query): Query<ListKeysQuery>,
) -> Result<impl IntoResponse, AppError> {
    let keys = service.list(query.search.as_deref()).await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": keys
        })),
    ))
}

/// 查看密钥明文
///
/// 对应界面上的「显示/复制」操作
pub async fn reveal_key(
    Extension(service): Extension<Arc<KeyService>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let secret = service.reveal(id).await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": { "id": id, "secret": secret }
        })),
    ))
}

/// 吊销密钥
pub async fn revoke_key(
    Extension(service): Extension<Arc<KeyService>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    service.revoke(id).await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "success": true })),
    ))
}
