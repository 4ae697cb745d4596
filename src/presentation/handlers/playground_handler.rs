// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use crate::domain::models::api_key::ApiKey;
use crate::domain::services::key_service::{KeyService, KeyServiceError};

/// 验证密钥的请求DTO
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateKeyRequest {
    /// 待验证的密钥明文
    pub api_key: String,
}

/// 验证密钥
///
/// 游乐场端点：验证成功时使用计数加一。所有失败形态对外
/// 统一报告为同一个 401 响应，不泄露失败原因。
pub async fn validate_key(
    Extension(service): Extension<Arc<KeyService>>,
    Json(request): Json<ValidateKeyRequest>,
) -> impl IntoResponse {
    match service.validate(&request.api_key).await {
        Ok(key) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "message": "Valid API key",
                    "name": key.name,
                    "environment": key.environment,
                    "usage_count": key.usage_count,
                    "rate_limit_rpm": key.environment.rate_limit_rpm(),
                }
            })),
        )
            .into_response(),
        Err(KeyServiceError::Storage(e)) => {
            error!("Failed to validate API key: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": "Failed to process request due to internal error."
                })),
            )
                .into_response()
        }
        Err(_) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "success": false,
                "error": "Invalid API key"
            })),
        )
            .into_response(),
    }
}

/// 受保护端点
///
/// 只有携带有效密钥（经认证中间件验证）的请求才能到达这里
pub async fn protected(Extension(key): Extension<ApiKey>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": {
                "message": "You have accessed the protected endpoint with a valid API key.",
                "name": key.name,
                "environment": key.environment,
                "usage_count": key.usage_count,
                "rate_limit_rpm": key.environment.rate_limit_rpm(),
            }
        })),
    )
}
