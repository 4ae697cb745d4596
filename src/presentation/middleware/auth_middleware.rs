// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::domain::models::api_key::mask_secret;
use crate::domain::services::key_service::{KeyService, KeyServiceError};

/// 认证状态
#[derive(Clone)]
pub struct AuthState {
    /// 密钥生命周期服务
    pub service: Arc<KeyService>,
}

/// 认证中间件
///
/// 验证请求中的API密钥。通过验证即记一次使用；验证后的密钥
/// 记录注入请求扩展，供下游处理器读取。
///
/// # 参数
///
/// * `state` - 认证状态
/// * `req` - HTTP请求
/// * `next` - 下一个中间件
///
/// # 返回值
///
/// * `Ok(Response)` - 认证成功的响应
/// * `Err(StatusCode)` - 认证失败的状态码
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    debug!("AuthMiddleware processing path: {}", req.uri().path());

    let token = {
        let auth_header = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|header| header.to_str().ok())
            .ok_or(StatusCode::UNAUTHORIZED)?;

        if !auth_header.starts_with("Bearer ") {
            return Err(StatusCode::UNAUTHORIZED);
        }

        auth_header[7..].to_string()
    };

    match state.service.validate(&token).await {
        Ok(key) => {
            req.extensions_mut().insert(key);
            Ok(next.run(req).await)
        }
        Err(KeyServiceError::Storage(e)) => {
            tracing::error!("Storage error checking API key: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
        Err(_) => {
            tracing::warn!("Rejected API key {}", mask_secret(token.trim()));
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

#[cfg(test)]
#[path = "auth_middleware_test.rs"]
mod tests;
