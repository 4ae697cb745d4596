// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::key_service::KeyService;
use crate::presentation::handlers::{key_handler, playground_handler};
use crate::presentation::middleware::auth_middleware::{auth_middleware, AuthState};
use axum::{
    routing::{delete, get, post},
    Extension, Router,
};
use std::sync::Arc;

/// 创建应用路由
///
/// # 参数
///
/// * `service` - 密钥生命周期服务
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes(service: Arc<KeyService>) -> Router {
    let auth_state = AuthState {
        service: service.clone(),
    };

    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version))
        .route(
            "/v1/keys",
            get(key_handler::list_keys).post(key_handler::create_key),
        )
        .route("/v1/keys/{id}", delete(key_handler::revoke_key))
        .route("/v1/keys/{id}/secret", get(key_handler::reveal_key))
        .route(
            "/v1/playground/validate",
            post(playground_handler::validate_key),
        );

    let protected_routes = Router::new()
        .route("/v1/protected", get(playground_handler::protected))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(Extension(service))
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
