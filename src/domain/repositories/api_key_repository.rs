// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::models::api_key::{ApiKey, NewApiKey};

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
}

/// API密钥仓库特质
///
/// 定义密钥存储的数据访问接口。排序和计数自增都由存储保证：
/// 自增必须是单行原子更新，不允许读取后回写。
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    /// 插入新密钥，由存储分配 `id` 和 `created_at`
    async fn insert(&self, new_key: &NewApiKey) -> Result<ApiKey, RepositoryError>;
    /// 列出全部密钥（created_at 降序，id 降序打破并列）
    async fn find_all(&self) -> Result<Vec<ApiKey>, RepositoryError>;
    /// 根据ID查找密钥
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ApiKey>, RepositoryError>;
    /// 根据查找摘要查找密钥
    async fn find_by_digest(&self, digest: &str) -> Result<Option<ApiKey>, RepositoryError>;
    /// 原子地将使用计数加一，返回受影响的行数
    async fn increment_usage(&self, id: Uuid) -> Result<u64, RepositoryError>;
    /// 根据ID删除密钥，返回受影响的行数
    async fn delete(&self, id: Uuid) -> Result<u64, RepositoryError>;
}
