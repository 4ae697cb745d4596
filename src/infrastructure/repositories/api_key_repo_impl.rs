// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{sea_query::Expr, *};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::models::api_key::{ApiKey, NewApiKey};
use crate::domain::repositories::api_key_repository::{ApiKeyRepository, RepositoryError};
use crate::infrastructure::database::entities::api_key as api_key_entity;

/// API密钥仓库实现
pub struct ApiKeyRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl ApiKeyRepositoryImpl {
    /// 创建新的API密钥仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn map_model(model: api_key_entity::Model) -> Result<ApiKey, RepositoryError> {
        let environment = model
            .environment
            .parse()
            .map_err(|_| RepositoryError::Database(DbErr::Custom("Invalid key environment".to_string())))?;

        Ok(ApiKey {
            id: model.id,
            name: model.name,
            environment,
            secret: model.secret,
            secret_digest: model.secret_digest,
            usage_count: model.usage_count,
            created_at: model.created_at.into(),
        })
    }
}

#[async_trait]
impl ApiKeyRepository for ApiKeyRepositoryImpl {
    async fn insert(&self, new_key: &NewApiKey) -> Result<ApiKey, RepositoryError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let model = api_key_entity::ActiveModel {
            id: Set(id),
            name: Set(new_key.name.clone()),
            environment: Set(new_key.environment.to_string()),
            secret: Set(new_key.secret.clone()),
            secret_digest: Set(new_key.secret_digest.clone()),
            usage_count: Set(0),
            created_at: Set(now.fixed_offset()),
        };

        model.insert(self.db.as_ref()).await?;

        Ok(ApiKey {
            id,
            name: new_key.name.clone(),
            environment: new_key.environment,
            secret: new_key.secret.clone(),
            secret_digest: new_key.secret_digest.clone(),
            usage_count: 0,
            created_at: now,
        })
    }

    async fn find_all(&self) -> Result<Vec<ApiKey>, RepositoryError> {
        let models = api_key_entity::Entity::find()
            .order_by_desc(api_key_entity::Column::CreatedAt)
            .order_by_desc(api_key_entity::Column::Id)
            .all(self.db.as_ref())
            .await?;

        models.into_iter().map(Self::map_model).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ApiKey>, RepositoryError> {
        let model = api_key_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        model.map(Self::map_model).transpose()
    }

    async fn find_by_digest(&self, digest: &str) -> Result<Option<ApiKey>, RepositoryError> {
        let model = api_key_entity::Entity::find()
            .filter(api_key_entity::Column::SecretDigest.eq(digest))
            .one(self.db.as_ref())
            .await?;

        model.map(Self::map_model).transpose()
    }

    async fn increment_usage(&self, id: Uuid) -> Result<u64, RepositoryError> {
        let result = api_key_entity::Entity::update_many()
            .col_expr(
                api_key_entity::Column::UsageCount,
                Expr::col(api_key_entity::Column::UsageCount).add(1),
            )
            .filter(api_key_entity::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }

    async fn delete(&self, id: Uuid) -> Result<u64, RepositoryError> {
        let result = api_key_entity::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }
}
