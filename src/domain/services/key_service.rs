// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use hmac::{Hmac, Mac};
use metrics::counter;
use sha2::Sha256;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use thiserror::Error;
use uuid::Uuid;

use crate::config::settings::AuthSettings;
use crate::domain::models::api_key::{
    mask_secret, ApiKey, ApiKeyView, KeyEnvironment, NewApiKey,
};
use crate::domain::repositories::api_key_repository::{ApiKeyRepository, RepositoryError};

/// 密钥服务错误类型
#[derive(Error, Debug)]
pub enum KeyServiceError {
    /// 调用方输入无效，不应自动重试
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// 目标密钥不存在（对调用方通常无害）
    #[error("API key not found")]
    NotFound,
    /// 密钥验证失败，与 NotFound 区分以避免向不可信调用方泄露存在性
    #[error("Invalid API key")]
    InvalidKey,
    /// 密钥存储不可用或事务失败（暂时性，由调用方决定是否退避重试）
    #[error("Storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// API密钥生命周期服务
///
/// 掌管密钥的铸造、列表、掩码、验证与吊销规则。服务本身无状态，
/// 全部持久状态都在密钥存储中；并发调用之间不共享可变状态。
pub struct KeyService {
    repo: Arc<dyn ApiKeyRepository>,
    namespace: String,
    lookup_pepper: String,
}

type HmacSha256 = Hmac<Sha256>;

impl KeyService {
    /// 创建新的密钥服务实例
    pub fn new(repo: Arc<dyn ApiKeyRepository>, auth: &AuthSettings) -> Self {
        Self {
            repo,
            namespace: auth.key_namespace.clone(),
            lookup_pepper: auth.lookup_pepper.clone(),
        }
    }

    /// 铸造新密钥
    ///
    /// 唯一默认返回明文密钥的操作。`name` 去除首尾空白后不得为空。
    /// 密钥格式：`{namespace}-{tag}-{uuid-v4}`，随机后缀来自密码学
    /// 安全随机源，碰撞概率在构造上即可忽略，不再查库确认。
    ///
    /// # 参数
    ///
    /// * `name` - 密钥显示名称
    /// * `environment` - 密钥环境分类
    ///
    /// # 返回值
    ///
    /// * `Ok(ApiKey)` - 完整的密钥记录，含明文
    /// * `Err(KeyServiceError)` - 输入无效或存储失败
    pub async fn mint(
        &self,
        name: &str,
        environment: KeyEnvironment,
    ) -> Result<ApiKey, KeyServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(KeyServiceError::InvalidArgument(
                "Key name cannot be empty".to_string(),
            ));
        }

        let secret = self.generate_secret(environment);
        let new_key = NewApiKey {
            name: name.to_string(),
            environment,
            secret_digest: self.lookup_digest(&secret),
            secret,
        };

        let key = self.repo.insert(&new_key).await?;

        counter!("api_keys_minted_total", "environment" => environment.to_string())
            .increment(1);
        tracing::info!(
            "Minted {} API key {} ({})",
            key.environment,
            key.id,
            mask_secret(&key.secret)
        );

        Ok(key)
    }

    /// 列出密钥（掩码视图）
    ///
    /// 按创建时间降序排列，并列时按ID降序。可选的过滤串对名称
    /// 做大小写不敏感的子串匹配，过滤发生在取回之后、掩码之前。
    pub async fn list(&self, filter: Option<&str>) -> Result<Vec<ApiKeyView>, KeyServiceError> {
        let keys = self.repo.find_all().await?;

        let needle = filter
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_lowercase);

        Ok(keys
            .into_iter()
            .filter(|key| match &needle {
                Some(needle) => key.name.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .map(ApiKeyView::from)
            .collect())
    }

    /// 查看密钥明文
    ///
    /// 显式的明文访问器。掩码是单向的展示变换，服务绝不从掩码
    /// 还原明文，明文只能来自存储。
    pub async fn reveal(&self, id: Uuid) -> Result<String, KeyServiceError> {
        match self.repo.find_by_id(id).await? {
            Some(key) => Ok(key.secret),
            None => Err(KeyServiceError::NotFound),
        }
    }

    /// 验证密钥
    ///
    /// 去除首尾空白后按查找摘要精确匹配。摘要命中后再对存储值与
    /// 提交值做常量时间比较，避免时序侧信道。格式错误、未知密钥
    /// 与摘要碰撞一律返回 `InvalidKey`，不泄露失败原因。
    ///
    /// 命中后通过存储的单行原子更新将使用计数加一；两个并发验证
    /// 必须都成功且计数净增二。若自增影响零行（并发吊销），结果
    /// 同样是 `InvalidKey`。
    pub async fn validate(&self, presented: &str) -> Result<ApiKey, KeyServiceError> {
        let presented = presented.trim();
        let digest = self.lookup_digest(presented);

        let key = match self.repo.find_by_digest(&digest).await? {
            Some(key) => key,
            None => {
                counter!("api_key_validations_total", "outcome" => "invalid").increment(1);
                return Err(KeyServiceError::InvalidKey);
            }
        };

        // Digest collision or pepper reuse across stores: the stored secret decides
        if !bool::from(key.secret.as_bytes().ct_eq(presented.as_bytes())) {
            counter!("api_key_validations_total", "outcome" => "invalid").increment(1);
            return Err(KeyServiceError::InvalidKey);
        }

        let affected = self.repo.increment_usage(key.id).await?;
        if affected == 0 {
            // Revoked between lookup and increment
            counter!("api_key_validations_total", "outcome" => "invalid").increment(1);
            return Err(KeyServiceError::InvalidKey);
        }

        counter!("api_key_validations_total", "outcome" => "success").increment(1);
        tracing::debug!("Validated API key {}", key.id);

        Ok(ApiKey {
            usage_count: key.usage_count + 1,
            ..key
        })
    }

    /// 吊销密钥
    ///
    /// 从存储中硬删除。删除不存在的ID返回 `NotFound`，调用方可视
    /// 同成功。没有级联清理。
    pub async fn revoke(&self, id: Uuid) -> Result<(), KeyServiceError> {
        let affected = self.repo.delete(id).await?;
        if affected == 0 {
            return Err(KeyServiceError::NotFound);
        }

        counter!("api_keys_revoked_total").increment(1);
        tracing::info!("Revoked API key {}", id);
        Ok(())
    }

    /// 生成密钥明文
    ///
    /// 密钥生成的唯一入口，按环境标签参数化。命名空间与标签不属
    /// 于敏感信息；随机后缀除铸造和显式查看外绝不完整输出。
    fn generate_secret(&self, environment: KeyEnvironment) -> String {
        format!(
            "{}-{}-{}",
            self.namespace,
            environment.tag(),
            Uuid::new_v4()
        )
    }

    /// 计算查找摘要
    ///
    /// 服务端加盐的 HMAC-SHA256，作为验证查找列，避免对明文列做
    /// 等值扫描。
    fn lookup_digest(&self, secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.lookup_pepper.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(secret.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

#[cfg(test)]
#[path = "key_service_test.rs"]
mod tests;
