// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Number of mask characters shown in place of the secret's random suffix.
/// Fixed so the displayed length never reveals the true secret length.
pub const SECRET_MASK_LEN: usize = 22;

/// 密钥环境分类
///
/// 决定密钥的环境标签以及建议性的速率限制等级。
/// 速率限制仅作为元数据展示，本服务不做任何强制。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEnvironment {
    Development,
    Production,
}

impl KeyEnvironment {
    /// 密钥字符串中使用的环境标签
    pub fn tag(&self) -> &'static str {
        match self {
            KeyEnvironment::Development => "dev",
            KeyEnvironment::Production => "prod",
        }
    }

    /// 建议性速率限制等级（每分钟请求数）
    pub fn rate_limit_rpm(&self) -> u32 {
        match self {
            KeyEnvironment::Development => 100,
            KeyEnvironment::Production => 1000,
        }
    }
}

impl std::fmt::Display for KeyEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyEnvironment::Development => write!(f, "development"),
            KeyEnvironment::Production => write!(f, "production"),
        }
    }
}

#[derive(Error, Debug)]
#[error("Unknown key environment: {0}")]
pub struct UnknownEnvironment(String);

impl FromStr for KeyEnvironment {
    type Err = UnknownEnvironment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(KeyEnvironment::Development),
            "production" => Ok(KeyEnvironment::Production),
            other => Err(UnknownEnvironment(other.to_string())),
        }
    }
}

/// API密钥实体
///
/// `secret` 以明文存储（产品要求随时可复制），`secret_digest`
/// 是服务端加盐摘要，仅用于验证时的索引查找，永不对外返回。
#[derive(Debug, Clone, PartialEq)]
pub struct ApiKey {
    pub id: Uuid,
    pub name: String,
    pub environment: KeyEnvironment,
    pub secret: String,
    pub secret_digest: String,
    pub usage_count: i64,
    pub created_at: DateTime<Utc>,
}

/// 待插入的API密钥记录
///
/// `id` 和 `created_at` 由密钥存储在插入时分配。
#[derive(Debug, Clone)]
pub struct NewApiKey {
    pub name: String,
    pub environment: KeyEnvironment,
    pub secret: String,
    pub secret_digest: String,
}

/// API密钥展示视图
///
/// 列表返回的形态：密钥以掩码形式出现，明文只能通过铸造
/// 或显式的查看操作获得。
#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyView {
    pub id: Uuid,
    pub name: String,
    pub environment: KeyEnvironment,
    pub masked_secret: String,
    pub usage_count: i64,
    pub rate_limit_rpm: u32,
    pub created_at: DateTime<Utc>,
}

impl From<ApiKey> for ApiKeyView {
    fn from(key: ApiKey) -> Self {
        ApiKeyView {
            id: key.id,
            name: key.name,
            environment: key.environment,
            masked_secret: mask_secret(&key.secret),
            usage_count: key.usage_count,
            rate_limit_rpm: key.environment.rate_limit_rpm(),
            created_at: key.created_at,
        }
    }
}

/// 对密钥进行掩码处理
///
/// 保留 `{namespace}-{tag}-` 前缀（前缀不属于敏感信息），
/// 其余部分替换为固定长度的掩码字符。纯函数，不访问存储。
pub fn mask_secret(secret: &str) -> String {
    let mask = "*".repeat(SECRET_MASK_LEN);
    // Prefix ends at the second separator; anything after it is the random suffix
    let prefix_end = secret
        .char_indices()
        .filter(|(_, c)| *c == '-')
        .map(|(i, _)| i)
        .nth(1);

    match prefix_end {
        Some(i) => format!("{}-{}", &secret[..i], mask),
        // Unrecognized shape: mask everything, still fixed length
        None => mask,
    }
}
