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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含数据库、服务器和API密钥等所有配置项
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 服务器配置
    pub server: ServerSettings,
    /// API密钥配置
    pub auth: AuthSettings,
}

/// 数据库配置设置
#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// 服务器配置设置
#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// API密钥配置设置
#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    /// 密钥命名空间，作为所有密钥的前缀
    pub key_namespace: String,
    /// 查找摘要密钥（服务端HMAC密钥，不参与密钥本身的生成）
    pub lookup_pepper: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            // Default DB pool settings
            .set_default("database.max_connections", 100)?
            .set_default("database.min_connections", 10)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Default auth settings
            .set_default("auth.key_namespace", "junfan")?
            .set_default("auth.lookup_pepper", "your-lookup-pepper")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("JUNFAN").separator("__"));

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
