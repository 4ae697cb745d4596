// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含核心业务规则：
/// - 密钥生命周期服务（key_service）：铸造、列表、查看、验证、吊销
pub mod key_service;
