// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 定义对外的请求/响应结构，负责在 HTTP 层与领域模型之间转换
pub mod dto;
