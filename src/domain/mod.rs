// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：单次评估中流转的实体
/// - 评分抽象（scoring）：向量化器与分类器接口
/// - 信誉源抽象（reputation）：外部黑名单接口
/// - 叙述抽象（narrative）：生成式文本提供方接口
/// - 服务（services）：各信号组件与裁决逻辑
///
/// 领域层不依赖任何具体的外部实现，所有远程调用和模型文件
/// 都通过 trait 注入。
pub mod models;
pub mod narrative;
pub mod reputation;
pub mod scoring;
pub mod services;
