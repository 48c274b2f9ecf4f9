// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

/// 存储错误类型
#[derive(Error, Debug)]
pub enum StorageError {
    /// IO错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// 非法的存储键（绝对路径或包含 `..`）
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
    /// 存储错误
    #[error("Storage error: {0}")]
    Other(String),
}

/// 存储仓库特质
///
/// 保存生成的报告等二进制文件，键为相对路径，如 `reports/<scan>/<id>.pdf`
#[async_trait]
pub trait StorageRepository: Send + Sync {
    /// 使用指定键保存数据
    async fn save(&self, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// 根据键读取数据，不存在时返回 None
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// 根据键删除数据，不存在时视为成功
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// 检查指定键是否存在
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;
}
