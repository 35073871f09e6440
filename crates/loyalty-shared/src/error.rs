//! 统一错误处理模块
//!
//! 定义基础设施层共享的错误类型，使用 thiserror 提供良好的错误信息。

use thiserror::Error;

/// 基础设施错误类型
#[derive(Debug, Error)]
pub enum SharedError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("数据库迁移失败: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, SharedError>;

impl SharedError {
    /// 是否为可重试错误
    ///
    /// 基础设施层的瞬时故障（连接池满、网络抖动）可以重试，
    /// 迁移失败属于启动期致命错误，不应重试。
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}
