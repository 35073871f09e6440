//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use loyalty_shared::session::SessionStore;
use sqlx::PgPool;
use std::sync::Arc;

/// Axum 应用共享状态
///
/// 包含数据库连接池和会话存储，通过 Arc 在 handler 间共享
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL 连接池
    pub pool: PgPool,
    /// 内存会话存储
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(pool: PgPool, sessions: Arc<SessionStore>) -> Self {
        Self { pool, sessions }
    }
}
