//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射

use axum::{
    Router,
    routing::{get, post},
};

use crate::{handlers, state::AppState};

/// 构建用户 API 路由（挂载于 /api/user）
///
/// register/login 为公开路由，其余路由由认证中间件保护。
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/orders", post(handlers::orders::submit_order))
        .route("/orders", get(handlers::orders::list_orders))
        .route("/balance", get(handlers::balance::get_balance))
        .route("/balance/withdraw", post(handlers::balance::withdraw))
        .route(
            "/balance/withdrawals",
            get(handlers::balance::list_withdrawals),
        )
}
