//! 积分账本服务（C端）
//!
//! 提供订单提交、积分余额、提现等 REST API，
//! 并运行后台对账任务轮询外部结算系统。

use std::sync::Arc;
use std::time::Duration;

use axum::{Json, Router, routing::get};
use loyalty_service::{
    AccrualWorker, HttpAccrualClient, OrderRepository, middleware::auth_middleware, routes,
    state::AppState,
};
use loyalty_shared::{config::AppConfig, database::Database, observability, session::SessionStore};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::{
    compression::CompressionLayer, decompression::RequestDecompressionLayer,
    timeout::TimeoutLayer, trace::TraceLayer,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 统一加载配置：config/*.toml + LOYALTY_* 环境变量
    let config = AppConfig::load("loyalty-service").unwrap_or_default();

    observability::init(&config.observability)?;

    info!("Starting loyalty-service on {}", config.server_addr());

    // 初始化基础设施：数据库不可达属于启动期致命错误，直接退出
    let db = Database::connect(&config.database).await?;
    db.run_migrations(&sqlx::migrate!("../../migrations")).await?;

    let sessions = Arc::new(SessionStore::new(config.session.ttl_seconds));
    let state = AppState::new(db.pool().clone(), sessions);

    // 启动对账 Worker，通过 watch 通道下发停止信号
    let accrual_client = HttpAccrualClient::new(&config.accrual)
        .map_err(|e| anyhow::anyhow!("结算系统客户端初始化失败: {e}"))?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = AccrualWorker::new(
        OrderRepository::new(db.pool().clone()),
        accrual_client,
        Duration::from_secs(config.accrual.poll_interval_seconds),
    );
    let worker_handle = tokio::spawn(worker.run(shutdown_rx));

    let app = Router::new()
        .nest("/api/user", routes::user_routes())
        .route("/health", get(health_check))
        .route(
            "/ready",
            get({
                let db_for_ready = db.clone();
                move || readiness_check(db_for_ready.clone())
            }),
        )
        // 认证中间件：解析会话 Cookie
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        // 请求体 gzip 解压（客户端可能压缩上传）
        .layer(RequestDecompressionLayer::new())
        // 响应 gzip 压缩
        .layer(CompressionLayer::new())
        // 请求超时兜底，防止慢客户端长期占用连接
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        // 请求追踪日志
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    // 优雅关闭：收到 SIGTERM 或 Ctrl+C 时停止接收新连接并等待已有请求完成
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // HTTP 已停，再停对账 Worker：当前 tick 内的订单处理会完成，各订单写入原子
    let _ = shutdown_tx.send(true);
    let _ = worker_handle.await;

    db.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// 监听关闭信号
///
/// K8s 通过 SIGTERM 通知进程停止；本地开发通过 Ctrl+C。
/// 收到任一信号后返回，触发 axum 的优雅关闭流程。
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("注册 Ctrl+C 处理器失败");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("注册 SIGTERM 处理器失败")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}

/// 存活探针：服务进程正常即返回 ok
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "loyalty-service"
    }))
}

/// 就绪探针：检查数据库连接是否可用
async fn readiness_check(db: Database) -> Json<serde_json::Value> {
    let db_ok = db.health_check().await.is_ok();

    Json(serde_json::json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "service": "loyalty-service",
        "checks": {
            "database": if db_ok { "ok" } else { "fail" }
        }
    }))
}
