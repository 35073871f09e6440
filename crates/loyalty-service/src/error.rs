//! C端积分服务错误类型定义
//!
//! 包含所有对外 API 可能产生的错误及其到 HTTP 状态码的映射

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// C端积分服务错误类型
#[derive(Debug, thiserror::Error)]
pub enum LoyaltyError {
    // 认证错误
    #[error("未授权: {0}")]
    Unauthorized(String),
    #[error("用户名或密码错误")]
    InvalidCredentials,

    // 验证错误
    #[error("请求格式错误: {0}")]
    Malformed(String),
    #[error("订单号校验失败")]
    InvalidOrderNumber,

    // 冲突错误
    #[error("登录名已被占用: {0}")]
    LoginTaken(String),
    #[error("订单号已被其他用户提交: {0}")]
    OrderOwnedByOther(String),

    // 资源错误
    #[error("积分余额不足")]
    InsufficientBalance,

    // 系统错误
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl LoyaltyError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,

            Self::Malformed(_) => StatusCode::BAD_REQUEST,
            // 订单号未通过 Luhn 校验，请求体本身是合法的数字串，用 422 区分于 400
            Self::InvalidOrderNumber => StatusCode::UNPROCESSABLE_ENTITY,

            Self::LoginTaken(_) | Self::OrderOwnedByOther(_) => StatusCode::CONFLICT,

            Self::InsufficientBalance => StatusCode::PAYMENT_REQUIRED,

            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Malformed(_) => "MALFORMED_REQUEST",
            Self::InvalidOrderNumber => "INVALID_ORDER_NUMBER",
            Self::LoginTaken(_) => "LOGIN_TAKEN",
            Self::OrderOwnedByOther(_) => "ORDER_OWNED_BY_OTHER",
            Self::InsufficientBalance => "INSUFFICIENT_BALANCE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for LoyaltyError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志，防止信息泄露
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for LoyaltyError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Malformed(errors.to_string())
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, LoyaltyError>;
