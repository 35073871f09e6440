//! 中间件模块
//!
//! 提供基于会话 Cookie 的认证中间件

mod auth;

pub use auth::{AuthUser, SESSION_COOKIE, auth_middleware};
