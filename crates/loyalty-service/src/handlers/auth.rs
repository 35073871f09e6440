//! 认证相关的 HTTP 处理器
//!
//! 提供注册和登录 API，成功后通过 Set-Cookie 下发会话令牌

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::info;
use validator::Validate;

use crate::auth::{hash_password, verify_password};
use crate::dto::CredentialsRequest;
use crate::error::{LoyaltyError, Result};
use crate::middleware::SESSION_COOKIE;
use crate::repository::AccountRepository;
use crate::state::AppState;

/// 用户注册
///
/// POST /api/user/register
///
/// 登录名全局唯一，占用时返回 409。注册成功即视为已登录。
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(req) = payload.map_err(|e| LoyaltyError::Malformed(e.to_string()))?;
    req.validate()?;

    let password_hash = hash_password(&req.password)?;

    let accounts = AccountRepository::new(state.pool.clone());
    if !accounts.create(&req.login, &password_hash).await? {
        return Err(LoyaltyError::LoginTaken(req.login));
    }

    info!(login = %req.login, "新用户注册成功");
    Ok(session_response(&state, &req.login))
}

/// 用户登录
///
/// POST /api/user/login
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(req) = payload.map_err(|e| LoyaltyError::Malformed(e.to_string()))?;
    req.validate()?;

    let accounts = AccountRepository::new(state.pool.clone());
    // 用户不存在与密码错误返回同一错误，不向探测者暴露登录名是否已注册
    let stored_hash = accounts
        .find_password_hash(&req.login)
        .await?
        .ok_or(LoyaltyError::InvalidCredentials)?;

    if !verify_password(&req.password, &stored_hash)? {
        return Err(LoyaltyError::InvalidCredentials);
    }

    info!(login = %req.login, "用户登录成功");
    Ok(session_response(&state, &req.login))
}

/// 签发会话并构造带 Set-Cookie 的 200 响应
fn session_response(state: &AppState, login: &str) -> Response {
    let token = state.sessions.issue(login);
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        state.sessions.ttl_seconds()
    );

    (StatusCode::OK, [(header::SET_COOKIE, cookie)]).into_response()
}
