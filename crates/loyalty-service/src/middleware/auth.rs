//! 会话认证中间件
//!
//! 从请求 Cookie 中提取会话令牌，解析出用户身份后注入请求扩展。
//! 对于公开路由（注册、登录、健康检查），跳过验证。

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::state::AppState;

/// 会话 Cookie 名称
pub const SESSION_COOKIE: &str = "loyalty_session";

/// 已认证的用户身份，由认证中间件注入请求扩展
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

/// 认证中间件
///
/// 解析 Cookie 头中的会话令牌并在会话存储中查找，
/// 命中后将 [`AuthUser`] 注入请求扩展，供后续处理器使用。
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path();

    // 公开路由列表（不需要认证）
    let public_paths = ["/api/user/register", "/api/user/login", "/health", "/ready"];

    if public_paths.contains(&path) {
        return next.run(request).await;
    }

    let token = request
        .headers()
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|raw| cookie_value(raw, SESSION_COOKIE));

    let Some(token) = token else {
        return unauthorized_response("缺少会话 Cookie");
    };

    match state.sessions.resolve(&token) {
        Some(login) => {
            request.extensions_mut().insert(AuthUser(login));
            next.run(request).await
        }
        None => unauthorized_response("会话无效或已过期"),
    }
}

/// 从 Cookie 头原文中取出指定名称的值
///
/// Cookie 头格式为 `name1=value1; name2=value2`，名称区分大小写。
fn cookie_value(raw: &str, name: &str) -> Option<String> {
    raw.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then(|| v.to_string())
    })
}

/// 生成 401 未授权响应
fn unauthorized_response(message: &str) -> Response {
    let body = json!({
        "success": false,
        "code": "UNAUTHORIZED",
        "message": message,
        "data": null
    });

    (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_value_single() {
        assert_eq!(
            cookie_value("loyalty_session=abc123", SESSION_COOKIE),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn test_cookie_value_among_many() {
        let raw = "theme=dark; loyalty_session=tok_42; lang=zh-CN";
        assert_eq!(
            cookie_value(raw, SESSION_COOKIE),
            Some("tok_42".to_string())
        );
    }

    #[test]
    fn test_cookie_value_missing() {
        assert_eq!(cookie_value("theme=dark; lang=zh", SESSION_COOKIE), None);
        assert_eq!(cookie_value("", SESSION_COOKIE), None);
    }

    /// base64 令牌可能包含 '='（padding 关闭时不会，但解析不应依赖这一点）
    #[test]
    fn test_cookie_value_with_equals_in_value() {
        assert_eq!(
            cookie_value("loyalty_session=a=b=c", SESSION_COOKIE),
            Some("a=b=c".to_string())
        );
    }
}
