//! 订单相关的 HTTP 处理器
//!
//! 提交订单号与查询本人订单列表

use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::info;

use crate::dto::OrderDto;
use crate::error::{LoyaltyError, Result};
use crate::luhn;
use crate::middleware::AuthUser;
use crate::models::SubmitOutcome;
use crate::repository::OrderRepository;
use crate::state::AppState;

/// 提交订单号
///
/// POST /api/user/orders，请求体为 text/plain 的数字串。
/// 202 受理新订单；200 本人重复提交（幂等）；
/// 400 请求格式错误；409 订单号已被他人占用；422 未通过 Luhn 校验。
pub async fn submit_order(
    State(state): State<AppState>,
    Extension(AuthUser(login)): Extension<AuthUser>,
    headers: HeaderMap,
    body: String,
) -> Result<Response> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !content_type.contains("text") {
        return Err(LoyaltyError::Malformed(
            "Content-Type 必须为 text/plain".to_string(),
        ));
    }

    let number = body.trim();
    if !luhn::is_well_formed(number) {
        return Err(LoyaltyError::Malformed("订单号必须为纯数字".to_string()));
    }
    if !luhn::is_valid(number) {
        return Err(LoyaltyError::InvalidOrderNumber);
    }

    let orders = OrderRepository::new(state.pool.clone());
    match orders.submit(&login, number).await? {
        SubmitOutcome::Accepted => {
            info!(login = %login, order_number = %number, "新订单已受理");
            Ok(StatusCode::ACCEPTED.into_response())
        }
        SubmitOutcome::AlreadyOwnedBySelf => Ok(StatusCode::OK.into_response()),
        SubmitOutcome::OwnedByOther => Err(LoyaltyError::OrderOwnedByOther(number.to_string())),
    }
}

/// 查询本人订单列表
///
/// GET /api/user/orders，提交时间升序；无订单时返回 204。
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(AuthUser(login)): Extension<AuthUser>,
) -> Result<Response> {
    let orders = OrderRepository::new(state.pool.clone())
        .list_by_owner(&login)
        .await?;

    if orders.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let dtos: Vec<OrderDto> = orders.into_iter().map(Into::into).collect();
    Ok(Json(dtos).into_response())
}
