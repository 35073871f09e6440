//! 余额与提现相关的 HTTP 处理器

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::info;
use validator::Validate;

use crate::dto::{BalanceDto, WithdrawRequest, WithdrawalDto};
use crate::error::{LoyaltyError, Result};
use crate::luhn;
use crate::middleware::AuthUser;
use crate::models::DebitOutcome;
use crate::repository::{AccountRepository, WithdrawalRepository};
use crate::state::AppState;

/// 查询余额快照
///
/// GET /api/user/balance
pub async fn get_balance(
    State(state): State<AppState>,
    Extension(AuthUser(login)): Extension<AuthUser>,
) -> Result<Json<BalanceDto>> {
    let snapshot = AccountRepository::new(state.pool.clone())
        .get_balance(&login)
        .await?
        // 会话存活但账户已被删除，按未授权处理
        .ok_or_else(|| LoyaltyError::Unauthorized("账户不存在".to_string()))?;

    Ok(Json(snapshot.into()))
}

/// 积分提现
///
/// POST /api/user/balance/withdraw，请求体 `{"order": "...", "sum": ...}`。
/// 402 余额不足；422 订单号未通过 Luhn 校验。
pub async fn withdraw(
    State(state): State<AppState>,
    Extension(AuthUser(login)): Extension<AuthUser>,
    payload: std::result::Result<Json<WithdrawRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(req) = payload.map_err(|e| LoyaltyError::Malformed(e.to_string()))?;
    req.validate()?;

    // 抵扣订单号与提交订单走同一套校验
    if !luhn::is_well_formed(&req.order) || !luhn::is_valid(&req.order) {
        return Err(LoyaltyError::InvalidOrderNumber);
    }

    let withdrawals = WithdrawalRepository::new(state.pool.clone());
    match withdrawals.withdraw(&login, &req.order, req.sum).await? {
        DebitOutcome::Ok => {
            info!(login = %login, order = %req.order, sum = req.sum, "积分提现成功");
            Ok(StatusCode::OK.into_response())
        }
        DebitOutcome::Insufficient => Err(LoyaltyError::InsufficientBalance),
    }
}

/// 查询本人提现记录
///
/// GET /api/user/balance/withdrawals，处理时间升序；无记录时返回 204。
pub async fn list_withdrawals(
    State(state): State<AppState>,
    Extension(AuthUser(login)): Extension<AuthUser>,
) -> Result<Response> {
    let withdrawals = WithdrawalRepository::new(state.pool.clone())
        .list_by_owner(&login)
        .await?;

    if withdrawals.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let dtos: Vec<WithdrawalDto> = withdrawals.into_iter().map(Into::into).collect();
    Ok(Json(dtos).into_response())
}
