//! C端服务响应 DTO 定义
//!
//! 列表与余额接口的响应体结构。字段名和时间格式（RFC3339）是对外契约。

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{BalanceSnapshot, Order, OrderStatus, Withdrawal};

/// 订单列表项
#[derive(Debug, Serialize)]
pub struct OrderDto {
    pub number: String,
    pub status: OrderStatus,
    /// 仅 PROCESSED 订单携带
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accrual: Option<f64>,
    pub uploaded_at: DateTime<Utc>,
}

impl From<Order> for OrderDto {
    fn from(order: Order) -> Self {
        Self {
            number: order.order_number,
            status: order.status,
            accrual: order.accrual,
            uploaded_at: order.uploaded_at,
        }
    }
}

/// 余额快照响应
#[derive(Debug, Serialize)]
pub struct BalanceDto {
    pub current: f64,
    pub withdrawn: f64,
}

impl From<BalanceSnapshot> for BalanceDto {
    fn from(snapshot: BalanceSnapshot) -> Self {
        Self {
            current: snapshot.balance,
            withdrawn: snapshot.withdrawn,
        }
    }
}

/// 提现记录列表项
#[derive(Debug, Serialize)]
pub struct WithdrawalDto {
    pub order: String,
    pub sum: f64,
    pub processed_at: DateTime<Utc>,
}

impl From<Withdrawal> for WithdrawalDto {
    fn from(withdrawal: Withdrawal) -> Self {
        Self {
            order: withdrawal.order_number,
            sum: withdrawal.sum,
            processed_at: withdrawal.processed_at,
        }
    }
}
