//! 实体模型定义
//!
//! 订单、账户余额、提现记录及其状态枚举，
//! 枚举同时支持数据库（sqlx）和 JSON（serde）序列化

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 订单生命周期状态
///
/// 状态机：`NEW -> PROCESSING -> {PROCESSED, INVALID}`。
/// `PROCESSED` 和 `INVALID` 为终态，一旦写入不再变更；
/// `NEW -> PROCESSING` 由对账任务在选取订单时完成，
/// 防止已被结算系统受理的订单被反复当作新订单处理。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// 新提交 - 尚未告知结算系统
    #[default]
    New,
    /// 处理中 - 已被对账任务选取，等待结算系统给出终态
    Processing,
    /// 已结算 - 终态，携带积分数额
    Processed,
    /// 无效订单 - 终态，结算系统明确拒绝
    Invalid,
}

impl OrderStatus {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Processed | Self::Invalid)
    }
}

/// 订单终态判定结果
///
/// 只有终态会被回写订单表；结算系统尚未给出结论时不产生 Outcome。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderOutcome {
    /// 订单无效，不产生积分
    Invalid,
    /// 订单有效，入账指定积分
    Processed { accrual: f64 },
}

/// 订单记录
#[derive(Debug, Clone, FromRow)]
pub struct Order {
    pub order_number: String,
    pub owner: String,
    pub status: OrderStatus,
    pub accrual: Option<f64>,
    pub uploaded_at: DateTime<Utc>,
}

/// 账户余额快照
#[derive(Debug, Clone, Copy, FromRow)]
pub struct BalanceSnapshot {
    /// 当前可用积分
    pub balance: f64,
    /// 累计已提现积分
    pub withdrawn: f64,
}

/// 提现记录
#[derive(Debug, Clone, FromRow)]
pub struct Withdrawal {
    pub order_number: String,
    pub owner: String,
    pub sum: f64,
    pub processed_at: DateTime<Utc>,
}

/// 订单提交结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 新订单已受理
    Accepted,
    /// 同一用户重复提交，幂等返回
    AlreadyOwnedBySelf,
    /// 订单号已被其他用户占用
    OwnedByOther,
}

/// 余额扣减结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitOutcome {
    /// 扣减成功
    Ok,
    /// 余额不足，未做任何变更
    Insufficient,
}
