//! 外部结算系统客户端封装
//!
//! 将结算系统的单订单查询 HTTP 调用封装为统一接口，
//! 并通过 trait 抽象以支持测试中的 stub 注入。
//!
//! 结算系统被视为不可靠且有限流：传输层故障（超时、非 200、响应体异常）
//! 一律不产生订单终态——只有结算系统在应用层明确返回 INVALID
//! 才会把订单判为无效，其余情况留给下一轮对账重试。

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use loyalty_shared::config::AccrualConfig;

use crate::models::OrderOutcome;

// ---------------------------------------------------------------------------
// Trait 抽象 — 便于测试时替换为 stub 实现
// ---------------------------------------------------------------------------

/// 结算系统查询错误
///
/// 所有变体都属于瞬时故障：调用方不得据此终态化订单，只能延后重试。
#[derive(Debug, Error)]
pub enum AccrualError {
    #[error("结算系统请求失败: {0}")]
    Http(#[from] reqwest::Error),

    #[error("结算系统限流")]
    RateLimited,

    #[error("结算系统返回异常状态码: {0}")]
    UnexpectedStatus(u16),

    #[error("结算系统响应体无法解析: {0}")]
    MalformedBody(String),
}

/// 结算系统的抽象接口
///
/// `Ok(None)` 表示结算系统尚未给出结论（订单保持 PROCESSING），
/// `Ok(Some(_))` 为终态判定，`Err(_)` 为瞬时故障。
#[async_trait]
pub trait AccrualService: Send + Sync {
    /// 查询单个订单的结算结果
    async fn query(&self, order_number: &str) -> Result<Option<OrderOutcome>, AccrualError>;
}

// ---------------------------------------------------------------------------
// HTTP 客户端实现
// ---------------------------------------------------------------------------

/// 结算系统返回的订单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum AccrualStatus {
    /// 已登记，尚未开始结算
    Registered,
    /// 结算中
    Processing,
    /// 无效订单
    Invalid,
    /// 已结算
    Processed,
}

/// 结算系统响应体
#[derive(Debug, Deserialize)]
struct AccrualResponse {
    #[allow(dead_code)]
    order: String,
    status: AccrualStatus,
    accrual: Option<f64>,
}

impl AccrualResponse {
    /// 映射到订单终态
    ///
    /// REGISTERED/PROCESSING 均为「未就绪」；
    /// PROCESSED 未携带 accrual 字段时按 0 分处理，
    /// 负数积分视为响应体异常（入账只增不减）。
    fn into_outcome(self) -> Result<Option<OrderOutcome>, AccrualError> {
        match self.status {
            AccrualStatus::Registered | AccrualStatus::Processing => Ok(None),
            AccrualStatus::Invalid => Ok(Some(OrderOutcome::Invalid)),
            AccrualStatus::Processed => {
                let accrual = self.accrual.unwrap_or(0.0);
                if accrual < 0.0 {
                    return Err(AccrualError::MalformedBody(format!(
                        "accrual 为负数: {accrual}"
                    )));
                }
                Ok(Some(OrderOutcome::Processed { accrual }))
            }
        }
    }
}

/// 基于 reqwest 的结算系统客户端
///
/// 单订单查询，短超时。reqwest::Client 内部带连接池，clone 是廉价操作。
#[derive(Clone)]
pub struct HttpAccrualClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAccrualClient {
    /// 创建结算系统客户端
    ///
    /// 超时从配置读取，覆盖连接与读取全程。
    pub fn new(config: &AccrualConfig) -> Result<Self, AccrualError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl AccrualService for HttpAccrualClient {
    async fn query(&self, order_number: &str) -> Result<Option<OrderOutcome>, AccrualError> {
        let url = format!("{}/api/orders/{}", self.base_url, order_number);
        debug!(order_number, "查询结算系统");

        let response = self.http.get(&url).send().await?;

        match response.status().as_u16() {
            200 => {
                let body: AccrualResponse = response
                    .json()
                    .await
                    .map_err(|e| AccrualError::MalformedBody(e.to_string()))?;
                body.into_outcome()
            }
            // 订单尚未被结算系统登记，等同于「未就绪」
            204 => Ok(None),
            429 => Err(AccrualError::RateLimited),
            other => Err(AccrualError::UnexpectedStatus(other)),
        }
    }
}
