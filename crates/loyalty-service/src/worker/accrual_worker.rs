//! 积分对账 Worker
//!
//! 以固定间隔轮询外部结算系统，回写订单终态并入账积分：
//! 1. 重查所有 PROCESSING 订单（上一轮未就绪或查询失败的）
//! 2. 认领 NEW 订单流转为 PROCESSING，随即首次查询
//!
//! 工作集完全从订单台账状态推导，不依赖任何消息队列：
//! 进程崩溃后重启，未完结的订单会被下一轮自动拾起。
//! 单个订单的查询或回写失败只影响它自己，留待下一轮重试。

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::accrual_client::{AccrualError, AccrualService};
use crate::error::Result;
use crate::models::OrderStatus;
use crate::repository::OrderRepository;

/// 对账 Worker
///
/// 持有订单仓储与结算系统客户端，整个进程只运行一个实例。
pub struct AccrualWorker<S: AccrualService> {
    orders: OrderRepository,
    client: S,
    /// 轮询间隔（参考值 2 秒）
    poll_interval: Duration,
}

impl<S: AccrualService> AccrualWorker<S> {
    /// 创建对账 Worker
    pub fn new(orders: OrderRepository, client: S, poll_interval: Duration) -> Self {
        Self {
            orders,
            client,
            poll_interval,
        }
    }

    /// 主循环：固定间隔对账，直到收到停止信号
    ///
    /// 停止信号在 tick 边界生效：当前 tick 内的逐订单处理会完成，
    /// 每个订单的终态写入各自原子，不存在写到一半的批次。
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            poll_interval = ?self.poll_interval,
            "对账 Worker 已启动"
        );

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    info!("对账 Worker 收到停止信号，退出");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.poll_once().await {
                        // 数据库暂不可用等基础设施故障，下一轮重试
                        error!(error = %e, "对账轮询失败");
                    }
                }
            }
        }
    }

    /// 执行一轮对账
    ///
    /// 先重查存量 PROCESSING 订单，再认领 NEW 订单并首次查询。
    /// 顺序保证认领后崩溃的订单不会被当作 NEW 重复认领，
    /// 而是在下一轮作为 PROCESSING 被重新查询。
    pub async fn poll_once(&self) -> Result<()> {
        let processing = self.orders.select_by_status(OrderStatus::Processing).await?;
        if !processing.is_empty() {
            info!(count = processing.len(), "重查处理中的订单");
            self.poll_batch(&processing).await;
        }

        let claimed = self.orders.claim_new().await?;
        if !claimed.is_empty() {
            info!(count = claimed.len(), "认领新订单");
            self.poll_batch(&claimed).await;
        }

        Ok(())
    }

    /// 逐订单查询结算系统并回写结果
    ///
    /// 单个订单失败不影响批次内其余订单；
    /// 限流例外——继续请求只会继续被拒，本轮剩余订单直接延后。
    async fn poll_batch(&self, order_numbers: &[String]) {
        for number in order_numbers {
            match self.client.query(number).await {
                Ok(Some(outcome)) => match self.orders.apply_outcome(number, outcome).await {
                    Ok(true) => {
                        info!(order_number = %number, ?outcome, "订单终态已写入");
                    }
                    Ok(false) => {
                        // 迟到的重复结果落在已终态的订单上，丢弃
                        debug!(order_number = %number, "订单已是终态，忽略本次结果");
                    }
                    Err(e) => {
                        error!(order_number = %number, error = %e, "订单终态写入失败，下轮重试");
                    }
                },
                Ok(None) => {
                    debug!(order_number = %number, "结算结果未就绪");
                }
                Err(AccrualError::RateLimited) => {
                    warn!("结算系统限流，本轮剩余订单延后重试");
                    return;
                }
                Err(e) => {
                    warn!(order_number = %number, error = %e, "查询结算系统失败，下轮重试");
                }
            }
        }
    }
}
