//! 订单台账仓储
//!
//! 订单的提交、查询与生命周期流转。
//! 订单号全局唯一（跨用户），归属一经确定终生不变；
//! 终态（PROCESSED/INVALID）写入后不可覆盖，由更新语句的状态条件保证。

use sqlx::PgPool;
use tracing::instrument;

use super::account_repo::AccountRepository;
use crate::error::Result;
use crate::models::{Order, OrderOutcome, OrderStatus, SubmitOutcome};

/// 订单台账仓储
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 提交订单
    ///
    /// 以唯一约束裁决归属：插入成功即受理为 NEW；
    /// 冲突时查询现有属主区分「本人重复提交」与「他人已占用」。
    /// 两个用户并发提交同一订单号时，恰好一个成为属主。
    #[instrument(skip(self))]
    pub async fn submit(&self, owner: &str, order_number: &str) -> Result<SubmitOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO orders (order_number, owner, uploaded_at, status)
            VALUES ($1, $2, NOW(), $3)
            ON CONFLICT (order_number) DO NOTHING
            "#,
        )
        .bind(order_number)
        .bind(owner)
        .bind(OrderStatus::New)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(SubmitOutcome::Accepted);
        }

        let existing_owner = sqlx::query_scalar::<_, String>(
            r#"
            SELECT owner FROM orders WHERE order_number = $1
            "#,
        )
        .bind(order_number)
        .fetch_optional(&self.pool)
        .await?;

        match existing_owner {
            Some(existing) if existing == owner => Ok(SubmitOutcome::AlreadyOwnedBySelf),
            Some(_) => Ok(SubmitOutcome::OwnedByOther),
            // 冲突后订单又消失只可能是属主账户被级联删除，按新订单重试一次
            None => {
                let retry = sqlx::query(
                    r#"
                    INSERT INTO orders (order_number, owner, uploaded_at, status)
                    VALUES ($1, $2, NOW(), $3)
                    ON CONFLICT (order_number) DO NOTHING
                    "#,
                )
                .bind(order_number)
                .bind(owner)
                .bind(OrderStatus::New)
                .execute(&self.pool)
                .await?;

                if retry.rows_affected() == 1 {
                    Ok(SubmitOutcome::Accepted)
                } else {
                    Ok(SubmitOutcome::OwnedByOther)
                }
            }
        }
    }

    /// 按属主列出订单，提交时间升序
    pub async fn list_by_owner(&self, owner: &str) -> Result<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT order_number, owner, status, accrual, uploaded_at
            FROM orders
            WHERE owner = $1
            ORDER BY uploaded_at ASC, id ASC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// 列出处于指定状态的订单号，供对账任务使用
    pub async fn select_by_status(&self, status: OrderStatus) -> Result<Vec<String>> {
        let numbers = sqlx::query_scalar::<_, String>(
            r#"
            SELECT order_number FROM orders WHERE status = $1 ORDER BY id ASC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(numbers)
    }

    /// 认领所有 NEW 订单：原子地流转为 PROCESSING 并返回订单号
    ///
    /// 认领与查询结算系统之间崩溃时，订单停留在 PROCESSING，
    /// 下一轮对账会把它们与其他 PROCESSING 订单一起重新查询。
    pub async fn claim_new(&self) -> Result<Vec<String>> {
        let numbers = sqlx::query_scalar::<_, String>(
            r#"
            UPDATE orders
            SET status = $1
            WHERE status = $2
            RETURNING order_number
            "#,
        )
        .bind(OrderStatus::Processing)
        .bind(OrderStatus::New)
        .fetch_all(&self.pool)
        .await?;

        Ok(numbers)
    }

    /// 写入订单终态
    ///
    /// 返回 true 表示本次写入生效；订单已处于终态或不存在时为空操作返回 false。
    /// `Processed` 的积分入账与状态写入在同一事务内完成，
    /// 不会出现「已结算但未入账」或「已入账但未结算」的中间状态。
    #[instrument(skip(self))]
    pub async fn apply_outcome(&self, order_number: &str, outcome: OrderOutcome) -> Result<bool> {
        match outcome {
            OrderOutcome::Invalid => {
                let result = sqlx::query(
                    r#"
                    UPDATE orders
                    SET status = $2
                    WHERE order_number = $1 AND status IN ($3, $4)
                    "#,
                )
                .bind(order_number)
                .bind(OrderStatus::Invalid)
                .bind(OrderStatus::New)
                .bind(OrderStatus::Processing)
                .execute(&self.pool)
                .await?;

                Ok(result.rows_affected() == 1)
            }
            OrderOutcome::Processed { accrual } => {
                let mut tx = self.pool.begin().await?;

                let owner = sqlx::query_scalar::<_, String>(
                    r#"
                    UPDATE orders
                    SET status = $2, accrual = $3
                    WHERE order_number = $1 AND status IN ($4, $5)
                    RETURNING owner
                    "#,
                )
                .bind(order_number)
                .bind(OrderStatus::Processed)
                .bind(accrual)
                .bind(OrderStatus::New)
                .bind(OrderStatus::Processing)
                .fetch_optional(&mut *tx)
                .await?;

                let Some(owner) = owner else {
                    // 已终态或订单不存在，放弃本次写入
                    tx.rollback().await?;
                    return Ok(false);
                };

                AccountRepository::credit_in_tx(&mut *tx, &owner, accrual).await?;

                tx.commit().await?;
                Ok(true)
            }
        }
    }
}
