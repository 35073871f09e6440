//! 提现记录仓储
//!
//! 提现 = 余额扣减 + 不可变提现记录，两者同处一个事务：
//! 不会出现扣了余额没有记录、或有记录没扣余额的状态。

use sqlx::PgPool;
use tracing::instrument;

use super::account_repo::AccountRepository;
use crate::error::Result;
use crate::models::{DebitOutcome, Withdrawal};

/// 提现记录仓储
pub struct WithdrawalRepository {
    pool: PgPool,
}

impl WithdrawalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 执行提现
    ///
    /// 扣减委托给账户台账的条件更新（检查并扣减原子完成），
    /// 余额不足时整个事务回滚，不落提现记录。
    /// `order_number` 仅作对账参考，不要求对应真实订单。
    #[instrument(skip(self))]
    pub async fn withdraw(&self, owner: &str, order_number: &str, sum: f64) -> Result<DebitOutcome> {
        let mut tx = self.pool.begin().await?;

        let outcome = AccountRepository::debit_in_tx(&mut *tx, owner, sum).await?;
        if outcome == DebitOutcome::Insufficient {
            tx.rollback().await?;
            return Ok(DebitOutcome::Insufficient);
        }

        sqlx::query(
            r#"
            INSERT INTO withdrawals (order_number, owner, processed_at, sum)
            VALUES ($1, $2, NOW(), $3)
            "#,
        )
        .bind(order_number)
        .bind(owner)
        .bind(sum)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(DebitOutcome::Ok)
    }

    /// 按属主列出提现记录，处理时间升序
    pub async fn list_by_owner(&self, owner: &str) -> Result<Vec<Withdrawal>> {
        let withdrawals = sqlx::query_as::<_, Withdrawal>(
            r#"
            SELECT order_number, owner, sum, processed_at
            FROM withdrawals
            WHERE owner = $1
            ORDER BY processed_at ASC, id ASC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(withdrawals)
    }
}
