//! 账户仓储
//!
//! 用户账户的创建、凭证查询与余额台账操作。
//! 余额不变量 `balance >= 0` 在扣减时通过条件更新保证，
//! 入账只增不减，无需检查。

use sqlx::{PgConnection, PgPool};

use crate::error::Result;
use crate::models::{BalanceSnapshot, DebitOutcome};

/// 账户仓储
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 创建账户
    ///
    /// 登录名全局唯一。并发注册同一登录名时由唯一约束裁决，
    /// 返回 false 表示登录名已被占用，未做任何变更。
    pub async fn create(&self, login: &str, password_hash: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (login, password_hash, created_at, balance, withdrawn)
            VALUES ($1, $2, NOW(), 0, 0)
            ON CONFLICT (login) DO NOTHING
            "#,
        )
        .bind(login)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// 查询用户的密码哈希，用户不存在时返回 None
    pub async fn find_password_hash(&self, login: &str) -> Result<Option<String>> {
        let hash = sqlx::query_scalar::<_, String>(
            r#"
            SELECT password_hash FROM users WHERE login = $1
            "#,
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        Ok(hash)
    }

    /// 查询余额快照（当前可用 + 累计提现）
    pub async fn get_balance(&self, login: &str) -> Result<Option<BalanceSnapshot>> {
        let snapshot = sqlx::query_as::<_, BalanceSnapshot>(
            r#"
            SELECT balance, withdrawn FROM users WHERE login = $1
            "#,
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        Ok(snapshot)
    }

    /// 扣减余额
    ///
    /// 原子的检查并扣减：`balance >= amount` 时扣减 balance 并累加 withdrawn，
    /// 否则不做任何变更。见 [`Self::debit_in_tx`]。
    pub async fn debit(&self, login: &str, amount: f64) -> Result<DebitOutcome> {
        let mut conn = self.pool.acquire().await?;
        Self::debit_in_tx(&mut *conn, login, amount).await
    }

    /// 在事务（或指定连接）中扣减余额
    ///
    /// 单条条件更新语句：行锁保证同一用户的并发扣减串行化，
    /// 两个并发请求不可能同时观察到足够余额各扣一次。
    /// 0 行受影响即余额不足（或用户不存在），未做任何变更。
    pub async fn debit_in_tx(
        conn: &mut PgConnection,
        login: &str,
        amount: f64,
    ) -> Result<DebitOutcome> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET balance = balance - $2, withdrawn = withdrawn + $2
            WHERE login = $1 AND balance >= $2
            "#,
        )
        .bind(login)
        .bind(amount)
        .execute(conn)
        .await?;

        if result.rows_affected() == 1 {
            Ok(DebitOutcome::Ok)
        } else {
            Ok(DebitOutcome::Insufficient)
        }
    }

    /// 在事务（或指定连接）中入账积分
    ///
    /// 无条件增加余额。订单结算入账必须与订单终态写入同处一个事务，
    /// 由订单仓储的 apply_outcome 调用。
    pub async fn credit_in_tx(conn: &mut PgConnection, login: &str, amount: f64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users SET balance = balance + $2 WHERE login = $1
            "#,
        )
        .bind(login)
        .bind(amount)
        .execute(conn)
        .await?;

        Ok(())
    }
}
