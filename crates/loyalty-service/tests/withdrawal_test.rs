//! 余额台账与提现集成测试
//!
//! 覆盖扣减的原子性（检查并扣减不可分）、拒绝语义
//! 以及同一用户并发提现的正确性。
//!
//! ## 运行方式
//!
//! ```bash
//! DATABASE_URL=postgres://... cargo test --test withdrawal_test -- --ignored
//! ```

use chrono::Utc;
use sqlx::PgPool;

use loyalty_service::models::DebitOutcome;
use loyalty_service::repository::{AccountRepository, WithdrawalRepository};

// ==================== 辅助函数 ====================

fn database_url() -> String {
    std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests")
}

async fn setup_pool() -> PgPool {
    let pool = PgPool::connect(&database_url())
        .await
        .expect("数据库连接失败");
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("迁移执行失败");
    pool
}

fn unique_login(prefix: &str) -> String {
    format!(
        "{}_{}",
        prefix,
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    )
}

/// 创建测试用户并预置余额
async fn seed_user_with_balance(pool: &PgPool, login: &str, balance: f64) {
    AccountRepository::new(pool.clone())
        .create(login, "test-hash")
        .await
        .expect("创建测试用户失败");
    sqlx::query("UPDATE users SET balance = $2 WHERE login = $1")
        .bind(login)
        .bind(balance)
        .execute(pool)
        .await
        .expect("预置余额失败");
}

async fn snapshot(pool: &PgPool, login: &str) -> (f64, f64) {
    let s = AccountRepository::new(pool.clone())
        .get_balance(login)
        .await
        .expect("查询余额失败")
        .expect("用户应存在");
    (s.balance, s.withdrawn)
}

async fn withdrawal_count(pool: &PgPool, login: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM withdrawals WHERE owner = $1")
        .bind(login)
        .fetch_one(pool)
        .await
        .expect("统计提现记录失败")
}

// ==================== 提现语义 ====================

/// 余额 100 提现 150：拒绝，余额与累计提现均不变，不落提现记录
#[tokio::test]
#[ignore]
async fn test_insufficient_balance_changes_nothing() {
    let pool = setup_pool().await;
    let login = unique_login("poor");
    seed_user_with_balance(&pool, &login, 100.0).await;

    let outcome = WithdrawalRepository::new(pool.clone())
        .withdraw(&login, "2377225624", 150.0)
        .await
        .unwrap();

    assert_eq!(outcome, DebitOutcome::Insufficient);
    assert_eq!(snapshot(&pool, &login).await, (100.0, 0.0));
    assert_eq!(
        withdrawal_count(&pool, &login).await,
        0,
        "被拒绝的提现不得留下记录"
    );
}

/// 成功提现：余额减少、累计提现增加、恰好一条记录
#[tokio::test]
#[ignore]
async fn test_successful_withdrawal_debits_and_records() {
    let pool = setup_pool().await;
    let login = unique_login("rich");
    seed_user_with_balance(&pool, &login, 500.0).await;

    let outcome = WithdrawalRepository::new(pool.clone())
        .withdraw(&login, "2377225624", 120.5)
        .await
        .unwrap();

    assert_eq!(outcome, DebitOutcome::Ok);
    assert_eq!(snapshot(&pool, &login).await, (379.5, 120.5));
    assert_eq!(withdrawal_count(&pool, &login).await, 1);

    let records = WithdrawalRepository::new(pool.clone())
        .list_by_owner(&login)
        .await
        .unwrap();
    assert_eq!(records[0].order_number, "2377225624");
    assert_eq!(records[0].sum, 120.5);
}

/// 提现记录按处理时间升序返回
#[tokio::test]
#[ignore]
async fn test_list_withdrawals_ordered_ascending() {
    let pool = setup_pool().await;
    let login = unique_login("history");
    seed_user_with_balance(&pool, &login, 1000.0).await;

    let withdrawals = WithdrawalRepository::new(pool.clone());
    for sum in [10.0, 20.0, 30.0] {
        assert_eq!(
            withdrawals.withdraw(&login, "2377225624", sum).await.unwrap(),
            DebitOutcome::Ok
        );
    }

    let records = withdrawals.list_by_owner(&login).await.unwrap();
    let sums: Vec<f64> = records.iter().map(|w| w.sum).collect();
    assert_eq!(sums, vec![10.0, 20.0, 30.0]);
    for window in records.windows(2) {
        assert!(window[0].processed_at <= window[1].processed_at);
    }
}

/// 直接扣减的拒绝是幂等的：余额不足时反复调用，余额与累计提现始终不变
#[tokio::test]
#[ignore]
async fn test_debit_refusal_is_idempotent() {
    let pool = setup_pool().await;
    let login = unique_login("refusal");
    seed_user_with_balance(&pool, &login, 30.0).await;

    let accounts = AccountRepository::new(pool.clone());
    for _ in 0..3 {
        assert_eq!(
            accounts.debit(&login, 31.0).await.unwrap(),
            DebitOutcome::Insufficient
        );
        assert_eq!(snapshot(&pool, &login).await, (30.0, 0.0));
    }

    // 边界：恰好等于余额的扣减应当成功
    assert_eq!(
        accounts.debit(&login, 30.0).await.unwrap(),
        DebitOutcome::Ok
    );
    assert_eq!(snapshot(&pool, &login).await, (0.0, 30.0));
}

// ==================== 并发正确性 ====================

/// 余额恰好够 k 笔时，N 个并发提现恰好成功 k 笔
///
/// 经典 check-then-act 竞态：若检查与扣减不原子，
/// 多个请求会同时观察到足够余额导致超扣。
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn test_concurrent_withdrawals_never_overdraw() {
    const AMOUNT: f64 = 50.0;
    const K: usize = 3;
    const N: usize = 8;

    let pool = setup_pool().await;
    let login = unique_login("race");
    seed_user_with_balance(&pool, &login, AMOUNT * K as f64).await;

    let handles: Vec<_> = (0..N)
        .map(|_| {
            let pool = pool.clone();
            let login = login.clone();
            tokio::spawn(async move {
                WithdrawalRepository::new(pool)
                    .withdraw(&login, "2377225624", AMOUNT)
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut ok = 0;
    let mut insufficient = 0;
    for handle in handles {
        match handle.await.unwrap() {
            DebitOutcome::Ok => ok += 1,
            DebitOutcome::Insufficient => insufficient += 1,
        }
    }

    assert_eq!(ok, K, "成功笔数必须恰好等于余额可覆盖的笔数");
    assert_eq!(insufficient, N - K);
    assert_eq!(
        snapshot(&pool, &login).await,
        (0.0, AMOUNT * K as f64),
        "最终余额必须为零且累计提现等于总扣减"
    );
    assert_eq!(withdrawal_count(&pool, &login).await, K as i64);
}
