//! 积分账本服务（C端）
//!
//! 用户提交消费订单号，外部结算系统异步判定订单可获得的积分，
//! 用户随后可将累计积分提现（抵扣新订单）。
//!
//! ## 核心功能
//!
//! - **订单台账**：订单提交、全局唯一归属、生命周期状态机
//!   `NEW -> PROCESSING -> {PROCESSED, INVALID}`
//! - **余额台账**：用户积分余额与累计提现，扣减为原子检查并更新
//! - **提现处理**：校验订单号、事务内扣减余额并落提现记录
//! - **对账任务**：后台轮询外部结算系统，回写订单终态并入账积分
//!
//! ## 模块结构
//!
//! - `dto`: 请求和响应的数据传输对象
//! - `models`: 实体模型与订单状态枚举
//! - `error`: 错误类型定义
//! - `handlers`: HTTP 请求处理器
//! - `repository`: 数据访问层（订单/账户/提现）
//! - `accrual_client`: 外部结算系统客户端
//! - `worker`: 对账后台任务
//! - `middleware`: 会话认证中间件
//!
//! ## 技术栈
//!
//! - Web 框架：Axum
//! - 数据库：sqlx + PostgreSQL
//! - 数据验证：validator

pub mod accrual_client;
pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod luhn;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod state;
pub mod worker;

// 重新导出核心类型
pub use accrual_client::{AccrualService, HttpAccrualClient};
pub use dto::{BalanceDto, OrderDto, WithdrawalDto};
pub use error::{LoyaltyError, Result};
pub use models::{OrderOutcome, OrderStatus};
pub use repository::{AccountRepository, OrderRepository, WithdrawalRepository};
pub use worker::AccrualWorker;
