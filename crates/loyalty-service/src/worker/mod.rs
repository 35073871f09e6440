//! 后台任务模块

pub mod accrual_worker;

pub use accrual_worker::AccrualWorker;
