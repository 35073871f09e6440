//! 认证模块
//!
//! 密码哈希与校验；会话的签发与解析在共享库的 SessionStore 中。

mod password;

pub use password::{hash_password, verify_password};
