//! C端服务请求 DTO 定义

use serde::Deserialize;
use validator::Validate;

/// 注册/登录请求
///
/// 两个接口共用同一请求体结构
#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[validate(length(min = 1, max = 64, message = "登录名长度必须在 1-64 之间"))]
    pub login: String,
    // bcrypt 只取前 72 字节，超长密码在入口处拒绝而不是静默截断
    #[validate(length(min = 1, max = 72, message = "密码长度必须在 1-72 之间"))]
    pub password: String,
}

/// 提现请求
///
/// `order` 为用户自报的抵扣订单号，只做 Luhn 校验，不要求真实存在
#[derive(Debug, Deserialize, Validate)]
pub struct WithdrawRequest {
    pub order: String,
    #[validate(range(min = 0.0, message = "提现金额不能为负"))]
    pub sum: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_validation() {
        let ok = CredentialsRequest {
            login: "alice".to_string(),
            password: "secret".to_string(),
        };
        assert!(ok.validate().is_ok());

        let empty_login = CredentialsRequest {
            login: String::new(),
            password: "secret".to_string(),
        };
        assert!(empty_login.validate().is_err());

        let oversized_password = CredentialsRequest {
            login: "alice".to_string(),
            password: "x".repeat(73),
        };
        assert!(oversized_password.validate().is_err());
    }

    #[test]
    fn test_withdraw_rejects_negative_sum() {
        let negative = WithdrawRequest {
            order: "79927398713".to_string(),
            sum: -10.0,
        };
        assert!(negative.validate().is_err());

        let zero = WithdrawRequest {
            order: "79927398713".to_string(),
            sum: 0.0,
        };
        assert!(zero.validate().is_ok());
    }
}
