//! 订单号 Luhn 校验
//!
//! 对数字串自右向左，从倒数第二位起隔位翻倍，翻倍后大于 9 则减 9，
//! 各位求和能被 10 整除即通过。订单号可能超出 64 位整数范围，
//! 因此校验直接在数字串上进行，不做整数转换。

/// 判断输入是否为合法的订单号形式：非空且全部为 ASCII 数字
///
/// 形式校验与校验和校验分离：非数字/空串属于请求格式错误（400），
/// 校验和不通过属于订单号无效（422）。
/// 长度小于 2 的数字串在校验和公式下退化（无可翻倍位），一并视为格式错误。
pub fn is_well_formed(number: &str) -> bool {
    number.len() >= 2 && number.bytes().all(|b| b.is_ascii_digit())
}

/// Luhn 校验和是否通过
///
/// 调用方须先用 [`is_well_formed`] 保证输入为数字串；
/// 对非数字输入本函数返回 false 而不是 panic。
pub fn is_valid(number: &str) -> bool {
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    checksum(number) % 10 == 0
}

/// 计算数字串的 Luhn 校验和
fn checksum(digits: &str) -> u32 {
    digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let mut d = u32::from(b - b'0');
            if i % 2 == 1 {
                d *= 2;
                if d > 9 {
                    d -= 9;
                }
            }
            d
        })
        .sum()
}
