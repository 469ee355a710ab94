//! 表单输入的数值转换
//!
//! 输入过程中的半成品文本 ("", "-", "1e", "abc") 不会报错, 一律落到 0.

use bigdecimal::{BigDecimal, Zero};
use std::str::FromStr;

/// 整数解析: 取开头的数字串, 负数与无效输入为 0, 超出 i64 时取 `i64::MAX`
pub fn parse_quantity(raw: &str) -> i64 {
    let s = raw.trim_start();
    let (negative, rest) = split_sign(s);
    let digits: &str = leading(rest, |c| c.is_ascii_digit());
    if digits.is_empty() || negative {
        return 0;
    }
    // 全是数字, 解析失败只可能是溢出
    digits.parse::<i64>().unwrap_or(i64::MAX)
}

/// 小数解析: 取开头的 `digits[.digits]`, 负数与无效输入为 0
pub fn parse_unit_price(raw: &str) -> BigDecimal {
    let s = raw.trim_start();
    let (negative, rest) = split_sign(s);

    let int_part = leading(rest, |c| c.is_ascii_digit());
    let after_int = &rest[int_part.len()..];
    let frac_part = match after_int.strip_prefix('.') {
        Some(tail) => leading(tail, |c| c.is_ascii_digit()),
        None => "",
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return BigDecimal::zero();
    }

    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let literal = if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac_part)
    };

    match BigDecimal::from_str(&literal) {
        Ok(value) if !negative => value,
        _ => BigDecimal::zero(),
    }
}

/// 复选框取值
pub fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "on" | "1" | "yes"
    )
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    }
}

fn leading(s: &str, pred: impl Fn(char) -> bool) -> &str {
    let end = s.find(|c: char| !pred(c)).unwrap_or(s.len());
    &s[..end]
}
