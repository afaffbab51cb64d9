// src/views/format.rs

use rust_decimal::Decimal;

use crate::views::theme::CURRENCY_SYMBOL;

/// `฿1,234`: sem casas decimais, arredondamento bancário.
pub fn currency(amount: Decimal) -> String {
    format!("{CURRENCY_SYMBOL}{}", group_thousands(&amount.round_dp(0).normalize().to_string()))
}

pub fn integer<T: ToString>(value: T) -> String {
    group_thousands(&value.to_string())
}

fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };

    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    format!("{sign}{out}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_and_rounds() {
        assert_eq!(currency(Decimal::from(1_234_567)), "฿1,234,567");
        assert_eq!(currency(Decimal::new(1005, 1)), "฿100");
        assert_eq!(currency(Decimal::new(1015, 1)), "฿102");
        assert_eq!(currency(Decimal::new(3000, 1)), "฿300");
        assert_eq!(currency(Decimal::ZERO), "฿0");
    }

    #[test]
    fn integer_groups_thousands() {
        assert_eq!(integer(999), "999");
        assert_eq!(integer(1000), "1,000");
        assert_eq!(integer(-12345), "-12,345");
    }
}
