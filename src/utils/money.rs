use rust_decimal::Decimal;

use crate::models::transactions::TransactionType;

/// Formats an amount as US dollars with two decimals, e.g. `$1,234.50`.
pub fn format_usd(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let digits = format!("{:.2}", rounded.abs());

    format!("{}${}", sign, group_thousands(&digits))
}

/// Signed display of a transaction amount: withdrawals read `-$50`, anything
/// else `+$50`. Up to three fraction digits, trailing zeros trimmed.
pub fn signed_amount(transaction_type: TransactionType, amount: Decimal) -> String {
    let sign = match transaction_type {
        TransactionType::Withdrawal => '-',
        _ => '+',
    };
    let digits = amount.abs().round_dp(3).normalize().to_string();

    format!("{}${}", sign, group_thousands(&digits))
}

fn group_thousands(digits: &str) -> String {
    let (integer, fraction) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(digits.len() + integer.len() / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }

    grouped
}
