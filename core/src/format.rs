//! Display formatting for rates, money and dates.

use chrono::NaiveDate;

/// `0.1234` -> `"12.34%"`.
pub fn pct(rate: f64) -> String {
    format!("{:.2}%", finite_or_zero(rate) * 100.0)
}

/// Signed percent difference: `"+0.50%"` / `"-1.25%"`. Zero is positive.
pub fn signed_pct(delta: f64) -> String {
    let d = finite_or_zero(delta);
    let sign = if d >= 0.0 { "+" } else { "" };
    format!("{sign}{}", pct(d))
}

/// Whole dollars with thousands separators: `"$12,345"`.
pub fn money(amount: f64) -> String {
    let a = finite_or_zero(amount).round();
    let sign = if a < 0.0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(&format!("{:.0}", a.abs())))
}

/// Dollars and cents: `"$1,234.50"`.
pub fn money_cents(amount: f64) -> String {
    let a = finite_or_zero(amount);
    let sign = if a < 0.0 { "-" } else { "" };
    let text = format!("{:.2}", a.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{sign}${}.{cents}", group_thousands(whole))
}

/// Signed whole-number change with separators: `"+1,200"` / `"-35"`.
pub fn signed_amount(amount: f64) -> String {
    let a = finite_or_zero(amount).round();
    let sign = if a >= 0.0 { "+" } else { "-" };
    format!("{sign}{}", group_thousands(&format!("{:.0}", a.abs())))
}

/// Integer with separators: `12345` -> `"12,345"`.
pub fn count(n: u64) -> String {
    group_thousands(&n.to_string())
}

/// `"Jan 05, 2024"`.
pub fn date(d: NaiveDate) -> String {
    d.format("%b %d, %Y").to_string()
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_has_two_decimals() {
        assert_eq!(pct(0.1234), "12.34%");
        assert_eq!(pct(0.0), "0.00%");
        assert_eq!(pct(f64::NAN), "0.00%");
        assert_eq!(signed_pct(0.005), "+0.50%");
        assert_eq!(signed_pct(-0.0125), "-1.25%");
    }

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(1234567.4), "$1,234,567");
        assert_eq!(money(999.0), "$999");
        assert_eq!(money_cents(1234.5), "$1,234.50");
        assert_eq!(signed_amount(-1200.0), "-1,200");
        assert_eq!(signed_amount(0.0), "+0");
        assert_eq!(count(1000), "1,000");
    }

    #[test]
    fn date_is_month_day_year() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(date(d), "Jan 05, 2024");
    }
}
