//! Fixed-point currency helpers
//!
//! Claim amounts are stored as integer cents to keep arithmetic exact.
//! Import data arrives as loosely formatted strings ("$1,500.00", "1200",
//! blank); anything unparsable falls back to zero rather than aborting
//! the surrounding row.

/// Parse a currency string into integer cents.
///
/// Strips `$` and thousands separators, tolerates a missing or partial
/// fraction, and returns 0 for blank or unparsable input.
///
/// # Examples
/// ```
/// use claimdesk::money::parse_money;
///
/// assert_eq!(parse_money("$1,500.00"), 150_000);
/// assert_eq!(parse_money("1200"), 120_000);
/// assert_eq!(parse_money(""), 0);
/// assert_eq!(parse_money("n/a"), 0);
/// ```
pub fn parse_money(raw: &str) -> i64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect::<String>()
        .trim()
        .to_string();
    if cleaned.is_empty() {
        return 0;
    }

    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };

    let mut parts = digits.splitn(2, '.');
    let whole_part = parts.next().unwrap_or("");
    let frac_part = parts.next().unwrap_or("");

    if !whole_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return 0;
    }

    let whole: i64 = if whole_part.is_empty() {
        0
    } else {
        match whole_part.parse() {
            Ok(v) => v,
            Err(_) => return 0,
        }
    };

    // Fraction is truncated to cents; "1500.5" means fifty cents.
    let mut frac = 0i64;
    let mut frac_chars = frac_part.chars();
    for place in [10i64, 1] {
        if let Some(c) = frac_chars.next() {
            frac += place * (c as i64 - '0' as i64);
        }
    }

    let cents = match whole.checked_mul(100).and_then(|w| w.checked_add(frac)) {
        Some(cents) => cents,
        None => return 0,
    };
    if negative {
        -cents
    } else {
        cents
    }
}

/// Format integer cents as a plain decimal string ("1500.00", "-37.50")
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}
