use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Separators and currency symbol used for every figure printed in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberFormat {
    pub currency_symbol: String,
    pub thousands_separator: String,
    pub decimal_separator: String,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            currency_symbol: "NGN ".to_string(),
            thousands_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
        }
    }
}

fn group_digits(int_part: &str, sep: &str) -> String {
    let mut grouped = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push_str(&sep.chars().rev().collect::<String>());
        }
        grouped.push(c);
    }
    grouped.chars().rev().collect()
}

/// Format a currency amount with grouping and two decimals: NGN 1,234.56
pub fn money(val: f64, nf: &NumberFormat) -> String {
    let val = if val.is_finite() { val } else { 0.0 };
    let negative = val < 0.0 && format!("{:.2}", val.abs()) != "0.00";
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((&cents, "00"));
    let grouped = group_digits(int_part, &nf.thousands_separator);
    let sign = if negative { "-" } else { "" };
    format!(
        "{sign}{}{grouped}{}{dec_part}",
        nf.currency_symbol, nf.decimal_separator
    )
}

/// Short currency form for KPI cards: NGN 1.25M
pub fn compact_money(val: f64, nf: &NumberFormat) -> String {
    let val = if val.is_finite() { val } else { 0.0 };
    let abs = val.abs();
    let (scaled, suffix) = if abs >= 1e9 {
        (abs / 1e9, "B")
    } else if abs >= 1e6 {
        (abs / 1e6, "M")
    } else if abs >= 1e3 {
        (abs / 1e3, "K")
    } else {
        return money(val, nf);
    };
    let sign = if val < 0.0 { "-" } else { "" };
    let digits = format!("{scaled:.2}").replace('.', &nf.decimal_separator);
    format!("{sign}{}{digits}{suffix}", nf.currency_symbol)
}

/// Grouped number; decimals are only shown when the value is fractional.
pub fn number(val: f64, nf: &NumberFormat) -> String {
    let val = if val.is_finite() { val } else { 0.0 };
    if val.fract() == 0.0 {
        let int_part = format!("{:.0}", val.abs());
        let sign = if val < 0.0 { "-" } else { "" };
        return format!("{sign}{}", group_digits(&int_part, &nf.thousands_separator));
    }
    let mut s = money(val, nf);
    s = s.replacen(&nf.currency_symbol, "", 1);
    s
}

/// Whole-number percentage of `part` in `total`; a zero total yields `0%`.
pub fn percent(part: f64, total: f64) -> String {
    if total == 0.0 || !total.is_finite() || !part.is_finite() {
        return "0%".to_string();
    }
    format!("{}%", (part / total * 100.0).round() as i64)
}

/// One-decimal share used in breakdown tables.
pub fn share_of(part: f64, total: f64) -> String {
    if total == 0.0 || !total.is_finite() || !part.is_finite() {
        return "0.0%".to_string();
    }
    format!("{:.1}%", part / total * 100.0)
}

pub fn timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%d %b %Y, %H:%M").to_string()
}

pub fn iso_date<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%Y-%m-%d").to_string()
}
