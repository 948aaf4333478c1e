//! Display helpers shared by table output and chart labels.

/// `12.34%`; missing or zero APR renders as `0.00%`.
pub fn format_apr(apr: Option<f64>) -> String {
    match apr.filter(|value| *value != 0.0 && value.is_finite()) {
        Some(value) => format!("{value:.2}%"),
        None => String::from("0.00%"),
    }
}

/// Whole-dollar amount with thousands separators: `$1,234,567`.
pub fn format_currency(value: Option<f64>) -> String {
    match value.filter(|value| *value != 0.0 && value.is_finite()) {
        Some(value) => {
            let rounded = value.round();
            let sign = if rounded < 0.0 { "-" } else { "" };
            format!("{sign}${}", group_thousands(rounded.abs() as u64))
        }
        None => String::from("$0"),
    }
}

/// Axis label form: `$12M`, `$3K`, `$950`.
pub fn format_currency_compact(value: Option<f64>) -> String {
    match value.filter(|value| *value != 0.0 && value.is_finite()) {
        Some(value) if value >= 1_000_000.0 => format!("${}M", (value / 1_000_000.0).round()),
        Some(value) if value >= 1_000.0 => format!("${}K", (value / 1_000.0).round()),
        Some(value) => format!("${}", value.round()),
        None => String::from("$0"),
    }
}

/// Signed percentage with two decimals: `+1.25%`, `-0.50%`.
pub fn format_signed_percent(value: f64) -> String {
    if value > 0.0 {
        format!("+{value:.2}%")
    } else {
        format!("{value:.2}%")
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
