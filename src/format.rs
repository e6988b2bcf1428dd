use std::fmt::Display;

use chrono::{DateTime, TimeZone};

/// en-US currency style for whole-dollar amounts, e.g. `$1,234.00`.
pub fn format_currency(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("${grouped}.00")
}

/// Short timestamp such as `Mar 5 at 2:07 PM`, rendered in the zone of `date`.
pub fn format_date<Tz>(date: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    date.format("%b %-d at %-I:%M %p").to_string()
}

pub fn bill_count_phrase(count: u64) -> String {
    if count == 1 {
        "1 bill".to_string()
    } else {
        format!("{count} bills")
    }
}
