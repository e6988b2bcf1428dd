use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{
    command::{TransactionCommand, TransactionKind},
    denomination::coerce_count,
    format::format_currency,
};

/// One deposit or withdrawal. `amount` is always positive, the sign follows
/// from `kind`.
///
/// Deserialization never fails on a single entry: fields that are missing or
/// of the wrong type fall back to a default, so one odd record cannot take the
/// rest of a log down with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub note: String,
    pub amount: u64,
    pub breakdown: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

impl LogEntry {
    pub fn from_command(command: &TransactionCommand, date: DateTime<Utc>) -> Self {
        Self {
            kind: command.kind(),
            note: command.note().to_string(),
            amount: command.total(),
            breakdown: command.amounts().breakdown(),
            date: Some(date),
        }
    }

    /// Reads whatever shape `value` has. Anything but `"withdraw"` counts as a
    /// deposit; amounts are coerced like user input; an unparsable date is
    /// dropped.
    pub fn from_value(value: &Value) -> Self {
        let field = |name: &str| value.get(name).unwrap_or(&Value::Null);
        let kind = match field("type").as_str() {
            Some("withdraw") => TransactionKind::Withdraw,
            _ => TransactionKind::Deposit,
        };
        let date = field("date")
            .as_str()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
            .map(|date| date.with_timezone(&Utc));
        Self {
            kind,
            note: lenient_text(field("note")),
            amount: coerce_count(field("amount")),
            breakdown: lenient_text(field("breakdown")),
            date,
        }
    }

    /// `+$40.00` or `−$40.00`
    pub fn signed_display(&self) -> String {
        let sign = match self.kind {
            TransactionKind::Deposit => '+',
            TransactionKind::Withdraw => '−',
        };
        format!("{sign}{}", format_currency(self.amount))
    }
}

fn lenient_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl<'de> Deserialize<'de> for LogEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(LogEntry::from_value(&Value::deserialize(deserializer)?))
    }
}
