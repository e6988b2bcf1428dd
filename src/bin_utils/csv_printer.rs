use std::{fmt::Display, io::Write};

use chrono::TimeZone;
use csv::Writer;
use serde::Serialize;

use crate::{
    cash::CashState, command::TransactionKind, denomination::Denomination, entry::LogEntry,
    format::format_date,
};

#[derive(Debug, Serialize)]
pub struct DenominationRow {
    pub denomination: Denomination,
    pub value: u64,
    pub count: u64,
    pub subtotal: u64,
}

#[derive(Debug, Serialize)]
pub struct LogRow<'a> {
    pub date: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: String,
    pub note: &'a str,
    pub breakdown: &'a str,
}

pub fn denomination_rows(cash: &CashState) -> impl Iterator<Item = DenominationRow> + '_ {
    cash.counts().iter().map(|(d, count)| DenominationRow {
        denomination: d,
        value: d.value(),
        count,
        subtotal: count.saturating_mul(d.value()),
    })
}

/// Entries without a date get an empty `date` column.
pub fn log_rows<'a, Tz>(log: &'a [LogEntry], tz: &'a Tz) -> impl Iterator<Item = LogRow<'a>>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    log.iter().map(move |entry| LogRow {
        date: entry
            .date
            .map(|date| format_date(&date.with_timezone(tz)))
            .unwrap_or_default(),
        kind: entry.kind,
        amount: entry.signed_display(),
        note: &entry.note,
        breakdown: &entry.breakdown,
    })
}

pub fn print_rows<W, T>(output: &mut W, rows: impl Iterator<Item = T>) -> anyhow::Result<()>
where
    W: Write,
    T: Serialize,
{
    let mut writer = Writer::from_writer(output);
    for row in rows {
        if let Err(err) = writer.serialize(row) {
            anyhow::bail!("Failed to write to CSV: {err}")
        }
    }
    // Ensure all data is flushed to the output
    if let Err(err) = writer.flush() {
        anyhow::bail!("Failed to flush CSV writer: {err}")
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::denomination::BillCounts;

    use super::*;

    #[test]
    fn prints_denominations() {
        let cash = CashState::from_counts(
            BillCounts::default()
                .with(Denomination::Hundreds, 1)
                .with(Denomination::Twenties, 2),
        );
        let mut output = Vec::new();
        print_rows(&mut output, denomination_rows(&cash)).unwrap();
        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "denomination,value,count,subtotal");
        assert_eq!(lines[1], "hundreds,100,1,100");
        assert_eq!(lines[3], "twenties,20,2,40");
        assert_eq!(lines[7], "ones,1,0,0");
    }

    #[test]
    fn prints_log() {
        let log = vec![
            LogEntry {
                kind: TransactionKind::Withdraw,
                note: "Groceries, weekly".to_string(),
                amount: 40,
                breakdown: "2×$20".to_string(),
                date: Some(Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 0).unwrap()),
            },
            LogEntry {
                kind: TransactionKind::Deposit,
                note: "Found".to_string(),
                amount: 1250,
                breakdown: String::new(),
                date: None,
            },
        ];
        let mut output = Vec::new();
        print_rows(&mut output, log_rows(&log, &Utc)).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "date,type,amount,note,breakdown\n\
             Mar 5 at 2:07 PM,withdraw,−$40.00,\"Groceries, weekly\",2×$20\n\
             ,deposit,\"+$1,250.00\",Found,\n"
        );
    }
}
