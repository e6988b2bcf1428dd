use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, ser::SerializeMap};
use thiserror::Error;

/// Bill face-value category. Variants are ordered by descending value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Denomination {
    Hundreds,
    Fifties,
    Twenties,
    Tens,
    Fives,
    Twos,
    Ones,
}

impl Denomination {
    pub const ALL: [Denomination; 7] = [
        Denomination::Hundreds,
        Denomination::Fifties,
        Denomination::Twenties,
        Denomination::Tens,
        Denomination::Fives,
        Denomination::Twos,
        Denomination::Ones,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Denomination::Hundreds => "hundreds",
            Denomination::Fifties => "fifties",
            Denomination::Twenties => "twenties",
            Denomination::Tens => "tens",
            Denomination::Fives => "fives",
            Denomination::Twos => "twos",
            Denomination::Ones => "ones",
        }
    }

    pub fn value(self) -> u64 {
        match self {
            Denomination::Hundreds => 100,
            Denomination::Fifties => 50,
            Denomination::Twenties => 20,
            Denomination::Tens => 10,
            Denomination::Fives => 5,
            Denomination::Twos => 2,
            Denomination::Ones => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Denomination::Hundreds => "$100",
            Denomination::Fifties => "$50",
            Denomination::Twenties => "$20",
            Denomination::Tens => "$10",
            Denomination::Fives => "$5",
            Denomination::Twos => "$2",
            Denomination::Ones => "$1",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Denomination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for Denomination {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown denomination `{0}`, expected one of: hundreds, fifties, twenties, tens, fives, twos, ones")]
pub struct ParseDenominationError(String);

impl FromStr for Denomination {
    type Err = ParseDenominationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Denomination::ALL
            .into_iter()
            .find(|d| d.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseDenominationError(s.to_string()))
    }
}

/// Coerces free-form count input the way a numeric form field does:
/// leading integer digits are taken, anything unparsable becomes 0,
/// negative values clamp to 0.
pub fn parse_count(input: &str) -> u64 {
    let input = input.trim();
    let (negative, digits) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };
    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u64, |acc, b| {
            acc.saturating_mul(10).saturating_add(u64::from(b - b'0'))
        });
    if negative { 0 } else { value }
}

/// Clamps a signed count to the non-negative range.
pub fn clamp_count(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

/// One non-negative count per denomination.
///
/// Serialized as a JSON object keyed by [`Denomination::key`]. Deserialization
/// is lenient: missing keys read as 0, unknown keys are dropped and values
/// that are not non-negative integers are coerced like user input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BillCounts {
    counts: [u64; 7],
}

impl BillCounts {
    pub fn get(&self, denomination: Denomination) -> u64 {
        self.counts[denomination.index()]
    }

    pub fn set(&mut self, denomination: Denomination, count: u64) {
        self.counts[denomination.index()] = count;
    }

    pub fn with(mut self, denomination: Denomination, count: u64) -> Self {
        self.set(denomination, count);
        self
    }

    /// Iterates in descending-value order.
    pub fn iter(&self) -> impl Iterator<Item = (Denomination, u64)> + '_ {
        Denomination::ALL.into_iter().map(move |d| (d, self.get(d)))
    }

    pub fn total_value(&self) -> u64 {
        self.iter()
            .map(|(d, count)| count.saturating_mul(d.value()))
            .fold(0, u64::saturating_add)
    }

    pub fn total_bills(&self) -> u64 {
        self.counts.iter().copied().fold(0, u64::saturating_add)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|count| *count == 0)
    }

    /// Human readable summary such as `2×$20, 1×$5`, skipping zero entries.
    pub fn breakdown(&self) -> String {
        self.iter()
            .filter(|(_, count)| *count > 0)
            .map(|(d, count)| format!("{count}×{}", d.label()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromIterator<(Denomination, u64)> for BillCounts {
    /// Repeated denominations are summed.
    fn from_iter<I: IntoIterator<Item = (Denomination, u64)>>(iter: I) -> Self {
        let mut counts = BillCounts::default();
        for (d, count) in iter {
            counts.set(d, counts.get(d).saturating_add(count));
        }
        counts
    }
}

impl Serialize for BillCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Denomination::ALL.len()))?;
        for (d, count) in self.iter() {
            map.serialize_entry(d.key(), &count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for BillCounts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        let mut counts = BillCounts::default();
        for (key, value) in raw {
            let Ok(d) = key.parse::<Denomination>() else {
                tracing::debug!(key = %key, "dropping unknown denomination");
                continue;
            };
            counts.set(d, coerce_count(&value));
        }
        Ok(counts)
    }
}

pub(crate) fn coerce_count(value: &serde_json::Value) -> u64 {
    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(clamp_count))
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f > 0.0)
                    .map(|f| f.trunc() as u64)
            })
            .unwrap_or(0),
        serde_json::Value::String(s) => parse_count(s),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[test]
    fn denominations_are_in_descending_value_order() {
        let values: Vec<u64> = Denomination::ALL.iter().map(|d| d.value()).collect();
        assert_eq!(values, vec![100, 50, 20, 10, 5, 2, 1]);
    }

    #[rstest]
    #[case::plain("twenties", Denomination::Twenties)]
    #[case::padded("  ones ", Denomination::Ones)]
    #[case::uppercase("HUNDREDS", Denomination::Hundreds)]
    fn parse_denomination(#[case] input: &str, #[case] expected: Denomination) {
        assert_eq!(input.parse::<Denomination>().unwrap(), expected);
    }

    #[test]
    fn parse_unknown_denomination() {
        let err = "thousands".parse::<Denomination>().unwrap_err();
        assert!(err.to_string().starts_with("Unknown denomination `thousands`"));
    }

    #[rstest]
    #[case::number("12", 12)]
    #[case::trailing_garbage("12abc", 12)]
    #[case::negative("-5", 0)]
    #[case::garbage("abc", 0)]
    #[case::empty("", 0)]
    #[case::plus_sign("+7", 7)]
    #[case::overflow("99999999999999999999999", u64::MAX)]
    fn coerce_user_count(#[case] input: &str, #[case] expected: u64) {
        assert_eq!(parse_count(input), expected);
    }

    #[test]
    fn totals_and_breakdown() {
        let counts = BillCounts::default()
            .with(Denomination::Fives, 1)
            .with(Denomination::Twenties, 2);
        assert_eq!(counts.total_value(), 45);
        assert_eq!(counts.total_bills(), 3);
        // descending value regardless of insertion order
        assert_eq!(counts.breakdown(), "2×$20, 1×$5");
        assert_eq!(BillCounts::default().breakdown(), "");
    }

    #[test]
    fn collect_sums_repeated_denominations() {
        let counts: BillCounts = [(Denomination::Tens, 2), (Denomination::Tens, 3)]
            .into_iter()
            .collect();
        assert_eq!(counts.get(Denomination::Tens), 5);
    }

    #[test]
    fn serializes_every_key() {
        let value = serde_json::to_value(BillCounts::default().with(Denomination::Ones, 4)).unwrap();
        assert_eq!(
            value,
            json!({
                "hundreds": 0, "fifties": 0, "twenties": 0, "tens": 0,
                "fives": 0, "twos": 0, "ones": 4
            })
        );
    }

    #[test]
    fn deserializes_leniently() {
        let counts: BillCounts = serde_json::from_value(json!({
            "hundreds": 1,
            "twenties": -3,
            "tens": "4",
            "fives": 2.9,
            "twos": null,
            "pennies": 100
        }))
        .unwrap();
        assert_eq!(counts.get(Denomination::Hundreds), 1);
        assert_eq!(counts.get(Denomination::Twenties), 0);
        assert_eq!(counts.get(Denomination::Tens), 4);
        assert_eq!(counts.get(Denomination::Fives), 2);
        assert_eq!(counts.get(Denomination::Twos), 0);
        assert_eq!(counts.get(Denomination::Fifties), 0);
        assert_eq!(counts.total_bills(), 7);
    }

    #[test]
    fn rejects_non_object() {
        assert!(serde_json::from_value::<BillCounts>(json!([1, 2, 3])).is_err());
    }
}
