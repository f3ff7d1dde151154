//! Encoding of transactions as entries of the persisted string set.
//!
//! Entries are written as tagged JSON objects carrying a sequence number.
//! Older installs wrote `kind|amount|timestamp|category` strings with no
//! ordering information; those are still read so existing history survives.

use chrono::NaiveDateTime;

use crate::core::transaction::{Transaction, TransactionKind, TIMESTAMP_FORMAT};

/// Position of a decoded entry in the restored history.
///
/// Legacy entries predate sequence numbers and sort ahead of every
/// sequenced one, ordered by their timestamp where it parses and then
/// by the raw entry text.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Legacy(Option<NaiveDateTime>, String),
    Sequenced(u64)
}

pub fn encode(transaction: &Transaction) -> serde_json::Result<String> {
    serde_json::to_string(transaction)
}

/// Decodes one stored entry. Anything that does not describe a valid
/// transaction yields `None`.
pub fn decode(entry: &str) -> Option<(SortKey, Transaction)> {
    if entry.trim_start().starts_with('{') {
        return decode_tagged(entry);
    }
    return decode_legacy(entry);
}

fn decode_tagged(entry: &str) -> Option<(SortKey, Transaction)> {
    let parsed: Transaction = serde_json::from_str(entry).ok()?;
    // Deserialize does not enforce amount > 0
    let transaction = Transaction::new(
        parsed.seq(), parsed.kind(), parsed.amount(), parsed.timestamp()).ok()?;
    return Some((SortKey::Sequenced(transaction.seq()), transaction));
}

fn decode_legacy(entry: &str) -> Option<(SortKey, Transaction)> {
    let parts: Vec<&str> = entry.split('|').collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let kind = TransactionKind::from_label(parts[0])?;
    let amount: f64 = parts[1].trim().parse().ok()?;
    let timestamp = parts[2].trim();
    let transaction = Transaction::new(0, kind, amount, timestamp).ok()?;

    let recorded_at = NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).ok();
    return Some((SortKey::Legacy(recorded_at, entry.to_owned()), transaction));
}


#[cfg(test)]
mod tests {
    use super::{decode, encode, SortKey};
    use crate::core::transaction::{Transaction, TransactionKind};

    use chrono::NaiveDate;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn tagged_layout() {
        let transaction = Transaction::new(7, TransactionKind::Deposit, 100.0, "05/01/2024 14:03:59").unwrap();
        let encoded = encode(&transaction).unwrap();

        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value, json!({
            "seq": 7,
            "kind": "Deposit",
            "amount": 100.0,
            "timestamp": "05/01/2024 14:03:59"
        }));

        let (key, decoded) = decode(&encoded).unwrap();
        assert_eq!(key, SortKey::Sequenced(7));
        assert_eq!(decoded, transaction);
    }

    #[test]
    fn legacy_entry_with_category() {
        let entry = "Dvig|25.5|05/01/2024 14:03:59|Expense";
        let (key, decoded) = decode(entry).unwrap();

        let expected_time = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
            .and_hms_opt(14, 3, 59).unwrap();
        assert_eq!(key, SortKey::Legacy(Some(expected_time), entry.to_string()));
        assert_eq!(decoded.kind(), TransactionKind::Withdrawal);
        assert_eq!(decoded.amount(), 25.5);
        assert_eq!(decoded.timestamp(), "05/01/2024 14:03:59");
    }

    #[test]
    fn legacy_entry_without_parsable_time() {
        let (key, decoded) = decode("Deposit|10|yesterday").unwrap();
        assert_eq!(key, SortKey::Legacy(None, "Deposit|10|yesterday".to_string()));
        assert_eq!(decoded.timestamp(), "yesterday");
    }

    #[rstest]
    #[case("")]
    #[case("Polog|100.0")]
    #[case("Polog|abc|05/01/2024 14:03:59")]
    #[case("Polog|-3|05/01/2024 14:03:59")]
    #[case("Polog|0|05/01/2024 14:03:59|Income")]
    #[case("Transfer|10|05/01/2024 14:03:59")]
    #[case("Polog|10|05/01/2024 14:03:59|Income|extra")]
    #[case("{\"seq\": 1, \"kind\": \"Deposit\"}")]
    #[case("{\"seq\": 1, \"kind\": \"Deposit\", \"amount\": -1.0, \"timestamp\": \"\"}")]
    #[case("{\"seq\": 1, \"kind\": \"Loan\", \"amount\": 1.0, \"timestamp\": \"\"}")]
    #[case("{broken")]
    fn malformed_entries_are_dropped(#[case] entry: &str) {
        assert!(decode(entry).is_none());
    }

    #[test]
    fn legacy_sorts_before_sequenced() {
        let early = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap().and_hms_opt(8, 0, 0).unwrap();
        let late = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(8, 0, 0).unwrap();

        let legacy = |at: Option<_>, raw: &str| SortKey::Legacy(at, raw.to_string());

        let mut keys = vec![
            SortKey::Sequenced(0),
            legacy(Some(late), "b"),
            legacy(None, "x"),
            legacy(Some(early), "a"),
        ];
        keys.sort();

        assert_eq!(keys, vec![
            legacy(None, "x"),
            legacy(Some(early), "a"),
            legacy(Some(late), "b"),
            SortKey::Sequenced(0),
        ]);
    }

    #[test]
    fn legacy_ties_break_on_entry_text() {
        let (first, _) = decode("Polog|7.0|01/01/2024 09:00:00").unwrap();
        let (second, _) = decode("Dvig|5.0|01/01/2024 09:00:00").unwrap();
        assert!(second < first);

        let (first, _) = decode("Polog|7.0|sometime").unwrap();
        let (second, _) = decode("Dvig|5.0|sometime").unwrap();
        assert!(second < first);
    }
}
