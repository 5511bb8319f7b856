use std::fmt;

use ethers_core::types::U256;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::{format_units, parse_raw_amount, same_address, TOKEN_DECIMALS, TOKEN_SYMBOL};

/// Timestamp shown when a record does not carry one.
pub const UNKNOWN_TIMESTAMP: &str = "unknown";

/// Whether a transaction moved tokens out of or into the viewed account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// The account is the sender
    Sent,
    /// The account is not the sender
    Received,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Sent => write!(f, "sent"),
            Direction::Received => write!(f, "received"),
        }
    }
}

/// An indexed token transfer, as reported by the backend. Immutable once
/// received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction hash
    pub hash: String,
    /// Sender address
    pub from: String,
    /// Recipient address
    pub to: String,
    /// Amount in the token's smallest unit
    pub raw_value: U256,
    /// Decimal count used to render `raw_value`
    pub decimals: u8,
    /// Token symbol
    pub symbol: String,
    /// When the transfer happened, as reported by the indexer
    pub timestamp: String,
    /// Link to the transaction on a block explorer
    pub explorer_url: String,
}

impl Transaction {
    /// Direction relative to `account`. Addresses compare case-insensitively.
    pub fn direction(&self, account: &str) -> Direction {
        if same_address(&self.from, account) {
            Direction::Sent
        } else {
            Direction::Received
        }
    }

    /// Human readable amount.
    pub fn amount(&self) -> String {
        format_units(self.raw_value, self.decimals)
    }

    /// Build a transaction from one record of the backend's `transactions`
    /// array. Optional fields fall back to defaults; a record without a hash
    /// or sender, or with an unreadable value, is rejected.
    pub fn from_record(record: &Value, explorer_tx_url: &str) -> Result<Self, RecordError> {
        let obj = record.as_object().ok_or(RecordError::NotAnObject)?;

        let hash = text(obj.get("hash")).ok_or(RecordError::Missing("hash"))?;
        let from = text(obj.get("from")).ok_or(RecordError::Missing("from"))?;
        let to = text(obj.get("to")).unwrap_or_default();

        let raw = text(obj.get("value")).unwrap_or_else(|| "0".to_owned());
        let raw_value = parse_raw_amount(&raw).ok_or(RecordError::BadValue(raw))?;

        let decimals = text(obj.get("tokenDecimal"))
            .and_then(|d| d.parse::<u8>().ok())
            .unwrap_or(TOKEN_DECIMALS);
        let symbol = text(obj.get("tokenSymbol"))
            .or_else(|| text(obj.get("coinSymbol")))
            .unwrap_or_else(|| TOKEN_SYMBOL.to_owned());
        let timestamp = text(obj.get("timestamp"))
            .or_else(|| text(obj.get("timeStamp")))
            .unwrap_or_else(|| UNKNOWN_TIMESTAMP.to_owned());

        let explorer_url = format!("{explorer_tx_url}{hash}");
        Ok(Self {
            hash,
            from,
            to,
            raw_value,
            decimals,
            symbol,
            timestamp,
            explorer_url,
        })
    }

    /// Convert a list of backend records, dropping the malformed ones.
    pub fn from_records(records: &[Value], explorer_tx_url: &str) -> Vec<Self> {
        records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                Self::from_record(record, explorer_tx_url)
                    .map_err(|err| warn!(index, %err, "Dropping malformed transaction record"))
                    .ok()
            })
            .collect()
    }
}

/// Why a transaction record was dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// The record is not a JSON object
    #[error("record is not an object")]
    NotAnObject,
    /// A required field is absent or empty
    #[error("record has no {0}")]
    Missing(&'static str),
    /// The value field is not an unsigned integer
    #[error("record value {0:?} is not an unsigned integer")]
    BadValue(String),
}

/// Read a field that the indexer may send either as a string or as a number.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const EXPLORER: &str = "https://sepolia.etherscan.io/tx/";

    #[test]
    fn full_record() {
        let record = json!({
            "hash": "0x111",
            "from": "0xAAA",
            "to": "0xbbb",
            "value": "2500000",
            "tokenDecimal": "6",
            "tokenSymbol": "USDT",
            "timeStamp": "1700000000"
        });
        let tx = Transaction::from_record(&record, EXPLORER).unwrap();
        assert_eq!(tx.amount(), "2.5");
        assert_eq!(tx.symbol, "USDT");
        assert_eq!(tx.timestamp, "1700000000");
        assert_eq!(tx.explorer_url, "https://sepolia.etherscan.io/tx/0x111");
        assert_eq!(tx.direction("0xaaa"), Direction::Sent);
        assert_eq!(tx.direction("0xbbb"), Direction::Received);
    }

    #[test]
    fn optional_fields_take_defaults() {
        let record = json!({
            "hash": "0x222",
            "from": "0xaaa",
            "to": "0xbbb",
            "value": 1000000000000000000u64
        });
        let tx = Transaction::from_record(&record, EXPLORER).unwrap();
        assert_eq!(tx.decimals, 18);
        assert_eq!(tx.symbol, "OERC");
        assert_eq!(tx.timestamp, "unknown");
        assert_eq!(tx.amount(), "1.0");
    }

    #[test]
    fn coin_symbol_is_accepted() {
        let record = json!({"hash": "0x3", "from": "0xa", "value": "1", "coinSymbol": "TST"});
        let tx = Transaction::from_record(&record, EXPLORER).unwrap();
        assert_eq!(tx.symbol, "TST");
    }

    #[test]
    fn malformed_records_are_dropped_individually() {
        let records = vec![
            json!({"hash": "0x1", "from": "0xa", "to": "0xb", "value": "1"}),
            json!({"from": "0xa", "to": "0xb", "value": "1"}),
            json!("garbage"),
            json!({"hash": "0x4", "from": "0xa", "to": "0xb", "value": "not-a-number"}),
            json!({"hash": "0x5", "from": "0xa", "to": "0xb", "value": "5"}),
        ];
        let txs = Transaction::from_records(&records, EXPLORER);
        let hashes: Vec<_> = txs.iter().map(|t| t.hash.as_str()).collect();
        assert_eq!(hashes, vec!["0x1", "0x5"]);
    }
}
