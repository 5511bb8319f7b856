//! Plain text rendering of the account view.

use std::fmt::Write;

use oerc_core::{short_address, AccountSnapshot, Direction, FetchStatus, Identity};
use oerc_ethereum::ConnectionConf;

pub fn status(identity: &Identity, snapshot: &AccountSnapshot, chain: &ConnectionConf) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "User:     {}", identity.username);
    let Some(address) = identity.address() else {
        let _ = writeln!(out, "Wallet:   none, run `oerc generate-wallet`");
        return out;
    };
    let _ = writeln!(out, "Wallet:   {}", short_address(address));
    let _ = writeln!(out, "Balance:  {} {}", snapshot.balance, chain.symbol);
    if let FetchStatus::Failed(reason) = &snapshot.balance_status {
        let _ = writeln!(out, "          (last read failed: {reason})");
    }
    let _ = writeln!(
        out,
        "Network:  {} (token {:?})",
        chain.network, chain.token_address
    );
    out.push('\n');
    out.push_str(&history(address, snapshot, Some(5)));
    out
}

pub fn history(address: &str, snapshot: &AccountSnapshot, limit: Option<usize>) -> String {
    let mut out = String::new();
    match &snapshot.history_status {
        FetchStatus::Failed(reason) if snapshot.transactions.is_empty() => {
            let _ = writeln!(out, "Transactions unavailable: {reason}");
            return out;
        }
        FetchStatus::NotFetched => {
            let _ = writeln!(out, "Transactions not loaded yet");
            return out;
        }
        _ if snapshot.has_no_transactions() => {
            let _ = writeln!(out, "No transactions yet");
            return out;
        }
        _ => {}
    }

    let rows = snapshot
        .transactions
        .iter()
        .take(limit.unwrap_or(usize::MAX));
    for tx in rows {
        let direction = tx.direction(address);
        let counterparty = match direction {
            Direction::Sent => &tx.to,
            Direction::Received => &tx.from,
        };
        let sign = match direction {
            Direction::Sent => '-',
            Direction::Received => '+',
        };
        let label = direction.to_string();
        let _ = writeln!(
            out,
            "{label:<9}{sign}{} {}  {}  {}",
            tx.amount(),
            tx.symbol,
            short_address(counterparty),
            tx.explorer_url
        );
    }
    if snapshot.history_status.is_failed() {
        let _ = writeln!(out, "(showing the last list that could be read)");
    }
    out
}

#[cfg(test)]
mod tests {
    use oerc_core::{Transaction, TOKEN_DECIMALS};

    use super::*;

    const ME: &str = "0xabc0000000000000000000000000000000000123";
    const OTHER: &str = "0xdead00000000000000000000000000000000beef";

    fn tx(hash: &str, from: &str, to: &str) -> Transaction {
        Transaction {
            hash: hash.into(),
            from: from.into(),
            to: to.into(),
            raw_value: 1_500_000_000_000_000_000u64.into(),
            decimals: TOKEN_DECIMALS,
            symbol: "OERC".into(),
            timestamp: "1700000000".into(),
            explorer_url: format!("https://sepolia.etherscan.io/tx/{hash}"),
        }
    }

    #[test]
    fn status_without_wallet_suggests_generation() {
        let out = status(
            &Identity::new("bob"),
            &AccountSnapshot::default(),
            &ConnectionConf::default(),
        );
        assert!(out.contains("User:     bob"));
        assert!(out.contains("generate-wallet"));
    }

    #[test]
    fn status_shows_balance_and_short_address() {
        let mut snapshot = AccountSnapshot::for_address(ME);
        snapshot.balance = "10.5".into();
        snapshot.history_status = FetchStatus::Fetched;
        let out = status(
            &Identity::new("alice").with_address(ME),
            &snapshot,
            &ConnectionConf::default(),
        );
        assert!(out.contains("Wallet:   0xabc00000...000123"));
        assert!(out.contains("Balance:  10.5 OERC"));
        assert!(out.contains("No transactions yet"));
    }

    #[test]
    fn history_rows_show_direction() {
        let mut snapshot = AccountSnapshot::for_address(ME);
        snapshot.history_status = FetchStatus::Fetched;
        snapshot.transactions = vec![tx("0x01", ME, OTHER), tx("0x02", OTHER, ME)];

        let out = history(ME, &snapshot, None);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("sent     -1.5 OERC  0xdead0000...00beef"));
        assert!(lines[1].starts_with("received +1.5 OERC"));
        assert!(lines[1].ends_with("https://sepolia.etherscan.io/tx/0x02"));
    }

    #[test]
    fn unavailable_history_is_not_empty_history() {
        let mut snapshot = AccountSnapshot::for_address(ME);
        snapshot.history_status = FetchStatus::Failed("backend unavailable: 502".into());
        let out = history(ME, &snapshot, None);
        assert_eq!(out, "Transactions unavailable: backend unavailable: 502\n");
    }
}
