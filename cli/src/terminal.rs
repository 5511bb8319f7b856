use std::io::{self, BufRead, Write};

use async_trait::async_trait;
use tracing::warn;

use oerc_core::{Confirmation, Notice, Notifier, UserPrompt};

/// Asks for confirmation on stdin.
#[derive(Debug)]
pub struct TerminalPrompt {
    assume_yes: bool,
}

impl TerminalPrompt {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

#[async_trait]
impl UserPrompt for TerminalPrompt {
    async fn confirm(&self, confirmation: &Confirmation) -> bool {
        if self.assume_yes {
            return true;
        }
        let question = format!("{confirmation} [y/N] ");
        let answer = tokio::task::spawn_blocking(move || -> io::Result<String> {
            let mut stdout = io::stdout();
            stdout.write_all(question.as_bytes())?;
            stdout.flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            Ok(line)
        })
        .await;
        match answer {
            Ok(Ok(line)) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Ok(Err(err)) => {
                warn!(error = %err, "Failed to read confirmation");
                false
            }
            Err(err) => {
                warn!(error = %err, "Confirmation prompt panicked");
                false
            }
        }
    }
}

/// Prints notices as they arrive.
#[derive(Debug)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::Busy(activity) => eprintln!("{activity}..."),
            Notice::Done(_) => {}
            Notice::Updated => println!("Updated"),
            Notice::RefreshFailed(reason) => eprintln!("Could not refresh: {reason}"),
            Notice::Incomplete(err) => eprintln!("Please fill in the form: {err}"),
            Notice::Welcome { username } => println!("Welcome, {username}"),
            Notice::AuthFailed(reason) => eprintln!("Authentication failed: {reason}"),
            Notice::TransferSubmitted { hash } => println!("Transfer submitted: {hash}"),
            Notice::TransferFailed(reason) => eprintln!("Transfer failed: {reason}"),
            Notice::WalletCreated { address } => println!("Wallet created: {address}"),
            Notice::WalletFailed(reason) => eprintln!("Wallet creation failed: {reason}"),
        }
    }
}
