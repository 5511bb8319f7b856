use std::sync::Arc;

use clap::{Parser, Subcommand};
use eyre::Result;

use oerc_base::{settings::Settings, WalletClient};

mod account;
mod auth;
mod terminal;
mod transfer;
mod view;
mod wallet;

use account::HistoryArgs;
use auth::AuthArgs;
use terminal::{TerminalNotifier, TerminalPrompt};
use transfer::TransferArgs;
use wallet::QrArgs;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let settings = Settings::load()?;
    settings.tracing.start_tracing()?;

    let client = WalletClient::from_settings(
        &settings,
        Arc::new(TerminalPrompt::new(cli.yes)),
        Arc::new(TerminalNotifier),
    )?;
    if cli.command.shows_account() {
        client.start().await;
    } else {
        client.resume();
    }

    match cli.command {
        Command::Login(args) => args.login(&client).await?,
        Command::Register(args) => args.register(&client).await?,
        Command::Logout => {
            client.logout()?;
            println!("Signed out");
        }
        Command::Status => account::status(&client, &settings),
        Command::Refresh => account::refresh(&client, &settings).await,
        Command::History(args) => args.history(&client),
        Command::Transfer(args) => args.transfer(&client).await?,
        Command::GenerateWallet => wallet::generate(&client).await?,
        Command::Qr(args) => args.show(&client)?,
    }
    Ok(())
}

#[derive(Parser)]
#[clap(version, about)]
// Terminal client for OERC custodial wallets
struct Cli {
    /// Answer yes to every confirmation
    #[clap(long, short, global = true)]
    yes: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in
    Login(AuthArgs),
    /// Create an account and sign in
    Register(AuthArgs),
    /// Sign out and forget the stored session
    Logout,
    /// Show the account overview
    Status,
    /// Re-read balance and transactions
    Refresh,
    /// List transactions
    History(HistoryArgs),
    /// Send tokens
    Transfer(TransferArgs),
    /// Create a custodial wallet for the signed in account
    #[clap(name = "generate-wallet")]
    GenerateWallet,
    /// Show the receive address as a QR code
    Qr(QrArgs),
}

impl Command {
    /// Commands that print the cached account and need it synced first.
    /// `refresh` and `transfer` read the account themselves.
    fn shows_account(&self) -> bool {
        matches!(self, Command::Status | Command::History(_))
    }
}
