use clap::Args;

use oerc_base::{settings::Settings, WalletClient};

use crate::view;

pub fn status(client: &WalletClient, settings: &Settings) {
    match client.identity() {
        Some(identity) => print!(
            "{}",
            view::status(&identity, &client.snapshot(), &settings.chain)
        ),
        None => println!("Not signed in"),
    }
}

pub async fn refresh(client: &WalletClient, settings: &Settings) {
    // outcome is reported through the notifier
    client.refresh().await;
    status(client, settings);
}

#[derive(Args)]
pub struct HistoryArgs {
    /// Show at most this many rows
    #[clap(short, long)]
    limit: Option<usize>,
}

impl HistoryArgs {
    pub fn history(self, client: &WalletClient) {
        let snapshot = client.snapshot();
        let Some(address) = snapshot.address.clone() else {
            println!("No wallet to show transactions for");
            return;
        };
        print!("{}", view::history(&address, &snapshot, self.limit));
    }
}
