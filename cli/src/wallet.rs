use clap::Args;
use eyre::{eyre, Result};

use oerc_base::WalletClient;
use oerc_core::WalletError;

pub async fn generate(client: &WalletClient) -> Result<()> {
    let identity = client.generate_wallet().await?;
    if let Some(address) = identity.address() {
        println!("{}", address_qr::render_terminal(address)?);
    }
    Ok(())
}

#[derive(Args)]
pub struct QrArgs {
    /// Address to encode instead of the signed in wallet
    #[clap(short, long)]
    address: Option<String>,
}

impl QrArgs {
    pub fn show(self, client: &WalletClient) -> Result<()> {
        let address = match self.address {
            Some(address) => address,
            None => client
                .identity()
                .ok_or(WalletError::NotAuthenticated)?
                .address()
                .map(str::to_owned)
                .ok_or_else(|| eyre!("{}", WalletError::MissingWallet))?,
        };
        println!("{}", address_qr::render_terminal(&address)?);
        println!("{address}");
        Ok(())
    }
}
