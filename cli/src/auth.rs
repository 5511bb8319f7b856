use clap::Args;
use eyre::Result;

use oerc_base::WalletClient;
use oerc_core::Credentials;

#[derive(Args)]
pub struct AuthArgs {
    #[clap(short, long)]
    username: String,
    #[clap(short, long, env = "OERC_PASSWORD", hide_env_values = true)]
    password: String,
}

impl AuthArgs {
    fn credentials(self) -> Credentials {
        Credentials::new(self.username, self.password)
    }

    pub async fn login(self, client: &WalletClient) -> Result<()> {
        let identity = client.login(self.credentials()).await?;
        if !identity.has_wallet() {
            println!("No wallet yet, run `oerc generate-wallet` to create one");
        }
        Ok(())
    }

    pub async fn register(self, client: &WalletClient) -> Result<()> {
        client.register(self.credentials()).await?;
        println!("Account created");
        Ok(())
    }
}
