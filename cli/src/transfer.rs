use std::path::PathBuf;

use clap::Args;
use eyre::{eyre, Result};

use oerc_base::WalletClient;
use oerc_core::{TransferForm, TransferOutcome};

#[derive(Args)]
pub struct TransferArgs {
    /// Recipient address
    #[clap(short, long, required_unless_present = "to_qr")]
    to: Option<String>,
    /// Read the recipient from a picture of their QR code
    #[clap(long, value_name = "IMAGE", conflicts_with = "to")]
    to_qr: Option<PathBuf>,
    /// Amount in whole tokens, e.g. 10.5
    #[clap(short, long)]
    amount: String,
}

impl TransferArgs {
    async fn recipient(&self) -> Result<String> {
        if let Some(path) = &self.to_qr {
            let scanned = address_qr::scan_image(path)
                .await?
                .ok_or_else(|| eyre!("no QR code found in {}", path.display()))?;
            println!("Scanned recipient {scanned}");
            return Ok(scanned);
        }
        Ok(self.to.clone().unwrap_or_default())
    }

    pub async fn transfer(self, client: &WalletClient) -> Result<()> {
        let mut form = TransferForm::new(self.recipient().await?, self.amount);
        match client.transfer(&mut form).await? {
            TransferOutcome::Submitted(_) => {
                let snapshot = client.snapshot();
                println!("New balance: {}", snapshot.balance);
            }
            TransferOutcome::Cancelled => println!("Cancelled"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: TransferArgs,
    }

    #[test]
    fn recipient_comes_from_exactly_one_flag() {
        assert!(Harness::try_parse_from(["oerc", "--amount", "1"]).is_err());
        assert!(Harness::try_parse_from([
            "oerc", "--to", "0xabc", "--to-qr", "a.png", "--amount", "1"
        ])
        .is_err());
        let parsed =
            Harness::try_parse_from(["oerc", "--to-qr", "a.png", "--amount", "1"]).unwrap();
        assert_eq!(parsed.args.to_qr, Some(PathBuf::from("a.png")));
    }

    #[tokio::test]
    async fn qr_picture_fills_the_recipient() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bob.png");
        let address = "0xb0b0000000000000000000000000000000000456";
        let frame = address_qr::encode(address).unwrap();
        image::GrayImage::from_raw(
            frame.width() as u32,
            frame.height() as u32,
            frame.as_bytes().to_vec(),
        )
        .unwrap()
        .save(&path)
        .unwrap();

        let parsed = Harness::try_parse_from([
            "oerc",
            "--to-qr",
            path.to_str().unwrap(),
            "--amount",
            "1",
        ])
        .unwrap();
        assert_eq!(parsed.args.recipient().await.unwrap(), address);
    }
}
