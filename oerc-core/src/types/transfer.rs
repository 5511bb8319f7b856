use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// A transfer submission, built fresh for every attempt and never persisted.
/// Serializes to the body of `POST /transfer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// Username of the custodial account paying
    pub from_username: String,
    /// Recipient address
    pub to_address: String,
    /// Amount as typed by the user; the backend validates precision and funds
    pub amount: String,
}

/// What the backend returns for an accepted transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// Transaction hash
    pub hash: String,
}

/// Result of a transfer submission that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The backend accepted the transfer
    Submitted(TransferReceipt),
    /// The user declined the confirmation; nothing was sent
    Cancelled,
}

/// The transfer form as the view holds it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferForm {
    /// Recipient address field
    pub to: String,
    /// Amount field
    pub amount: String,
}

impl TransferForm {
    /// A filled form.
    pub fn new(to: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            amount: amount.into(),
        }
    }

    /// Empty both fields.
    pub fn clear(&mut self) {
        self.to.clear();
        self.amount.clear();
    }

    /// True when both fields are empty.
    pub fn is_empty(&self) -> bool {
        self.to.is_empty() && self.amount.is_empty()
    }

    /// Check that both fields are filled in and build the request.
    pub fn to_request(&self, from_username: &str) -> Result<TransferRequest, ValidationError> {
        let to = self.to.trim();
        let amount = self.amount.trim();
        if to.is_empty() {
            return Err(ValidationError::MissingRecipient);
        }
        if amount.is_empty() {
            return Err(ValidationError::MissingAmount);
        }
        Ok(TransferRequest::new(
            from_username.to_owned(),
            to.to_owned(),
            amount.to_owned(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_uses_backend_field_names() {
        let request = TransferRequest::new("alice".into(), "0xdead".into(), "10.5".into());
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"fromUsername": "alice", "toAddress": "0xdead", "amount": "10.5"})
        );
    }

    #[test]
    fn form_requires_both_fields() {
        assert_eq!(
            TransferForm::new("", "1").to_request("alice"),
            Err(ValidationError::MissingRecipient)
        );
        assert_eq!(
            TransferForm::new("0xdead", "  ").to_request("alice"),
            Err(ValidationError::MissingAmount)
        );
        let request = TransferForm::new(" 0xdead ", "10.5").to_request("alice").unwrap();
        assert_eq!(request.to_address, "0xdead");
    }
}
