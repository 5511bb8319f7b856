use serde::{Deserialize, Serialize};

/// The authenticated user: a username plus the custodial wallet address, once
/// one has been provisioned.
///
/// The serialized form matches the backend's login response, so the same
/// record is used on the wire and in the local session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Account name
    pub username: String,
    /// Custodial wallet address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
}

impl Identity {
    /// An identity without a wallet.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            wallet_address: None,
        }
    }

    /// The wallet address, if present and not blank.
    pub fn address(&self) -> Option<&str> {
        self.wallet_address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }

    /// True when balance and history can be read for this identity.
    pub fn has_wallet(&self) -> bool {
        self.address().is_some()
    }

    /// Copy of this identity with the given wallet address.
    pub fn with_address(&self, address: impl Into<String>) -> Self {
        Self {
            username: self.username.clone(),
            wallet_address: Some(address.into()),
        }
    }

    /// Normalize the record received from the backend: blank addresses are
    /// treated as absent.
    pub fn normalized(mut self) -> Self {
        self.wallet_address = self.address().map(str::to_owned);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_without_address() {
        let identity: Identity = serde_json::from_str(r#"{"username":"alice"}"#).unwrap();
        assert_eq!(identity, Identity::new("alice"));
        assert!(!identity.has_wallet());
    }

    #[test]
    fn blank_address_is_absent() {
        let identity: Identity =
            serde_json::from_str(r#"{"username":"bob","wallet_address":"  "}"#).unwrap();
        assert_eq!(identity.address(), None);
        assert_eq!(identity.normalized().wallet_address, None);
    }

    #[test]
    fn serialized_form_omits_missing_address() {
        let json = serde_json::to_string(&Identity::new("carol")).unwrap();
        assert_eq!(json, r#"{"username":"carol"}"#);

        let with = Identity::new("carol").with_address("0xabc");
        let json = serde_json::to_string(&with).unwrap();
        assert_eq!(json, r#"{"username":"carol","wallet_address":"0xabc"}"#);
    }
}
