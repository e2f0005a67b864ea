use serde::{Deserialize, Serialize};

use super::address::PublicAddress;

/// User metadata as returned by the identity provider. Either field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMetadata {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub public_address: Option<String>,
}

/// Account metadata held by a session.
///
/// Replaced as a whole on every fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AccountMetadata {
    #[default]
    Unloaded,
    Loaded {
        email: Option<String>,
        public_address: Option<PublicAddress>,
    },
}

impl AccountMetadata {
    pub fn email(&self) -> Option<&str> {
        match self {
            AccountMetadata::Loaded { email, .. } => email.as_deref(),
            AccountMetadata::Unloaded => None,
        }
    }

    pub fn public_address(&self) -> Option<&PublicAddress> {
        match self {
            AccountMetadata::Loaded { public_address, .. } => public_address.as_ref(),
            AccountMetadata::Unloaded => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, AccountMetadata::Loaded { .. })
    }
}

impl From<UserMetadata> for AccountMetadata {
    fn from(value: UserMetadata) -> Self {
        // An empty address string carries no information, treat it as absent.
        let public_address = value
            .public_address
            .map(PublicAddress::from)
            .filter(|address| !address.is_empty());
        AccountMetadata::Loaded {
            email: value.email,
            public_address,
        }
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn from_provider_json() {
        let user: UserMetadata = serde_json::from_value(json!({
            "email": "USDCOIN@solana.com",
            "publicAddress": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
            "issuer": "did:ethr:0x0"
        }))
        .unwrap();

        let metadata = AccountMetadata::from(user);
        assert_eq!(metadata.email(), Some("USDCOIN@solana.com"));
        assert_eq!(
            metadata.public_address().map(PublicAddress::as_str),
            Some("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v")
        );
    }

    #[test]
    fn empty_address_is_absent() {
        let metadata = AccountMetadata::from(UserMetadata {
            email: None,
            public_address: Some(String::new()),
        });
        assert!(metadata.is_loaded());
        assert_eq!(metadata.public_address(), None);
    }
}
