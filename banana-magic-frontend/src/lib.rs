//! Banana Magic data structures that are needed on the frontend, without all of the other
//! dependencies that can cause compilation issues with web targets.
use serde::{Deserialize, Serialize};

/// Login status of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// The identity provider has not been asked about an existing session yet.
    #[default]
    Unknown,
    /// No session, the login form should be shown.
    LoggedOut,
    /// A magic link has been requested and the user has not completed it yet.
    LoggingIn,
    /// The identity provider reports an active session.
    LoggedIn,
}

impl Status {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, Status::LoggedIn)
    }
}

/// A collectible owned by the logged in account, as returned by the asset index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftAsset {
    pub address: String,
    pub mint_address: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub image: String,
}

/// Everything the dashboard renders, captured at a single point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub status: Status,
    pub email: Option<String>,
    pub public_address: Option<String>,
    /// `ABCD...WXYZ` form of the address, for the navigation bar.
    pub short_address: Option<String>,
    pub avatar_url: Option<String>,
    /// Balance in SOL, if it has been fetched.
    pub balance: Option<f64>,
    pub nfts: Vec<NftAsset>,
    pub airdrop_pending: bool,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn nft_asset_from_index_json() {
        let nft: NftAsset = serde_json::from_str(
            r#"{
                "address": "7cZ1rqTHcbFK1FNMe2Bb9wVRTYbdYVHUHeSSeCSj8cZd",
                "mintAddress": "9ARngHhVaCtH5JFieRdSS5Y8cdZk2TMF4tfGSWFB9iSK",
                "name": "Banana #12",
                "image": "https://arweave.net/banana12.png"
            }"#,
        )
        .unwrap();

        assert_eq!(nft.mint_address, "9ARngHhVaCtH5JFieRdSS5Y8cdZk2TMF4tfGSWFB9iSK");
        assert_eq!(nft.description, "");
    }

    #[test]
    fn default_dashboard_is_unknown_and_empty() {
        let dashboard = Dashboard::default();
        assert_eq!(dashboard.status, Status::Unknown);
        assert!(!dashboard.status.is_logged_in());
        assert!(dashboard.nfts.is_empty());
        assert_eq!(dashboard.balance, None);
    }
}
