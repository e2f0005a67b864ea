//! Values derived from an account address for display.

use crate::{config::Cluster, core::address::PublicAddress};

/// Number of gradient avatars to pick from.
pub const GRADIENT_COUNT: u32 = 8;

/// Shown when an address cannot be decoded.
pub const PLACEHOLDER_AVATAR_URL: &str = "https://placeimg.com/80/80/people";

const GRADIENT_BASE_URL: &str = "https://holaplex.com/images/gradients";

/// Shorten an address to its first and last four characters, `EPjF...Dt1v`.
///
/// Addresses shorter than eight characters are returned unchanged.
pub fn truncate_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() < 8 {
        return address.to_owned();
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Gradient avatar for an address: the sum of its raw key bytes, modulo 8, picks one of
/// eight images.
pub fn avatar_url(address: &PublicAddress) -> String {
    match address.to_bytes() {
        Ok(bytes) => {
            let gradient = bytes.iter().map(|b| u32::from(*b)).sum::<u32>() % GRADIENT_COUNT;
            format!("{GRADIENT_BASE_URL}/gradient-{}.png", gradient + 1)
        }
        Err(e) => {
            tracing::debug!("using placeholder avatar for {address}: {e}");
            PLACEHOLDER_AVATAR_URL.to_owned()
        }
    }
}

/// Block explorer link for a transaction.
pub fn explorer_tx_url(signature: &str, cluster: &Cluster) -> String {
    match cluster {
        Cluster::MainnetBeta => format!("https://explorer.solana.com/tx/{signature}"),
        cluster => format!("https://explorer.solana.com/tx/{signature}?cluster={cluster}"),
    }
}
