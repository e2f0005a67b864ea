use banana_magic_frontend::{Dashboard, NftAsset, Status};

use crate::{
    core::{account::AccountMetadata, address::PublicAddress, balance::Balance},
    display::{avatar_url, truncate_address},
};

/// Something the presentation layer may want to re-render for.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    StatusChanged(Status),
    MetadataLoaded(AccountMetadata),
    BalanceUpdated(Balance),
    NftsUpdated { count: usize },
    /// An operation failed. The state it would have written is unchanged.
    Failed(String),
}

/// Everything a session controller owns.
#[derive(Debug, Default)]
pub(super) struct State {
    pub status: Status,
    /// Bumped whenever a session starts or ends. Responses captured under an older epoch are
    /// dropped.
    pub epoch: u64,
    pub metadata: AccountMetadata,
    pub balance: Option<Balance>,
    pub nfts: Vec<NftAsset>,
    pub airdrop_pending: bool,
}

impl State {
    /// Enter `status`, starting a fresh epoch with all account data cleared.
    pub fn reset(&mut self, status: Status) {
        *self = State {
            status,
            epoch: self.epoch + 1,
            ..State::default()
        };
    }

    /// The epoch of the active session, if any.
    pub fn logged_in_epoch(&self) -> Option<u64> {
        self.status.is_logged_in().then_some(self.epoch)
    }

    /// Whether a response fetched for `address` under `epoch` still belongs to this session.
    pub fn is_current(&self, epoch: u64, address: &PublicAddress) -> bool {
        self.logged_in_epoch() == Some(epoch) && self.metadata.public_address() == Some(address)
    }

    pub fn dashboard(&self) -> Dashboard {
        let public_address = self.metadata.public_address();
        Dashboard {
            status: self.status,
            email: self.metadata.email().map(ToOwned::to_owned),
            public_address: public_address.map(ToString::to_string),
            short_address: public_address.map(|a| truncate_address(a.as_str())),
            avatar_url: public_address.map(avatar_url),
            balance: self.balance.map(|b| b.sol()),
            nfts: self.nfts.clone(),
            airdrop_pending: self.airdrop_pending,
        }
    }
}
