use std::sync::Arc;

/// Authentication error, raised by the identity provider or by an invalid session transition.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    /// The identity provider refused the login or logout request.
    #[error("identity provider rejected the request: {0}")]
    Rejected(Arc<anyhow::Error>),

    /// A login is already waiting for the user to follow the magic link.
    #[error("a login is already in progress")]
    InProgress,

    /// A session is already active, log out first.
    #[error("already logged in")]
    AlreadyLoggedIn,

    /// The operation needs an active session.
    #[error("not logged in")]
    NotLoggedIn,

    /// The identity provider could not be reached or answered with something unusable.
    #[error("identity provider failure: {0}")]
    Provider(Arc<anyhow::Error>),
}

/// Balance, airdrop or NFT lookup error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// The account address is not a valid base58 encoded public key.
    #[error("invalid account address: {0}")]
    InvalidAddress(#[from] DecodeError),

    /// The operation needs an active session.
    #[error("not logged in")]
    NotLoggedIn,

    /// No public address is known for the current session.
    #[error("no public address is known for this session")]
    MissingAddress,

    /// An airdrop is already being confirmed.
    #[error("an airdrop is already pending")]
    AirdropPending,

    /// The ledger RPC node failed to answer.
    #[error("ledger request failed: {0}")]
    Ledger(Arc<anyhow::Error>),

    /// The asset index failed to answer.
    #[error("asset index request failed: {0}")]
    Index(Arc<anyhow::Error>),
}

/// Address decoding error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("not valid base58: {0}")]
    Base58(String),

    #[error("expected 32 bytes, found {0}")]
    Length(usize),
}

impl From<bs58::decode::Error> for DecodeError {
    fn from(e: bs58::decode::Error) -> Self {
        Self::Base58(e.to_string())
    }
}

impl AuthError {
    pub(crate) fn rejected(e: anyhow::Error) -> Self {
        Self::Rejected(Arc::new(e))
    }

    pub(crate) fn provider(e: anyhow::Error) -> Self {
        Self::Provider(Arc::new(e))
    }
}

impl FetchError {
    pub(crate) fn ledger(e: anyhow::Error) -> Self {
        Self::Ledger(Arc::new(e))
    }

    pub(crate) fn index(e: anyhow::Error) -> Self {
        Self::Index(Arc::new(e))
    }
}
