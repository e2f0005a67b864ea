use std::sync::Arc;

use anyhow::{bail, Result};
use banana_magic_frontend::{Dashboard, NftAsset, Status};
use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, info, warn};

use crate::{
    assets::{AssetIndex, GraphQlAssetIndex, NftQuery},
    config::Config,
    core::{
        account::AccountMetadata,
        address::PublicAddress,
        balance::{Balance, Lamports},
        util::{AsyncHttpClient, ReqwestClient},
    },
    error::{AuthError, FetchError},
    identity::IdentityProvider,
    ledger::{LedgerClient, RpcLedgerClient},
};

pub use state::SessionEvent;
use state::State;

mod state;

const EVENT_CAPACITY: usize = 64;

/// Drives a magic-link session and the account data that hangs off it.
///
/// The controller owns all session state. Collaborator calls are made without holding the
/// state lock, and their results are committed only if the session they were issued for is
/// still the current one.
#[derive(Debug)]
pub struct SessionController {
    identity: Arc<dyn IdentityProvider + Send + Sync>,
    ledger: Arc<dyn LedgerClient + Send + Sync>,
    assets: Arc<dyn AssetIndex + Send + Sync>,
    state: Mutex<State>,
    address: watch::Sender<Option<PublicAddress>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionController {
    /// Build a new session controller.
    pub fn builder() -> SessionControllerBuilder {
        SessionControllerBuilder::default()
    }

    /// Ask the identity provider whether a session survives from an earlier visit.
    ///
    /// If so, the session becomes active and its account metadata is loaded. A pending or
    /// active session is kept when the provider has nothing stored, and a provider error
    /// leaves state untouched unless the status is still `Unknown`.
    pub async fn check_existing_session(&self) -> Result<Status, AuthError> {
        let logged_in = match self.identity.is_logged_in().await {
            Ok(logged_in) => logged_in,
            Err(e) => {
                warn!("unable to query existing session: {e:#}");
                {
                    let mut state = self.state.lock().await;
                    if state.status == Status::Unknown {
                        self.close_session(&mut state);
                    }
                }
                let e = AuthError::provider(e);
                self.emit(SessionEvent::Failed(e.to_string()));
                return Err(e);
            }
        };

        if !logged_in {
            let mut state = self.state.lock().await;
            if let status @ (Status::LoggingIn | Status::LoggedIn) = state.status {
                debug!("no stored session, keeping {status:?}");
                return Ok(status);
            }
            self.close_session(&mut state);
            return Ok(Status::LoggedOut);
        }

        self.start_session().await;
        if let Err(e) = self.load_account_metadata().await {
            debug!("existing session restored without metadata: {e}");
        }
        Ok(Status::LoggedIn)
    }

    /// Log in with a magic link sent to `email`.
    ///
    /// Resolves once the identity provider reports the link was followed. Account metadata is
    /// loaded before returning; a failure there is reported as an event and does not undo the
    /// login. If the session changes while the provider is waiting (for example a logout),
    /// the late answer is dropped.
    pub async fn login(&self, email: &str) -> Result<(), AuthError> {
        let epoch = {
            let mut state = self.state.lock().await;
            match state.status {
                Status::LoggingIn => return Err(AuthError::InProgress),
                Status::LoggedIn => return Err(AuthError::AlreadyLoggedIn),
                Status::Unknown | Status::LoggedOut => state.reset(Status::LoggingIn),
            }
            state.epoch
        };
        self.emit(SessionEvent::StatusChanged(Status::LoggingIn));

        let result = self.identity.login_with_email_link(email).await;

        {
            let mut state = self.state.lock().await;
            let pending = state.status == Status::LoggingIn && state.epoch == epoch;
            match result {
                Err(e) => {
                    warn!("login rejected: {e:#}");
                    if pending {
                        self.close_session(&mut state);
                    }
                    drop(state);
                    let e = AuthError::rejected(e);
                    self.emit(SessionEvent::Failed(e.to_string()));
                    return Err(e);
                }
                Ok(()) if !pending => {
                    debug!("discarding login superseded by {:?}", state.status);
                    return Ok(());
                }
                Ok(()) => state.reset(Status::LoggedIn),
            }
        }
        info!("logged in");
        self.emit(SessionEvent::StatusChanged(Status::LoggedIn));

        if let Err(e) = self.load_account_metadata().await {
            debug!("logged in without metadata: {e}");
        }
        Ok(())
    }

    /// End the session.
    ///
    /// Local state is cleared even if the identity provider fails to log out, in which case
    /// the error is still returned.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let result = self.identity.logout().await;
        self.end_session().await;

        result.map_err(|e| {
            warn!("identity provider logout failed: {e:#}");
            let e = AuthError::rejected(e);
            self.emit(SessionEvent::Failed(e.to_string()));
            e
        })
    }

    /// Fetch the account metadata of the active session, replacing what is stored.
    ///
    /// When the public address changes, balance and NFTs for the new address are loaded
    /// concurrently before this returns.
    pub async fn load_account_metadata(&self) -> Result<(), AuthError> {
        let Some(epoch) = self.state.lock().await.logged_in_epoch() else {
            return Err(AuthError::NotLoggedIn);
        };

        let user = self.identity.get_metadata().await.map_err(|e| {
            warn!("unable to fetch account metadata: {e:#}");
            let e = AuthError::provider(e);
            self.emit(SessionEvent::Failed(e.to_string()));
            e
        })?;
        let metadata = AccountMetadata::from(user);
        let address = metadata.public_address().cloned();

        let changed = {
            let mut state = self.state.lock().await;
            if state.logged_in_epoch() != Some(epoch) {
                debug!("discarding metadata of a previous session");
                return Ok(());
            }
            state.metadata = metadata.clone();
            self.address.send_if_modified(|current| {
                if *current == address {
                    return false;
                }
                current.clone_from(&address);
                true
            })
        };
        self.emit(SessionEvent::MetadataLoaded(metadata));

        match address {
            Some(address) if changed => self.on_address_changed(&address).await,
            Some(_) => debug!("public address unchanged"),
            None => debug!("account has no public address"),
        }

        Ok(())
    }

    /// Fetch the balance of `address` and store it, if `address` is still the session's.
    pub async fn load_balance(&self, address: &PublicAddress) -> Result<(), FetchError> {
        let epoch = self.fetch_epoch().await?;
        address
            .to_bytes()
            .map_err(|e| self.fetch_failed(FetchError::from(e)))?;

        let lamports = self
            .ledger
            .get_balance(address)
            .await
            .map_err(|e| self.fetch_failed(FetchError::ledger(e)))?;
        let balance = Balance::from(lamports);

        {
            let mut state = self.state.lock().await;
            if !state.is_current(epoch, address) {
                debug!("discarding stale balance for {address}");
                return Ok(());
            }
            state.balance = Some(balance);
        }
        debug!("balance of {address}: {balance}");
        self.emit(SessionEvent::BalanceUpdated(balance));
        Ok(())
    }

    /// Fetch the first page of NFTs owned by `address` and store them, if `address` is still
    /// the session's. An empty list is a valid result.
    pub async fn load_nfts(&self, address: &PublicAddress) -> Result<(), FetchError> {
        let epoch = self.fetch_epoch().await?;

        let nfts = self
            .assets
            .get_nfts(&NftQuery::owned_by(address.clone()))
            .await
            .map_err(|e| self.fetch_failed(FetchError::index(e)))?;
        let count = nfts.len();

        {
            let mut state = self.state.lock().await;
            if !state.is_current(epoch, address) {
                debug!("discarding stale NFTs for {address}");
                return Ok(());
            }
            state.nfts = nfts;
        }
        debug!("{address} owns {count} NFTs");
        self.emit(SessionEvent::NftsUpdated { count });
        Ok(())
    }

    /// Request a 1 SOL airdrop to the session's address, wait for it to confirm, and refresh
    /// the balance.
    ///
    /// ## Returns
    /// The airdrop transaction signature.
    pub async fn request_airdrop(&self) -> Result<String, FetchError> {
        let (epoch, address) = {
            let mut state = self.state.lock().await;
            let Some(epoch) = state.logged_in_epoch() else {
                return Err(FetchError::NotLoggedIn);
            };
            let Some(address) = state.metadata.public_address().cloned() else {
                return Err(FetchError::MissingAddress);
            };
            if state.airdrop_pending {
                return Err(FetchError::AirdropPending);
            }
            state.airdrop_pending = true;
            (epoch, address)
        };

        let result = async {
            let signature = self
                .ledger
                .request_airdrop(&address, Lamports::ONE_SOL)
                .await?;
            self.ledger.confirm_transaction(&signature).await?;
            Ok::<_, anyhow::Error>(signature)
        }
        .await;

        {
            let mut state = self.state.lock().await;
            if state.epoch == epoch {
                state.airdrop_pending = false;
            }
        }

        let signature = result.map_err(|e| self.fetch_failed(FetchError::ledger(e)))?;
        info!("airdrop to {address} confirmed: {signature}");

        // A failed refresh has already been reported, the airdrop itself succeeded.
        let _ = self.load_balance(&address).await;

        Ok(signature)
    }

    /// Open the identity provider's settings UI.
    pub async fn show_settings(&self) -> Result<(), AuthError> {
        if !self.state.lock().await.status.is_logged_in() {
            return Err(AuthError::NotLoggedIn);
        }
        self.identity.show_settings();
        Ok(())
    }

    /// Subscribe to the session's public address. The value is `None` while logged out or
    /// before metadata is loaded.
    pub fn address_changes(&self) -> watch::Receiver<Option<PublicAddress>> {
        self.address.subscribe()
    }

    /// Subscribe to state changes and failures.
    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn status(&self) -> Status {
        self.state.lock().await.status
    }

    pub async fn metadata(&self) -> AccountMetadata {
        self.state.lock().await.metadata.clone()
    }

    pub async fn balance(&self) -> Option<Balance> {
        self.state.lock().await.balance
    }

    pub async fn nfts(&self) -> Vec<NftAsset> {
        self.state.lock().await.nfts.clone()
    }

    /// Snapshot of everything the dashboard renders.
    pub async fn dashboard(&self) -> Dashboard {
        self.state.lock().await.dashboard()
    }

    async fn on_address_changed(&self, address: &PublicAddress) {
        info!("public address is now {address}");
        let (balance, nfts) = tokio::join!(self.load_balance(address), self.load_nfts(address));
        if balance.is_err() || nfts.is_err() {
            debug!("account data for {address} is incomplete");
        }
    }

    async fn start_session(&self) {
        {
            let mut state = self.state.lock().await;
            if state.status.is_logged_in() {
                return;
            }
            state.reset(Status::LoggedIn);
        }
        self.emit(SessionEvent::StatusChanged(Status::LoggedIn));
    }

    async fn end_session(&self) {
        let mut state = self.state.lock().await;
        self.close_session(&mut state);
    }

    /// The address channel is cleared under the state lock so it never lags a reset.
    fn close_session(&self, state: &mut State) {
        state.reset(Status::LoggedOut);
        self.address.send_replace(None);
        self.emit(SessionEvent::StatusChanged(Status::LoggedOut));
    }

    async fn fetch_epoch(&self) -> Result<u64, FetchError> {
        self.state
            .lock()
            .await
            .logged_in_epoch()
            .ok_or(FetchError::NotLoggedIn)
    }

    fn fetch_failed(&self, e: FetchError) -> FetchError {
        warn!("{e}");
        self.emit(SessionEvent::Failed(e.to_string()));
        e
    }

    fn emit(&self, event: SessionEvent) {
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }
}

/// Builder struct for [SessionController].
#[derive(Debug, Clone, Default)]
pub struct SessionControllerBuilder {
    identity: Option<Arc<dyn IdentityProvider + Send + Sync>>,
    ledger: Option<Arc<dyn LedgerClient + Send + Sync>>,
    assets: Option<Arc<dyn AssetIndex + Send + Sync>>,
}

impl SessionControllerBuilder {
    /// Build the session controller.
    pub fn build(self) -> Result<SessionController> {
        let Self {
            identity,
            ledger,
            assets,
        } = self;

        let Some(identity) = identity else {
            bail!("identity provider is required, see `with_identity_provider`")
        };

        let Some(ledger) = ledger else {
            bail!("ledger client is required, see `with_ledger_client`")
        };

        let Some(assets) = assets else {
            bail!("asset index is required, see `with_asset_index`")
        };

        let (address, _) = watch::channel(None);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(SessionController {
            identity,
            ledger,
            assets,
            state: Mutex::default(),
            address,
            events,
        })
    }

    /// Set the [IdentityProvider] that logs the user in.
    pub fn with_identity_provider(
        mut self,
        identity: Arc<dyn IdentityProvider + Send + Sync>,
    ) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Set the [LedgerClient] used for balances and airdrops.
    pub fn with_ledger_client(mut self, ledger: Arc<dyn LedgerClient + Send + Sync>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Set the [AssetIndex] used to list NFTs.
    pub fn with_asset_index(mut self, assets: Arc<dyn AssetIndex + Send + Sync>) -> Self {
        self.assets = Some(assets);
        self
    }

    /// Use an [RpcLedgerClient] and a [GraphQlAssetIndex] for the endpoints in `config`, over
    /// `http_client`.
    pub fn with_endpoints(
        self,
        config: &Config,
        http_client: Arc<dyn AsyncHttpClient + Send + Sync>,
    ) -> Self {
        self.with_ledger_client(Arc::new(RpcLedgerClient::new(
            http_client.clone(),
            config.rpc_url.clone(),
        )))
        .with_asset_index(Arc::new(GraphQlAssetIndex::new(
            http_client,
            config.asset_index_url.clone(),
        )))
    }

    /// As [with_endpoints](Self::with_endpoints), over a fresh [ReqwestClient].
    pub fn with_config(self, config: &Config) -> Result<Self> {
        let http_client = Arc::new(ReqwestClient::new()?);
        Ok(self.with_endpoints(config, http_client))
    }
}
