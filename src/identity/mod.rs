use std::{collections::BTreeMap, fmt::Debug, sync::Arc};

use anyhow::{bail, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::core::account::UserMetadata;

/// Email magic-link identity provider.
///
/// The provider owns key management and session persistence; a session controller only
/// drives it through this interface.
#[async_trait]
pub trait IdentityProvider: Debug {
    /// Send a magic link to `email` and resolve once the user has followed it.
    ///
    /// Email format validation is the provider's job.
    async fn login_with_email_link(&self, email: &str) -> Result<()>;

    /// End the provider-side session.
    async fn logout(&self) -> Result<()>;

    /// Whether the provider holds a session from an earlier visit.
    async fn is_logged_in(&self) -> Result<bool>;

    /// Metadata of the logged in user.
    async fn get_metadata(&self) -> Result<UserMetadata>;

    /// Open the provider-hosted settings UI. Fire and forget.
    fn show_settings(&self);
}

/// A local in-memory identity provider. Not for production use!
///
/// # Warning
/// Logins complete immediately without any email being sent. This provider should only be
/// used for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct MemoryIdentityProvider {
    accounts: Arc<Mutex<BTreeMap<String, UserMetadata>>>,
    current: Arc<Mutex<Option<String>>>,
}

impl MemoryIdentityProvider {
    /// Register an account that can log in with `email`.
    pub async fn register(&self, email: &str, public_address: Option<&str>) {
        self.accounts.lock().await.insert(
            email.to_owned(),
            UserMetadata {
                email: Some(email.to_owned()),
                public_address: public_address.map(ToOwned::to_owned),
            },
        );
    }

    /// Start with `email` already logged in, as if restored from a previous visit.
    pub async fn restore_session(&self, email: &str) {
        *self.current.lock().await = Some(email.to_owned());
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn login_with_email_link(&self, email: &str) -> Result<()> {
        let email = email.trim();
        if email.is_empty() {
            bail!("email address is required")
        }
        if !email.contains('@') {
            bail!("invalid email address: {email}")
        }
        if !self.accounts.try_lock()?.contains_key(email) {
            bail!("no account registered for {email}")
        }

        *self.current.try_lock()? = Some(email.to_owned());

        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        self.current.try_lock()?.take();

        Ok(())
    }

    async fn is_logged_in(&self) -> Result<bool> {
        Ok(self.current.try_lock()?.is_some())
    }

    async fn get_metadata(&self) -> Result<UserMetadata> {
        let Some(email) = self.current.try_lock()?.clone() else {
            bail!("not logged in")
        };

        if let Some(metadata) = self.accounts.try_lock()?.get(&email) {
            return Ok(metadata.clone());
        }

        bail!("account not found")
    }

    fn show_settings(&self) {
        debug!("settings requested");
    }
}
