//! This library drives the session behind the Banana Magic dashboard: a passwordless
//! [magic-link] login, the resulting Solana account's balance, and the NFTs it owns.
//!
//! [magic-link]: <https://magic.link/docs/authentication/login/email-magic-links>
//!
//! # Usage
//!
//! Build a [`SessionController`] from its three collaborators:
//!
//! ```ignore
//! use banana_magic::{config::Config, session::SessionController};
//!
//! let config = Config::from_env()?;
//!
//! let controller = SessionController::builder()
//!     .with_identity_provider(identity_provider)
//!     .with_config(&config)?
//!     .build()?;
//!
//! // On page load, restore a session from an earlier visit.
//! if !controller.check_existing_session().await?.is_logged_in() {
//!     // Show the login form, then:
//!     controller.login("banana@example.com").await?;
//! }
//!
//! // Render the dashboard.
//! let dashboard = controller.dashboard().await;
//! println!("{} holds {:?} SOL", dashboard.short_address.unwrap_or_default(), dashboard.balance);
//! ```
//!
//! The controller's behavior can be customized by implementing the [`IdentityProvider`],
//! [`LedgerClient`] and [`AssetIndex`] traits.
//!
//! [`SessionController`]: crate::session::SessionController
//! [`IdentityProvider`]: crate::identity::IdentityProvider
//! [`LedgerClient`]: crate::ledger::LedgerClient
//! [`AssetIndex`]: crate::assets::AssetIndex
//!
//! # Session Lifecycle
//!
//! 1. *Startup*: the identity provider is asked for a session persisted from an earlier
//!    visit. The status leaves `Unknown` for `LoggedIn` or `LoggedOut`.
//! 2. *Login*: the user submits an email address, the provider sends a magic link and the
//!    status is `LoggingIn` until the link is followed.
//! 3. *Account metadata*: once logged in, the email and public address are fetched.
//! 4. *Derived fetches*: whenever the public address changes, the balance and the first
//!    page of owned NFTs are fetched concurrently.
//! 5. *Logout*: all account data is cleared.
//!
//! Every login and logout starts a new session epoch. Responses that arrive for an older
//! epoch are dropped, so a slow balance lookup can never leak into the next session.
//!
//! Failures are reported through [`SessionEvent::Failed`] and leave the previous value in
//! place.
//!
//! [`SessionEvent::Failed`]: crate::session::SessionEvent::Failed

pub mod assets;
pub mod config;
pub mod core;
pub mod display;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod session;
pub use banana_magic_frontend::{Dashboard, NftAsset, Status};
