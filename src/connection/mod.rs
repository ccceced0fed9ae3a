//! Wallet connection management.
//!
//! This module owns everything between the application and the user's wallet:
//! account discovery, network validation and switching, and account-change
//! notifications. The [`ConnectionManager`] is the only mutator of
//! [`ConnectionState`]; every other component observes the state through a
//! watch channel.

/// Connection state machine and network validation
mod manager;
/// Wallet provider seam and identity types
mod provider;

pub use manager::{ConnectError, ConnectionManager, ConnectionState};
pub use provider::{
	Identity, NativeCurrency, NetworkIdentity, ProviderError, SwitchChainError, WalletProvider,
};
