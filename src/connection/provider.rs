//! Wallet provider seam.
//!
//! The wallet (account discovery, network identity, chain switching, signing)
//! is an external collaborator. This module defines the trait the rest of the
//! crate programs against, plus the identity and network types shared across
//! components. Raw provider data (plain account strings, numeric chain ids) is
//! converted into the strict types here at the boundary.

use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

/// Opaque account principal a connection is authenticated as.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity(String);

impl Identity {
	pub fn new(account: impl Into<String>) -> Self {
		Self(account.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Identity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Native currency descriptor for a network registration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeCurrency {
	pub name: String,
	pub symbol: String,
	pub decimals: u8,
}

/// A specific remote network a connection targets.
///
/// Ledger operations are only valid while the active provider network equals
/// the contract's deployment network; a mismatch is a precondition failure,
/// never a silent no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkIdentity {
	pub chain_id: u64,
	pub chain_name: String,
	pub rpc_url: String,
	pub native_currency: NativeCurrency,
	pub block_explorer_url: String,
}

impl NetworkIdentity {
	/// The Conflux eSpace testnet, where the guestbook contract is deployed.
	pub fn conflux_espace_testnet() -> Self {
		Self {
			chain_id: 71,
			chain_name: "Conflux eSpace Testnet".to_string(),
			rpc_url: "https://evmtestnet.confluxrpc.com".to_string(),
			native_currency: NativeCurrency {
				name: "Conflux".to_string(),
				symbol: "CFX".to_string(),
				decimals: 18,
			},
			block_explorer_url: "https://evmtestnet.confluxscan.io".to_string(),
		}
	}

	/// Parameters for the provider's network registration call, in the
	/// `wallet_addEthereumChain` shape (chain id as a hex string, URLs as lists).
	pub fn add_chain_params(&self) -> serde_json::Value {
		json!({
			"chainId": format!("0x{:x}", self.chain_id),
			"chainName": self.chain_name,
			"rpcUrls": [self.rpc_url],
			"nativeCurrency": self.native_currency,
			"blockExplorerUrls": [self.block_explorer_url],
		})
	}
}

/// Errors from the wallet provider itself.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
	#[error("wallet provider is not available")]
	Unavailable,

	#[error("request rejected by the user")]
	Rejected,

	#[error("provider rpc error: {0}")]
	Rpc(String),
}

/// Errors from a network-switch request.
#[derive(Debug, thiserror::Error)]
pub enum SwitchChainError {
	/// The target chain is not registered with the provider and must be added
	/// before switching.
	#[error("chain {0} is not registered with the provider")]
	UnknownChain(u64),

	#[error(transparent)]
	Provider(#[from] ProviderError),
}

/// Wallet connectivity provider.
///
/// All methods are remote calls and therefore suspension points. The account
/// change stream delivers the full (possibly empty) account list on every
/// change, mirroring the provider's own notification semantics.
#[async_trait::async_trait]
pub trait WalletProvider: Send + Sync {
	/// Request account access, returning the ordered list of identities.
	async fn request_accounts(&self) -> Result<Vec<String>, ProviderError>;

	/// The provider's currently active chain id.
	async fn chain_id(&self) -> Result<u64, ProviderError>;

	/// Ask the provider to switch its active chain.
	async fn switch_chain(&self, chain_id: u64) -> Result<(), SwitchChainError>;

	/// Register a network with the provider so it can be switched to.
	async fn add_chain(&self, network: &NetworkIdentity) -> Result<(), ProviderError>;

	/// Subscribe to account-change notifications.
	async fn account_changes(&self) -> Result<BoxStream<'static, Vec<String>>, ProviderError>;
}
