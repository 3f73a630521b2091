//! Account fetch capability
//!
//! The engine never talks to the network directly: it consumes an
//! [`AccountFetcher`] the caller supplies. [`RpcFetcher`] is the bundled
//! implementation over a nonblocking Solana RPC client; tests and servers
//! with their own account stores implement the trait themselves.

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;

use crate::error::{Error, Result};

/// Snapshot of an on-chain account at fetch time
///
/// The resolution algorithm itself only reads `owner`; the remaining
/// fields are carried so field extraction can grow without changing the
/// fetch contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    /// Address of the program that owns the account
    pub owner: Pubkey,
    /// Raw account data
    pub data: Vec<u8>,
    /// Balance in lamports
    pub lamports: u64,
    /// Whether the account holds an executable program
    pub executable: bool,
}

impl From<Account> for AccountSnapshot {
    fn from(account: Account) -> Self {
        AccountSnapshot {
            owner: account.owner,
            data: account.data,
            lamports: account.lamports,
            executable: account.executable,
        }
    }
}

/// Capability to fetch account snapshots by address
///
/// `Ok(None)` means the address has no account; transport failures map to
/// [`Error::Rpc`]. The engine treats both as fatal for the resolution in
/// progress, but only the latter as retriable by the caller.
#[async_trait]
pub trait AccountFetcher: Send + Sync {
    /// Fetch the snapshot for `address`, or `None` if it does not exist
    async fn fetch(&self, address: &Pubkey) -> Result<Option<AccountSnapshot>>;
}

/// [`AccountFetcher`] backed by a Solana RPC node
pub struct RpcFetcher {
    client: RpcClient,
}

impl RpcFetcher {
    /// Create a fetcher for the given RPC endpoint
    pub fn new(url: impl ToString) -> Self {
        RpcFetcher {
            client: RpcClient::new(url.to_string()),
        }
    }

    /// Wrap an existing client, keeping its commitment configuration
    pub fn with_client(client: RpcClient) -> Self {
        RpcFetcher { client }
    }
}

#[async_trait]
impl AccountFetcher for RpcFetcher {
    async fn fetch(&self, address: &Pubkey) -> Result<Option<AccountSnapshot>> {
        let response = self
            .client
            .get_account_with_commitment(address, self.client.commitment())
            .await
            .map_err(|e| Error::Rpc {
                message: e.to_string(),
            })?;
        Ok(response.value.map(AccountSnapshot::from))
    }
}
