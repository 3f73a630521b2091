//! Per-session account snapshot cache

use std::collections::HashMap;
use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;

use crate::error::{Error, Result};
use crate::fetch::{AccountFetcher, AccountSnapshot};

/// Memoizes fetched snapshots by address for the lifetime of a resolution
/// session
///
/// Resolution is a planning step that assumes the queried state is stable
/// for the duration of the walk, so entries never expire or invalidate.
/// The cache is owned by exactly one resolver; concurrent sessions each
/// hold their own.
#[derive(Default)]
pub struct AccountCache {
    entries: HashMap<Pubkey, Arc<AccountSnapshot>>,
}

impl AccountCache {
    /// Create an empty cache
    pub fn new() -> Self {
        AccountCache::default()
    }

    /// Return the cached snapshot for `address`, fetching and storing it
    /// on first request
    ///
    /// Fails with [`Error::AccountNotFound`] when the fetcher reports the
    /// address has no account; resolution cannot proceed without the data
    /// a condition or reference depends on.
    pub async fn get_or_fetch(
        &mut self,
        fetcher: &dyn AccountFetcher,
        address: &Pubkey,
    ) -> Result<Arc<AccountSnapshot>> {
        if let Some(snapshot) = self.entries.get(address) {
            return Ok(Arc::clone(snapshot));
        }

        let snapshot = fetcher
            .fetch(address)
            .await?
            .ok_or(Error::AccountNotFound { address: *address })?;
        let snapshot = Arc::new(snapshot);
        self.entries.insert(*address, Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Number of cached snapshots
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been fetched yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    struct CountingFetcher {
        accounts: HashMap<Pubkey, AccountSnapshot>,
        fetches: AtomicUsize,
    }

    impl CountingFetcher {
        fn with_account(address: Pubkey, owner: Pubkey) -> Self {
            let mut accounts = HashMap::new();
            accounts.insert(
                address,
                AccountSnapshot {
                    owner,
                    data: vec![],
                    lamports: 1,
                    executable: false,
                },
            );
            CountingFetcher {
                accounts,
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AccountFetcher for CountingFetcher {
        async fn fetch(&self, address: &Pubkey) -> Result<Option<AccountSnapshot>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.accounts.get(address).cloned())
        }
    }

    #[tokio::test]
    async fn second_request_does_not_refetch() {
        let address = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let fetcher = CountingFetcher::with_account(address, owner);
        let mut cache = AccountCache::new();

        let first = cache.get_or_fetch(&fetcher, &address).await.unwrap();
        let second = cache.get_or_fetch(&fetcher, &address).await.unwrap();

        assert_eq!(first.owner, owner);
        assert_eq!(second.owner, owner);
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn missing_account_is_fatal() {
        let fetcher = CountingFetcher::with_account(Pubkey::new_unique(), Pubkey::new_unique());
        let mut cache = AccountCache::new();

        let absent = Pubkey::new_unique();
        let err = cache.get_or_fetch(&fetcher, &absent).await.unwrap_err();
        assert!(matches!(err, Error::AccountNotFound { address } if address == absent));
        assert!(!err.is_retriable());
        assert!(cache.is_empty());
    }
}
