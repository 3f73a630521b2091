//! Plan walker, condition evaluator, and single-account resolver

use std::collections::HashMap;

use futures_util::future::BoxFuture;
use solana_sdk::instruction::AccountMeta;
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, trace};

use crate::cache::AccountCache;
use crate::error::{Error, Result};
use crate::fetch::AccountFetcher;
use crate::pda;
use crate::plan::{AccountRef, Condition, ConditionKey, PlanNode};
use crate::resolver::Context;

/// Signature of the associated-token derivation capability
pub type AtaDerivation = fn(&Pubkey, &Pubkey) -> Pubkey;

/// The ordered remaining-accounts list produced by one resolution
///
/// `accounts` is appended verbatim to the instruction being built; its
/// order must match the positional expectation of the on-chain program
/// decoding the remaining accounts. `order` lists the same addresses in
/// the same first-seen order, for callers that only need the key set.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAccounts {
    /// Account metas in first-seen order, each address unique
    pub accounts: Vec<AccountMeta>,
    /// The addresses of `accounts`, in the same order
    pub order: Vec<Pubkey>,
}

impl ResolvedAccounts {
    /// Number of resolved accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the plan contributed no remaining accounts
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// Ordered, deduplicated account collection built up during a walk
///
/// Invariants: an address appears in `order` exactly once, at the
/// position it was first merged; once a meta's writable flag is true no
/// later merge can clear it.
#[derive(Default)]
struct Accumulator {
    order: Vec<Pubkey>,
    metas: HashMap<Pubkey, AccountMeta>,
}

impl Accumulator {
    fn merge(&mut self, meta: AccountMeta) {
        match self.metas.get_mut(&meta.pubkey) {
            Some(existing) => {
                trace!(address = %meta.pubkey, "upgrading existing account meta");
                if !existing.is_writable {
                    existing.is_writable = meta.is_writable;
                }
            }
            None => {
                self.order.push(meta.pubkey);
                self.metas.insert(meta.pubkey, meta);
            }
        }
    }

    /// Merge a sub-walk's result, preserving the sub-result's own order
    /// for addresses not seen before
    fn absorb(&mut self, mut sub: Accumulator) {
        for address in sub.order.drain(..) {
            let meta = sub
                .metas
                .remove(&address)
                .expect("accumulator order entries always have a meta");
            self.merge(meta);
        }
    }

    fn into_resolved(self) -> ResolvedAccounts {
        let mut metas = self.metas;
        let accounts = self
            .order
            .iter()
            .map(|address| {
                metas
                    .remove(address)
                    .expect("accumulator order entries always have a meta")
            })
            .collect();
        ResolvedAccounts {
            accounts,
            order: self.order,
        }
    }
}

fn meta(pubkey: Pubkey, writable: bool) -> AccountMeta {
    if writable {
        AccountMeta::new(pubkey, false)
    } else {
        AccountMeta::new_readonly(pubkey, false)
    }
}

/// Resolves plans against live account state
///
/// Owns the fetch capability and a per-session [`AccountCache`]; reusing
/// one resolver across calls reuses its cached snapshots, while separate
/// resolvers never share state.
pub struct Resolver<F> {
    fetcher: F,
    cache: AccountCache,
    derive_ata: AtaDerivation,
}

impl<F: AccountFetcher> Resolver<F> {
    /// Create a resolver with the standard associated-token derivation
    pub fn new(fetcher: F) -> Self {
        Resolver {
            fetcher,
            cache: AccountCache::new(),
            derive_ata: pda::associated_token_address,
        }
    }

    /// Create a resolver with a caller-supplied derivation scheme
    pub fn with_ata_derivation(fetcher: F, derive_ata: AtaDerivation) -> Self {
        Resolver {
            fetcher,
            cache: AccountCache::new(),
            derive_ata,
        }
    }

    /// Walk `plan` depth-first and produce the ordered remaining-accounts
    /// list
    ///
    /// Nodes and condition operands are evaluated strictly in declared
    /// order; the merge semantics (first-seen order, monotonic writable
    /// upgrade) depend on it. Addresses bound in `context` never appear
    /// in the output.
    pub async fn resolve(
        &mut self,
        context: &Context,
        plan: &[PlanNode],
    ) -> Result<ResolvedAccounts> {
        let accumulator = self.walk(context, plan).await?;
        let resolved = accumulator.into_resolved();
        debug!(order = ?resolved.order, "plan resolved");
        Ok(resolved)
    }

    fn walk<'a>(
        &'a mut self,
        context: &'a Context,
        nodes: &'a [PlanNode],
    ) -> BoxFuture<'a, Result<Accumulator>> {
        Box::pin(async move {
            let mut accumulator = Accumulator::default();

            for node in nodes {
                trace!(?node, "walking plan node");
                match node {
                    PlanNode::Conditional {
                        condition,
                        true_branch,
                        false_branch,
                    } => {
                        let branch = if self.evaluate_condition(context, condition).await? {
                            true_branch
                        } else {
                            false_branch
                        };
                        let sub = self.walk(context, branch).await?;
                        accumulator.absorb(sub);
                    }

                    // Declared invocations resolve against the enclosing
                    // instruction's static account list.
                    PlanNode::DeclaredInvoke { .. } => {}

                    PlanNode::RawInvoke {
                        program, accounts, ..
                    } => {
                        let program = self.resolve_account(context, program, false).await?;
                        if !context.contains_address(&program.pubkey) {
                            accumulator.merge(program);
                        }

                        for account in accounts {
                            let resolved = self.resolve_account(context, account, true).await?;
                            if !context.contains_address(&resolved.pubkey) {
                                accumulator.merge(resolved);
                            }
                        }
                    }
                }
            }

            Ok(accumulator)
        })
    }

    /// Evaluate a condition against the context and live account state
    pub async fn evaluate_condition(
        &mut self,
        context: &Context,
        condition: &Condition,
    ) -> Result<bool> {
        self.evaluate(context, condition).await
    }

    fn evaluate<'a>(
        &'a mut self,
        context: &'a Context,
        condition: &'a Condition,
    ) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            match condition {
                Condition::Or { conditions } => {
                    for condition in conditions {
                        if self.evaluate(context, condition).await? {
                            return Ok(true);
                        }
                    }
                    Ok(false)
                }

                Condition::And { conditions } => {
                    for condition in conditions {
                        if !self.evaluate(context, condition).await? {
                            return Ok(false);
                        }
                    }
                    Ok(true)
                }

                Condition::Equals { keys } => {
                    // Fewer than two keys is a degenerate comparison,
                    // trivially true.
                    let Some((first, rest)) = keys.split_first() else {
                        return Ok(true);
                    };
                    if rest.is_empty() {
                        return Ok(true);
                    }

                    let baseline = self.resolve_key(context, first).await?;
                    for key in rest {
                        if self.resolve_key(context, key).await? != baseline {
                            return Ok(false);
                        }
                    }
                    Ok(true)
                }
            }
        })
    }

    /// Resolve a condition key to a concrete address
    pub async fn resolve_key(&mut self, context: &Context, key: &ConditionKey) -> Result<Pubkey> {
        match key {
            ConditionKey::Literal(value) => {
                value
                    .parse()
                    .map_err(|_| Error::InvalidAddressEncoding {
                        value: value.clone(),
                    })
            }
            ConditionKey::Field { account, field } => {
                let address = context.get(account)?;
                let snapshot = self.cache.get_or_fetch(&self.fetcher, &address).await?;
                Ok(field.extract(&snapshot))
            }
        }
    }

    /// Resolve an account reference to a concrete meta
    ///
    /// `default_writable` applies to derived and field references only:
    /// bare named references always resolve writable, and downstream
    /// programs rely on the exact permission bits produced.
    pub async fn resolve_account(
        &mut self,
        context: &Context,
        reference: &AccountRef,
        default_writable: bool,
    ) -> Result<AccountMeta> {
        match reference {
            AccountRef::Named(name) => Ok(AccountMeta::new(context.get(name)?, false)),

            AccountRef::AssociatedToken { mint, owner } => {
                let mint = context.get(mint)?;
                let owner = context.get(owner)?;
                Ok(meta((self.derive_ata)(&mint, &owner), default_writable))
            }

            AccountRef::FieldOf { account, field } => {
                let address = context.get(account)?;
                let snapshot = self.cache.get_or_fetch(&self.fetcher, &address).await?;
                Ok(meta(field.extract(&snapshot), default_writable))
            }
        }
    }

    /// Cached snapshots fetched so far in this session
    pub fn cache(&self) -> &AccountCache {
        &self.cache
    }
}
