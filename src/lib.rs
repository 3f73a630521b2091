//! # cpires - Conditional CPI Account Resolution for Solana
//!
//! [![Crates.io](https://img.shields.io/crates/v/cpires.svg)](https://crates.io/crates/cpires)
//! [![Documentation](https://docs.rs/cpires/badge.svg)](https://docs.rs/cpires)
//! [![License: MIT](https://img.shields.io/badge/License-MIT-yellow.svg)](https://opensource.org/licenses/MIT)
//!
//! Some on-chain programs perform cross-program invocations whose target
//! program and account layout are only known once on-chain state is
//! inspected. Clients of such programs must attach the right auxiliary
//! accounts - the "remaining accounts" - at transaction-build time, in
//! the exact order the program will decode them.
//!
//! `cpires` resolves that list. The caller supplies a **context** (the
//! named addresses the instruction already binds statically) and a
//! declarative **plan** describing the possible invocations; the engine
//! walks the plan depth-first, evaluates branch conditions against live
//! account state, derives computed addresses, and returns a deduplicated,
//! order-stable, permission-correct account list ready to append to the
//! instruction.
//!
//! ## Architecture
//!
//! ```text
//! Plan JSON → parse_plan → PlanNode tree ─┐
//!                                         ├─→ Resolver::resolve → ResolvedAccounts
//! Context (name → address) ──────────────┘         │
//!                              AccountFetcher ←────┘  (cached, one fetch per address)
//! ```
//!
//! ### Main components
//!
//! - [`PlanNode`] / [`Condition`] / [`AccountRef`] - the plan data model
//! - [`Context`] - named addresses already in the static account list
//! - [`Resolver`] - condition evaluation and the recursive plan walk
//! - [`AccountCache`] - per-session snapshot memoization
//! - [`AccountFetcher`] / [`RpcFetcher`] - the account fetch capability
//!
//! ## Quick start
//!
//! ```no_run
//! use cpires::{Context, Resolver, RpcFetcher};
//!
//! #[tokio::main]
//! async fn main() -> cpires::Result<()> {
//!     let plan = cpires::plan::parse_plan(
//!         r#"[{ "type": "raw-invoke",
//!               "program": { "account": "mint", "field": "owner" },
//!               "discriminant": { "type": "literal", "value": [12] },
//!               "accounts": [{ "mint": "mint", "owner": "owner" }, "mint"] }]"#,
//!     )?;
//!
//!     let mut context = Context::new();
//!     context.bind("mint", "So11111111111111111111111111111111111111112".parse().unwrap());
//!     context.bind("owner", "11111111111111111111111111111111".parse().unwrap());
//!
//!     let mut resolver = Resolver::new(RpcFetcher::new("https://api.mainnet-beta.solana.com"));
//!     let resolved = resolver.resolve(&context, &plan).await?;
//!
//!     // Append verbatim to the instruction's remaining accounts.
//!     let _metas = resolved.accounts;
//!     Ok(())
//! }
//! ```
//!
//! ## Bring your own account source
//!
//! Anything that can answer "what is the snapshot at this address" can
//! drive the engine - a test fixture, a geyser-fed store, a simulator:
//!
//! ```
//! use std::collections::HashMap;
//!
//! use async_trait::async_trait;
//! use solana_sdk::pubkey::Pubkey;
//!
//! use cpires::plan::{AccountField, AccountRef, Discriminant, PlanNode};
//! use cpires::{AccountFetcher, AccountSnapshot, Context, Resolver, Result};
//!
//! struct Fixture(HashMap<Pubkey, AccountSnapshot>);
//!
//! #[async_trait]
//! impl AccountFetcher for Fixture {
//!     async fn fetch(&self, address: &Pubkey) -> Result<Option<AccountSnapshot>> {
//!         Ok(self.0.get(address).cloned())
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let mint = Pubkey::new_unique();
//! let owner = Pubkey::new_unique();
//! let token_program = Pubkey::new_unique();
//!
//! let mut accounts = HashMap::new();
//! accounts.insert(mint, AccountSnapshot {
//!     owner: token_program,
//!     data: vec![],
//!     lamports: 1,
//!     executable: false,
//! });
//!
//! let mut context = Context::new();
//! context.bind("mint", mint);
//! context.bind("owner", owner);
//!
//! let plan = vec![PlanNode::RawInvoke {
//!     program: AccountRef::FieldOf {
//!         account: "mint".to_string(),
//!         field: AccountField::Owner,
//!     },
//!     discriminant: Discriminant::Literal { value: vec![12] },
//!     accounts: vec![
//!         AccountRef::AssociatedToken {
//!             mint: "mint".to_string(),
//!             owner: "owner".to_string(),
//!         },
//!         AccountRef::Named("mint".to_string()),
//!     ],
//! }];
//!
//! let mut resolver = Resolver::new(Fixture(accounts));
//! let resolved = resolver.resolve(&context, &plan).await?;
//!
//! // The mint is context-bound, so only the program and the derived
//! // token account remain.
//! assert_eq!(resolved.len(), 2);
//! assert_eq!(resolved.accounts[0].pubkey, token_program);
//! assert!(!resolved.accounts[0].is_writable);
//! assert!(resolved.accounts[1].is_writable);
//! # Ok(())
//! # }
//! ```
//!
//! ## Guarantees
//!
//! - No duplicate addresses in the output; position is first-seen and
//!   stable across repeated references.
//! - A writable flag, once set, is never downgraded by a later merge.
//! - Context-bound addresses never appear in the output.
//! - Each address is fetched at most once per session.
//! - Resolution either fully succeeds or fails with an [`Error`]; there
//!   are no partial results and no internal retries.

pub mod cache;
pub mod error;
pub mod fetch;
pub mod pda;
pub mod plan;
pub mod resolver;

pub use cache::AccountCache;
pub use error::{Error, Result};
pub use fetch::{AccountFetcher, AccountSnapshot, RpcFetcher};
pub use plan::{parse_plan, AccountField, AccountRef, Condition, ConditionKey, Discriminant, PlanNode};
pub use resolver::{AtaDerivation, Context, ResolvedAccounts, Resolver};
