//! Plan data model
//!
//! A plan is an ordered tree of [`PlanNode`]s describing the cross-program
//! invocations an instruction may perform once it runs on chain. The tree is
//! declarative: branch conditions are evaluated against live account state at
//! resolution time, and only the surviving branches contribute accounts.
//!
//! Plans are plain serde data and are usually authored as JSON documents,
//! e.g. a transfer that dispatches on the mint's owning program:
//!
//! ```json
//! [{
//!   "type": "conditional",
//!   "condition": {
//!     "type": "or",
//!     "conditions": [
//!       { "type": "eq",
//!         "keys": [{ "account": "mint", "field": "owner" },
//!                  "BPFLoader2111111111111111111111111111111111"] },
//!       { "type": "eq",
//!         "keys": [{ "account": "mint", "field": "owner" },
//!                  "BPFLoaderUpgradeab1e11111111111111111111111"] }
//!     ]
//!   },
//!   "true": [{
//!     "type": "declared-invoke",
//!     "program": "mint",
//!     "method": "transfer",
//!     "accounts": { "to": "to", "owner": "owner" },
//!     "arguments": { "amount": "amount" }
//!   }],
//!   "false": [{
//!     "type": "raw-invoke",
//!     "program": { "account": "mint", "field": "owner" },
//!     "discriminant": { "type": "literal", "value": [12] },
//!     "accounts": [{ "mint": "mint", "owner": "owner" }, "mint"]
//!   }]
//! }]
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::error::{Error, Result};
use crate::fetch::AccountSnapshot;

/// Reference to an account whose concrete address is determined at
/// resolution time
///
/// In JSON a bare string is an [`AccountRef::Named`] reference; objects are
/// distinguished by their field set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountRef {
    /// An account bound in the caller's context under this name
    Named(String),
    /// The associated token account for `context[mint]` held by
    /// `context[owner]`, derived without I/O
    AssociatedToken {
        /// Context name of the mint account
        mint: String,
        /// Context name of the owning wallet
        owner: String,
    },
    /// A field read off the fetched account bound to `account`
    FieldOf {
        /// Context name of the account to fetch
        account: String,
        /// Which snapshot field to extract
        field: AccountField,
    },
}

/// The fixed set of snapshot fields a plan may inspect
///
/// Kept closed so every extraction site is exhaustively checked; an
/// unrecognized name in a plan document fails with
/// [`Error::UnsupportedField`] instead of falling through to reflective
/// access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AccountField {
    /// The address of the program that owns the account
    Owner,
}

impl AccountField {
    /// Extract this field from a fetched snapshot
    pub fn extract(&self, snapshot: &AccountSnapshot) -> Pubkey {
        match self {
            AccountField::Owner => snapshot.owner,
        }
    }
}

impl FromStr for AccountField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "owner" => Ok(AccountField::Owner),
            other => Err(Error::UnsupportedField {
                field: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for AccountField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountField::Owner => write!(f, "owner"),
        }
    }
}

impl TryFrom<String> for AccountField {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<AccountField> for String {
    fn from(field: AccountField) -> Self {
        field.to_string()
    }
}

/// A key a condition compares: either a base58 literal or a field read off
/// a fetched account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionKey {
    /// A literal address, parsed at evaluation time
    Literal(String),
    /// A field of the fetched account bound to `account`
    Field {
        /// Context name of the account to fetch
        account: String,
        /// Which snapshot field to extract
        field: AccountField,
    },
}

/// Boolean expression over resolved keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Condition {
    /// True iff every child is true; an empty list is true
    And {
        /// Nested conditions, evaluated in order with short-circuiting
        conditions: Vec<Condition>,
    },
    /// True iff any child is true; an empty list is false
    Or {
        /// Nested conditions, evaluated in order with short-circuiting
        conditions: Vec<Condition>,
    },
    /// True iff every key resolves to the same address as the first;
    /// fewer than two keys is trivially true
    #[serde(rename = "eq")]
    Equals {
        /// Keys to compare, first one is the baseline
        keys: Vec<ConditionKey>,
    },
}

/// Literal byte sequence identifying the invoked instruction on the
/// downstream program
///
/// Opaque to the resolution algorithm; carried so a plan fully describes
/// the raw invocation it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Discriminant {
    /// Verbatim bytes
    Literal {
        /// The discriminant bytes
        value: Vec<u8>,
    },
}

/// One node of an invocation plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PlanNode {
    /// Evaluate `condition` once, then resolve exactly one branch
    Conditional {
        /// Branch condition, evaluated against live account state
        condition: Condition,
        /// Nodes resolved when the condition holds
        #[serde(rename = "true")]
        true_branch: Vec<PlanNode>,
        /// Nodes resolved when it does not
        #[serde(rename = "false")]
        false_branch: Vec<PlanNode>,
    },
    /// An invocation whose accounts are already part of the enclosing
    /// instruction's declared account list; contributes nothing to the
    /// remaining-accounts output
    DeclaredInvoke {
        /// Context name of the target program
        program: String,
        /// Method name on the target program
        method: String,
        /// Declared account name -> reference
        accounts: HashMap<String, AccountRef>,
        /// Argument name -> caller-side binding
        arguments: HashMap<String, String>,
    },
    /// An invocation whose target program and accounts must be supplied
    /// via remaining accounts
    RawInvoke {
        /// The program to invoke, resolved read-only
        program: AccountRef,
        /// Instruction discriminant on the target program
        discriminant: Discriminant,
        /// Accounts the invocation needs, in the order the target program
        /// expects them
        accounts: Vec<AccountRef>,
    },
}

/// Parse a JSON plan document into a plan tree
pub fn parse_plan(json: &str) -> Result<Vec<PlanNode>> {
    serde_json::from_str(json).map_err(|e| Error::PlanParse {
        message: e.to_string(),
    })
}
