//! Named address bindings

use std::collections::HashMap;

use solana_sdk::pubkey::Pubkey;

use crate::error::{Error, Result};

/// Mapping from symbolic name to a known address
///
/// Bound addresses are assumed to already appear in the instruction's
/// static account list, so the walker never duplicates them into the
/// remaining-accounts output.
#[derive(Debug, Clone, Default)]
pub struct Context {
    bindings: HashMap<String, Pubkey>,
}

impl Context {
    /// Create an empty context
    pub fn new() -> Self {
        Context::default()
    }

    /// Bind `name` to `address`, replacing any previous binding
    pub fn bind(&mut self, name: impl Into<String>, address: Pubkey) {
        self.bindings.insert(name.into(), address);
    }

    /// Look up the address bound to `name`
    pub fn get(&self, name: &str) -> Result<Pubkey> {
        self.bindings
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownContextName {
                name: name.to_string(),
            })
    }

    /// Whether `address` equals some currently bound value
    ///
    /// This is the known-key test: known addresses never enter the
    /// remaining-accounts output.
    pub fn contains_address(&self, address: &Pubkey) -> bool {
        self.bindings.values().any(|bound| bound == address)
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the context binds nothing
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Pubkey)> for Context {
    fn from_iter<I: IntoIterator<Item = (S, Pubkey)>>(iter: I) -> Self {
        Context {
            bindings: iter
                .into_iter()
                .map(|(name, address)| (name.into(), address))
                .collect(),
        }
    }
}

impl From<HashMap<String, Pubkey>> for Context {
    fn from(bindings: HashMap<String, Pubkey>) -> Self {
        Context { bindings }
    }
}
