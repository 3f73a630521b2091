//! Error types for the resolution engine

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Resolution errors
///
/// Every error aborts the resolution call it occurred in. There are no
/// partial results: a resolution either returns a complete, ordered
/// account list or one of these.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// The account an evaluation step depends on does not exist on chain
    ///
    /// **Triggered by:** a `FieldOf` reference or condition key naming a
    /// context account whose address has no on-chain account
    #[error("account not found: {address}")]
    AccountNotFound {
        /// Address the fetch capability reported as absent
        address: Pubkey,
    },

    /// A plan or condition references a name the context does not bind
    ///
    /// **Triggered by:** a malformed plan/context pairing, e.g. a plan
    /// built for `{mint, owner, to}` resolved against a context missing
    /// `to`
    #[error("unknown context name: {name}")]
    UnknownContextName {
        /// The unbound symbolic name
        name: String,
    },

    /// A literal key failed to parse as a base58 address
    #[error("invalid address encoding: {value}")]
    InvalidAddressEncoding {
        /// The string that failed to parse
        value: String,
    },

    /// A field lookup requested a snapshot field the engine does not know
    #[error("unsupported account field: {field}")]
    UnsupportedField {
        /// The unrecognized field name
        field: String,
    },

    /// The fetch capability failed for transport reasons
    ///
    /// Distinct from [`Error::AccountNotFound`]: the account may well
    /// exist, the RPC node just could not be asked. Retry policy belongs
    /// to the caller; the engine never retries internally.
    #[error("RPC error: {message}")]
    Rpc {
        /// Error message from the underlying client
        message: String,
    },

    /// A plan document failed to deserialize
    #[error("plan parse error: {message}")]
    PlanParse {
        /// Error message from the deserializer
        message: String,
    },
}

impl Error {
    /// Whether re-running the whole resolution may succeed
    ///
    /// Only transport failures qualify. Everything else indicates a
    /// malformed plan, context, or on-chain state the caller must fix
    /// first.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Error::Rpc { .. })
    }
}

/// Result type for resolution operations
pub type Result<T> = std::result::Result<T, Error>;
